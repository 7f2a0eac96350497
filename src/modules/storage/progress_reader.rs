use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

use super::object_store::TransferProgress;

/// `AsyncRead` adapter that reports how many bytes have been pulled
/// through it. The uploader reads the body through this, so reads track
/// the transfer.
pub struct ProgressReader<R> {
    inner: R,
    sent: u64,
    total: u64,
    on_progress: Option<TransferProgress>,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: u64, on_progress: Option<TransferProgress>) -> Self {
        Self {
            inner,
            sent: 0,
            total,
            on_progress,
        }
    }

    pub fn bytes_sent(&self) -> u64 {
        self.sent
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);

        if let Poll::Ready(Ok(())) = &poll {
            let read = (buf.filled().len() - before) as u64;
            if read > 0 {
                self.sent += read;
                if let Some(callback) = &self.on_progress {
                    callback(self.sent, self.total);
                }
            }
        }

        poll
    }
}
