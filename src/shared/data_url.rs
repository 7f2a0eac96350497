//! `data:` URL encoding for files kept in the local tier

use base64::prelude::*;
use thiserror::Error;

use crate::shared::constants::DEFAULT_CONTENT_TYPE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL")]
    MissingScheme,
    #[error("data URL has no payload separator")]
    MissingPayload,
    #[error("only base64 data URLs are supported")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(String),
}

/// Decoded content of a data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Length of the data URL `encode` would produce, without building it
pub fn encoded_len(content_type: &str, data_len: usize) -> usize {
    let mime = effective_content_type(content_type);
    "data:".len() + mime.len() + ";base64,".len() + data_len.div_ceil(3) * 4
}

pub fn encode(content_type: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        effective_content_type(content_type),
        BASE64_STANDARD.encode(data)
    )
}

pub fn decode(url: &str) -> Result<DataUrl, DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::MissingScheme)?;
    let (meta, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;

    let mime = meta
        .strip_suffix(";base64")
        .ok_or(DataUrlError::NotBase64)?;

    let data = BASE64_STANDARD
        .decode(payload)
        .map_err(|e| DataUrlError::InvalidPayload(e.to_string()))?;

    Ok(DataUrl {
        content_type: effective_content_type(mime).to_string(),
        data,
    })
}

fn effective_content_type(content_type: &str) -> &str {
    if content_type.trim().is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        content_type
    }
}
