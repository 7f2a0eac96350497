//! Remote function invocation (hosted edge functions)

mod functions_client;

pub use functions_client::{FunctionsClient, RemoteFunctions};
