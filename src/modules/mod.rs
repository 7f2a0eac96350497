pub mod functions;
pub mod storage;
