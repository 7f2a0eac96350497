pub mod constants;
pub mod data_url;
pub mod format;
pub mod ids;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
pub mod validation;
