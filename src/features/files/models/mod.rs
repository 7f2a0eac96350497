pub mod stored_file;

pub use stored_file::{StorageTier, StoredFile};
