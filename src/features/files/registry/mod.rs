mod file_registry;
mod memory_registry;
mod pg_registry;

pub use file_registry::{registry_key, FileRegistry};
pub use memory_registry::InMemoryFileRegistry;
pub use pg_registry::PgFileRegistry;
