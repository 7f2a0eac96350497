use uuid::Uuid;

/// Generate an opaque file identifier
///
/// 32 lowercase hex characters from a random UUID, safe to embed in
/// storage keys and URLs.
pub fn generate_file_id() -> String {
    Uuid::new_v4().simple().to_string()
}
