use crate::features::auth::model::AuthenticatedUser;
use crate::modules::storage::{ObjectStore, StorageError, TransferProgress};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-with-enough-length";
pub const TEST_AUDIENCE: &str = "authenticated";

/// Sign an HS256 access token the way the auth service does. A negative
/// `ttl_secs` yields a token that is already expired.
pub fn issue_token(sub: &str, secret: &str, audience: &str, ttl_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + ttl_secs;
    let claims = json!({
        "sub": sub,
        "aud": audience,
        "exp": exp,
        "email": format!("{sub}@example.com"),
        "role": "authenticated",
    });

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn create_test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "test-user-id".to_string(),
        email: Some("test-user@example.com".to_string()),
        role: Some("authenticated".to_string()),
        access_token: "test-access-token".to_string(),
    }
}

async fn inject_test_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_test_user());
    next.run(request).await
}

pub fn with_test_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_user_middleware))
}

/// Object store double. Uploads report progress in two halves.
pub struct InMemoryObjectStore {
    pub bucket_present: bool,
    pub fail_uploads: bool,
    pub fail_deletes: bool,
    pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    pub deleted: Mutex<Vec<String>>,
}

impl InMemoryObjectStore {
    pub fn available() -> Self {
        Self {
            bucket_present: true,
            fail_uploads: false,
            fail_deletes: false,
            objects: Mutex::new(HashMap::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn without_bucket() -> Self {
        Self {
            bucket_present: false,
            ..Self::available()
        }
    }

    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::available()
        }
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::available()
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn bucket_name(&self) -> String {
        "file_storage".to_string()
    }

    async fn bucket_exists(&self) -> bool {
        self.bucket_present
    }

    async fn create_bucket(&self) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("not supported".to_string()))
    }

    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
        on_progress: Option<TransferProgress>,
    ) -> Result<String, StorageError> {
        let total = data.len() as u64;
        if let Some(callback) = &on_progress {
            callback(total / 2, total);
        }

        if self.fail_uploads {
            return Err(StorageError::Upload("connection reset".to_string()));
        }

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(key) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        objects.insert(key.to_string(), (data.to_vec(), content_type.to_string()));

        if let Some(callback) = &on_progress {
            callback(total, total);
        }
        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://files.example.com/file_storage/{}", key)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes {
            return Err(StorageError::Delete("storage unreachable".to_string()));
        }
        self.objects.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
