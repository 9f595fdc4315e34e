//! Common test utilities and fixtures.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hangar_core::config::{AppConfig, StorageConfig};
use hangar_server::device_api::BalenaApi;
use hangar_server::{AppState, create_router};
use hangar_storage::{FilesystemBackend, ObjectStore};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage, pointed at the
    /// given device API host (usually an httpmock server).
    pub async fn new(api_host: &str) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage_path = temp_dir.path().join("storage");
        std::fs::create_dir_all(&storage_path).expect("Failed to create storage directory");
        let storage: Arc<dyn ObjectStore> = Arc::new(
            FilesystemBackend::new(&storage_path)
                .await
                .expect("Failed to create storage backend"),
        );

        let mut config = AppConfig::for_testing();
        config.storage = StorageConfig::Filesystem {
            path: storage_path.clone(),
        };
        config.api.host = api_host.to_string();

        let devices = BalenaApi::new(api_host).expect("Failed to create device API client");

        let state = AppState::new(config, storage, Arc::new(devices));
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying object store.
    pub fn storage(&self) -> Arc<dyn ObjectStore> {
        self.state.storage.clone()
    }
}

/// Send a GET request and return the status and raw body.
#[allow(dead_code)]
pub async fn get(
    router: &axum::Router,
    uri: &str,
    auth_token: Option<&str>,
) -> (StatusCode, bytes::Bytes) {
    let mut builder = Request::builder().method("GET").uri(uri);

    if let Some(token) = auth_token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = builder.body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, body)
}
