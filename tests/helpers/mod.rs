//! Test helpers: build the router over a temporary database and assets root.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tubely::config::Config;
use tubely::db::Database;
use tubely::models::Video;
use tubely::services::{AuthService, VideoStore};
use tubely::storage::LocalStorage;
use tubely::{create_router, AppState};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters";
pub const TEST_PORT: u16 = 8091;

pub const OWNER_ID: &str = "7f1c2a9e-4b3d-4e8a-9c61-0d2b5e8f1a34";
pub const OTHER_USER_ID: &str = "c3d9e0b2-6a4f-4f1e-8b27-93a5d1c7e604";

/// Test application: server plus the resources it owns.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub config: Arc<Config>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// `Authorization` header value for `user_id`
    pub fn bearer(&self, user_id: &str) -> String {
        let token =
            AuthService::issue_token(user_id, &self.config.jwt).expect("Failed to issue token");
        format!("Bearer {}", token)
    }

    /// Insert a video owned by `owner_id` directly into the store
    pub async fn seed_video(&self, owner_id: &str) -> Video {
        let video = Video::new(owner_id, "Boots", Some("Walking boots".to_string()));
        self.db
            .create_video(&video)
            .await
            .expect("Failed to seed video");
        video
    }

    pub async fn reload(&self, video: &Video) -> Video {
        self.db
            .get_video(&video.id)
            .await
            .expect("Failed to reload video")
    }

    pub fn assets_root(&self) -> PathBuf {
        PathBuf::from(&self.config.storage.assets_root)
    }

    /// Files currently present under the assets root
    pub fn asset_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.assets_root()) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Local path an asset URL points at
    pub fn asset_path_for_url(&self, url: &str) -> PathBuf {
        let prefix = self.config.asset_url("");
        let name = url
            .strip_prefix(&prefix)
            .unwrap_or_else(|| panic!("{} does not start with {}", url, prefix));
        self.assets_root().join(name)
    }
}

/// Setup test app with default configuration.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, adjusting the configuration first.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    setup_test_app_with_store(configure, |db| Arc::new(db) as Arc<dyn VideoStore>).await
}

/// Setup test app with a custom video store wrapped around the test database.
pub async fn setup_test_app_with_store(
    configure: impl FnOnce(&mut Config),
    wrap_store: impl FnOnce(Database) -> Arc<dyn VideoStore>,
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut config = Config::default();
    config.server.port = TEST_PORT;
    config.jwt.secret = TEST_JWT_SECRET.to_string();
    config.database.path = temp_dir
        .path()
        .join("tubely.db")
        .to_string_lossy()
        .into_owned();
    config.storage.assets_root = temp_dir
        .path()
        .join("assets")
        .to_string_lossy()
        .into_owned();
    configure(&mut config);

    let db = Database::new(&config.database.path)
        .await
        .expect("Failed to open test database");
    db.run_migrations().await.expect("Failed to run migrations");

    let config = Arc::new(config);
    let state = AppState {
        videos: wrap_store(db.clone()),
        config: config.clone(),
        storage: Arc::new(LocalStorage::new(&config.storage.assets_root)),
    };

    let server = TestServer::new(create_router(state).into_make_service())
        .expect("Failed to create test server");

    TestApp {
        server,
        db,
        config,
        _temp_dir: temp_dir,
    }
}
