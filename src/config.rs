use anyhow::Context;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Random bytes behind a generated JWT secret
const JWT_SECRET_BYTES: usize = 48;

fn generate_jwt_secret() -> anyhow::Result<String> {
    let mut bytes = [0u8; JWT_SECRET_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("Failed to generate JWT secret")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL that asset links are built from. Defaults to `http://localhost:<port>`.
    #[serde(default)]
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub previous_secrets: Vec<String>,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_access_token_expire")]
    pub access_token_expire_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_assets_root")]
    pub assets_root: String,
    /// Delete a freshly written asset when the metadata update that should reference it fails
    #[serde(default)]
    pub remove_orphans: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Bytes of a part held in memory; the rest of a larger part is spooled to a temporary file
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Hard limit on the whole request body. Unset means no limit.
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
    /// Check magic bytes against the declared content type
    #[serde(default)]
    pub verify_content: bool,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8091
}

fn default_db_path() -> String {
    "data/tubely.db".to_string()
}

fn default_issuer() -> String {
    "tubely-access".to_string()
}

fn default_access_token_expire() -> u64 {
    60 // 1 hour
}

fn default_assets_root() -> String {
    "data/assets".to_string()
}

fn default_max_bytes() -> usize {
    10 << 20 // 10 MiB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            previous_secrets: Vec::new(),
            issuer: default_issuer(),
            access_token_expire_minutes: default_access_token_expire(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            remove_orphans: false,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            max_body_bytes: None,
            verify_content: false,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        config.ensure_jwt_secret()?;
        tracing::info!(
            "Storage config: assets_root={}, public_url={}, max_bytes={}",
            config.storage.assets_root,
            config.base_url(),
            config.upload.max_bytes
        );
        Ok(config)
    }

    /// Base URL that public asset links are composed from, without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.server.public_url {
            Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => format!("http://localhost:{}", self.server.port),
        }
    }

    /// Public URL of a stored asset
    pub fn asset_url(&self, file_name: &str) -> String {
        format!("{}/assets/{}", self.base_url(), file_name)
    }

    /// Ensure a JWT secret exists, generating and persisting one next to the database if needed
    fn ensure_jwt_secret(&mut self) -> anyhow::Result<()> {
        if !self.jwt.secret.trim().is_empty() {
            return Ok(());
        }

        let secret_path = self.jwt_secret_path();
        if secret_path.exists() {
            let secret = fs::read_to_string(&secret_path)?;
            self.jwt.secret = secret.trim().to_string();
            tracing::info!("Loaded persisted JWT secret from {:?}", secret_path);
        } else {
            let secret = generate_jwt_secret()?;

            if let Some(parent) = secret_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(&secret_path, &secret)?;
            self.jwt.secret = secret;
            tracing::info!("Generated and persisted new JWT secret to {:?}", secret_path);
        }
        Ok(())
    }

    fn jwt_secret_path(&self) -> PathBuf {
        Path::new(&self.database.path)
            .parent()
            .map(|dir| dir.join(".jwt_secret"))
            .unwrap_or_else(|| PathBuf::from(".jwt_secret"))
    }

    /// Load configuration from tubely.toml or config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = [
            "tubely.toml",
            "config.toml",
            "data/tubely.toml",
            "data/config.toml",
        ];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: TUBELY_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("TUBELY_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("TUBELY_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = env::var("TUBELY_CONF_SERVER_PUBLIC_URL") {
            if !val.trim().is_empty() {
                self.server.public_url = Some(val);
            }
        }

        // Database overrides
        if let Ok(val) = env::var("TUBELY_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // JWT overrides
        if let Ok(val) = env::var("TUBELY_CONF_JWT_SECRET") {
            self.jwt.secret = val;
        }
        if let Ok(val) = env::var("TUBELY_CONF_JWT_PREVIOUS_SECRETS") {
            self.jwt.previous_secrets = val
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect();
        }
        if let Ok(val) = env::var("TUBELY_CONF_JWT_ISSUER") {
            if !val.trim().is_empty() {
                self.jwt.issuer = val;
            }
        }
        if let Ok(val) = env::var("TUBELY_CONF_JWT_ACCESS_EXPIRE") {
            if let Ok(minutes) = val.parse() {
                self.jwt.access_token_expire_minutes = minutes;
            }
        }

        // Storage overrides
        if let Ok(val) = env::var("TUBELY_CONF_STORAGE_ASSETS_ROOT") {
            self.storage.assets_root = val;
        }
        if let Ok(val) = env::var("TUBELY_CONF_STORAGE_REMOVE_ORPHANS") {
            if let Ok(v) = val.parse() {
                self.storage.remove_orphans = v;
            }
        }

        // Upload overrides
        if let Ok(val) = env::var("TUBELY_CONF_UPLOAD_MAX_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.upload.max_bytes = bytes;
            }
        }
        if let Ok(val) = env::var("TUBELY_CONF_UPLOAD_MAX_BODY_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.upload.max_body_bytes = Some(bytes);
            }
        }
        if let Ok(val) = env::var("TUBELY_CONF_UPLOAD_VERIFY_CONTENT") {
            if let Ok(v) = val.parse() {
                self.upload.verify_content = v;
            }
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.database.path).parent() {
            fs::create_dir_all(parent)?;
        }

        fs::create_dir_all(&self.storage.assets_root)?;

        Ok(())
    }
}
