//! Configuration module
//!
//! Service configuration is read once from the environment (after loading an
//! optional `.env` file) and then passed by value into every component that
//! needs it. Nothing below reads the environment after startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::{StorageBackend, MAX_PRESIGN_TTL};

const DEFAULT_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_VIDEO_SIZE_MB: u64 = 1024;
const MAX_THUMBNAIL_SIZE_MB: u64 = 10;
const PLAYBACK_URL_TTL_SECS: u64 = 3600;
const UPLOAD_TIMEOUT_SECS: u64 = 600;
const LOCAL_STORAGE_BUCKET: &str = "tubely";

/// Settings shared by every Tubely binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub environment: String,
}

/// Ingestion service configuration
#[derive(Clone, Debug)]
pub struct IngestServiceConfig {
    pub base: BaseConfig,
    /// Postgres connection string. `None` selects the in-memory repository.
    pub database_url: Option<String>,
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_storage_bucket: String,
    /// HMAC key for local-storage playback URLs. Falls back to the JWT secret.
    pub url_signing_secret: Option<String>,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub scratch_dir: Option<PathBuf>,
    pub playback_url_ttl_secs: u64,
    pub upload_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IngestServiceConfig>);

impl Config {
    pub fn new(inner: IngestServiceConfig) -> Self {
        Config(Box::new(inner))
    }

    fn inner(&self) -> &IngestServiceConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = IngestServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    /// `S3_REGION` wins over `AWS_REGION`
    pub fn s3_region(&self) -> Option<&str> {
        self.inner()
            .s3_region
            .as_deref()
            .or(self.inner().aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn local_storage_bucket(&self) -> &str {
        &self.inner().local_storage_bucket
    }

    pub fn url_signing_secret(&self) -> &str {
        self.inner()
            .url_signing_secret
            .as_deref()
            .unwrap_or(&self.inner().base.jwt_secret)
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.inner().max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> u64 {
        self.inner().max_thumbnail_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.inner().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().ffprobe_path
    }

    /// Directory for staged uploads; the system temp dir when unset.
    pub fn scratch_dir(&self) -> PathBuf {
        self.inner()
            .scratch_dir
            .clone()
            .unwrap_or_else(env::temp_dir)
    }

    pub fn playback_url_ttl(&self) -> Duration {
        Duration::from_secs(self.inner().playback_url_ttl_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().upload_timeout_secs)
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

/// Parse an env var, falling back to `default` when unset or malformed.
fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl IngestServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            environment,
        };

        let storage_backend = match env_opt("STORAGE_BACKEND") {
            Some(s) => s.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let config = IngestServiceConfig {
            base,
            database_url: env_opt("DATABASE_URL"),
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            aws_region: env_opt("AWS_REGION"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            local_storage_bucket: env_opt("LOCAL_STORAGE_BUCKET")
                .unwrap_or_else(|| LOCAL_STORAGE_BUCKET.to_string()),
            url_signing_secret: env_opt("URL_SIGNING_SECRET"),
            max_video_size_bytes: env_parse("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB) * 1024 * 1024,
            max_thumbnail_size_bytes: env_parse("MAX_THUMBNAIL_SIZE_MB", MAX_THUMBNAIL_SIZE_MB)
                * 1024
                * 1024,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            scratch_dir: env_opt("SCRATCH_DIR").map(PathBuf::from),
            playback_url_ttl_secs: env_parse("PLAYBACK_URL_TTL_SECS", PLAYBACK_URL_TTL_SECS),
            upload_timeout_secs: env_parse("UPLOAD_TIMEOUT_SECS", UPLOAD_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.max_video_size_bytes == 0 || self.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_VIDEO_SIZE_MB and MAX_THUMBNAIL_SIZE_MB must be greater than 0"
            ));
        }

        if self.playback_url_ttl_secs == 0
            || self.playback_url_ttl_secs > MAX_PRESIGN_TTL.as_secs()
        {
            return Err(anyhow::anyhow!(
                "PLAYBACK_URL_TTL_SECS must be between 1 and {}",
                MAX_PRESIGN_TTL.as_secs()
            ));
        }

        if self.upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_TIMEOUT_SECS must be greater than 0"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                if self.local_storage_bucket.contains(',') || self.local_storage_bucket.is_empty()
                {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BUCKET must be non-empty and must not contain ','"
                    ));
                }
            }
        }

        Ok(())
    }
}
