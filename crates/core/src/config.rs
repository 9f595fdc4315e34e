//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage (testing and development).
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// S3-compatible storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Optional key prefix.
        prefix: Option<String>,
        /// AWS access key ID. Falls back to AWS_ACCESS_KEY_ID env var if not set.
        /// WARNING: Prefer env vars or IAM roles over storing secrets in config files.
        access_key_id: Option<String>,
        /// AWS secret access key. Falls back to AWS_SECRET_ACCESS_KEY env var if not set.
        /// WARNING: Prefer env vars or IAM roles over storing secrets in config files.
        secret_access_key: Option<String>,
        /// Force path-style URLs (e.g., `endpoint/bucket/key` instead of
        /// `bucket.endpoint/key`). Required for MinIO and some S3-compatible
        /// services. Defaults to false (virtual-hosted style).
        #[serde(default)]
        force_path_style: bool,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/storage"),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::S3 {
                access_key_id,
                secret_access_key,
                ..
            } => match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                (Some(_), Some(_)) | (None, None) => Ok(()),
                _ => Err(
                    "s3 config requires both access_key_id and secret_access_key when either is set"
                        .to_string(),
                ),
            },
            _ => Ok(()),
        }
    }
}

/// Device-management API configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceApiConfig {
    /// Base URL of the device-management API (e.g., "https://api.balena-cloud.com").
    #[serde(default = "default_api_host")]
    pub host: String,
}

fn default_api_host() -> String {
    "https://api.balena-cloud.com".to_string()
}

impl Default for DeviceApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
        }
    }
}

/// Image key layout configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Key prefix under which built images are stored.
    #[serde(default = "default_image_prefix")]
    pub prefix: String,
}

fn default_image_prefix() -> String {
    "images".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            prefix: default_image_prefix(),
        }
    }
}

/// Top-level application configuration.
///
/// Read once at process start and treated as an immutable value threaded
/// into each component's constructor.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: DeviceApiConfig,
    #[serde(default)]
    pub images: ImageConfig,
}

impl AppConfig {
    /// Create a configuration with test-friendly defaults.
    ///
    /// **For testing only.** Points at local filesystem storage; tests
    /// override the storage backend and API host directly.
    pub fn for_testing() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.images.prefix, "images");
        assert!(config.api.host.starts_with("https://"));
        assert!(matches!(config.storage, StorageConfig::Filesystem { .. }));
    }

    #[test]
    fn s3_partial_credentials_rejected() {
        let config = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: None,
            region: None,
            prefix: None,
            access_key_id: Some("access".to_string()),
            secret_access_key: None,
            force_path_style: false,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn s3_full_or_no_credentials_accepted() {
        let full = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: Some("minio:9000".to_string()),
            region: None,
            prefix: Some("hangar".to_string()),
            access_key_id: Some("access".to_string()),
            secret_access_key: Some("secret".to_string()),
            force_path_style: true,
        };
        assert!(full.validate().is_ok());

        let ambient = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: None,
            region: Some("eu-west-1".to_string()),
            prefix: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
        };
        assert!(ambient.validate().is_ok());
    }
}
