use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u32 = 3600;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    S3,
    Memory,
}

impl FromStr for StorageProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(StorageProvider::S3),
            "memory" => Ok(StorageProvider::Memory),
            other => Err(anyhow!("Unknown storage provider: {}", other)),
        }
    }
}

impl fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageProvider::S3 => write!(f, "s3"),
            StorageProvider::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Clone)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint: Option<String>,
    pub path_style: bool,
    pub presign_expiry_secs: u32,
}

// Keys must never end up in logs
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("StorageConfig")
            .field("provider", &self.provider)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &redact(&self.access_key_id))
            .field("secret_access_key", &redact(&self.secret_access_key))
            .field("endpoint", &self.endpoint)
            .field("path_style", &self.path_style)
            .field("presign_expiry_secs", &self.presign_expiry_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let provider: StorageProvider = non_empty("STORAGE_PROVIDER")
            .unwrap_or_else(|| "s3".to_string())
            .parse()?;

        let bucket = match (non_empty("BUCKET_NAME"), provider) {
            (Some(bucket), _) => bucket,
            (None, StorageProvider::Memory) => "images".to_string(),
            (None, StorageProvider::S3) => bail!("BUCKET_NAME must be set"),
        };

        Ok(Self {
            server: ServerConfig {
                host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&non_empty, "PORT", DEFAULT_PORT)?,
                max_upload_bytes: parse_or(&non_empty, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            },
            storage: StorageConfig {
                provider,
                bucket,
                region: non_empty("REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key_id: non_empty("ACCESS_KEY"),
                secret_access_key: non_empty("SECRET_ACCESS_KEY"),
                endpoint: non_empty("S3_ENDPOINT"),
                path_style: parse_or(&non_empty, "S3_PATH_STYLE", false)?,
                presign_expiry_secs: parse_or(
                    &non_empty,
                    "PRESIGN_EXPIRY_SECS",
                    DEFAULT_PRESIGN_EXPIRY_SECS,
                )?,
            },
        })
    }
}

fn parse_or<T, F>(var: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BUCKET_NAME", "gallery")]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.storage.provider, StorageProvider::S3);
        assert_eq!(config.storage.region, "us-east-1");
        assert_eq!(config.storage.presign_expiry_secs, 3600);
        assert!(config.storage.access_key_id.is_none());
        assert!(!config.storage.path_style);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BUCKET_NAME", "gallery"),
            ("PORT", "9090"),
            ("REGION", "eu-central-1"),
            ("ACCESS_KEY", "AKID"),
            ("SECRET_ACCESS_KEY", "secret"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("S3_PATH_STYLE", "true"),
            ("PRESIGN_EXPIRY_SECS", "600"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.region, "eu-central-1");
        assert_eq!(config.storage.access_key_id.as_deref(), Some("AKID"));
        assert_eq!(config.storage.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.storage.path_style);
        assert_eq!(config.storage.presign_expiry_secs, 600);
    }

    #[test]
    fn test_s3_requires_bucket() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("BUCKET_NAME"));
    }

    #[test]
    fn test_memory_provider_has_default_bucket() {
        let config = load(&[("STORAGE_PROVIDER", "Memory")]).unwrap();
        assert_eq!(config.storage.provider, StorageProvider::Memory);
        assert_eq!(config.storage.bucket, "images");
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("BUCKET_NAME", "b"), ("PORT", "eighty")]).is_err());
        assert!(load(&[("BUCKET_NAME", "b"), ("STORAGE_PROVIDER", "gcs")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[
            ("BUCKET_NAME", "gallery"),
            ("ACCESS_KEY", "AKIDVISIBLE"),
            ("SECRET_ACCESS_KEY", "supersecret"),
        ])
        .unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("AKIDVISIBLE"));
        assert!(!printed.contains("supersecret"));
        assert!(printed.contains("gallery"));
    }
}
