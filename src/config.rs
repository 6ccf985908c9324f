use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3333;
const DEFAULT_DATABASE_URL: &str = "app.db";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_CLOUDINARY_FOLDER: &str = "products";
const DEFAULT_CLOUDINARY_API_URL: &str = "https://api.cloudinary.com";
const DEFAULT_CLOUDINARY_TIMEOUT_SECS: u64 = 30;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid value `{value}` for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Deployment environment the server runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Test,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" => Some(Self::Development),
            "test" => Some(Self::Test),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

/// Hash used to sign Cloudinary API requests.
///
/// Must match the algorithm configured on the Cloudinary account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

/// Credentials and endpoint settings for the Cloudinary image store.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder used for uploads that do not name one explicitly.
    pub folder: String,
    pub api_url: String,
    pub timeout: Duration,
    pub signature_algorithm: SignatureAlgorithm,
}

/// Settings required to start the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub app_env: AppEnv,
    pub database_url: String,
    /// Directory where multipart image parts are staged before upload.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cloudinary: CloudinaryConfig,
}

impl ServerConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| optional(key).ok_or(ConfigError::Missing(key));

        let port = match optional("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let app_env = match optional("APP_ENV") {
            Some(value) => AppEnv::parse(&value).ok_or(ConfigError::Invalid {
                key: "APP_ENV",
                value,
            })?,
            None => AppEnv::Development,
        };

        let max_upload_bytes = match optional("MAX_UPLOAD_BYTES") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or(ConfigError::Invalid {
                    key: "MAX_UPLOAD_BYTES",
                    value,
                })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let timeout_secs = match optional("CLOUDINARY_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "CLOUDINARY_TIMEOUT_SECS",
                value,
            })?,
            None => DEFAULT_CLOUDINARY_TIMEOUT_SECS,
        };

        let signature_algorithm = match optional("CLOUDINARY_SIGNATURE_ALGORITHM") {
            Some(value) => SignatureAlgorithm::parse(&value).ok_or(ConfigError::Invalid {
                key: "CLOUDINARY_SIGNATURE_ALGORITHM",
                value,
            })?,
            None => SignatureAlgorithm::default(),
        };

        let cloudinary = CloudinaryConfig {
            cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
            api_key: required("CLOUDINARY_API_KEY")?,
            api_secret: required("CLOUDINARY_API_SECRET")?,
            folder: optional("CLOUDINARY_FOLDER")
                .unwrap_or_else(|| DEFAULT_CLOUDINARY_FOLDER.to_string()),
            api_url: optional("CLOUDINARY_API_URL")
                .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            signature_algorithm,
        };

        Ok(Self {
            address: optional("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            port,
            app_env,
            database_url: optional("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            upload_dir: optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_upload_bytes,
            cloudinary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CLOUDINARY: [(&str, &str); 3] = [
        ("CLOUDINARY_CLOUD_NAME", "demo"),
        ("CLOUDINARY_API_KEY", "key"),
        ("CLOUDINARY_API_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply_when_optional_keys_are_absent() {
        let config = ServerConfig::from_lookup(lookup(&CLOUDINARY)).expect("config");

        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 3333);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.database_url, "app.db");
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.cloudinary.folder, "products");
        assert_eq!(config.cloudinary.api_url, "https://api.cloudinary.com");
        assert_eq!(config.cloudinary.timeout, Duration::from_secs(30));
        assert_eq!(
            config.cloudinary.signature_algorithm,
            SignatureAlgorithm::Sha1
        );
    }

    #[test]
    fn missing_cloudinary_secret_is_reported() {
        let result = ServerConfig::from_lookup(lookup(&[
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
        ]));

        assert!(matches!(
            result,
            Err(ConfigError::Missing("CLOUDINARY_API_SECRET"))
        ));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut pairs = CLOUDINARY.to_vec();
        pairs.push(("PORT", "not-a-port"));

        let result = ServerConfig::from_lookup(lookup(&pairs));

        assert!(matches!(result, Err(ConfigError::Invalid { key: "PORT", .. })));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let mut pairs = CLOUDINARY.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("APP_ENV", "Production"),
            ("UPLOAD_DIR", "/tmp/staging"),
            ("CLOUDINARY_FOLDER", "catalog"),
            ("CLOUDINARY_SIGNATURE_ALGORITHM", "SHA256"),
        ]);

        let config = ServerConfig::from_lookup(lookup(&pairs)).expect("config");

        assert_eq!(config.port, 8080);
        assert_eq!(config.app_env, AppEnv::Production);
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/staging"));
        assert_eq!(config.cloudinary.folder, "catalog");
        assert_eq!(
            config.cloudinary.signature_algorithm,
            SignatureAlgorithm::Sha256
        );
    }

    #[test]
    fn unknown_signature_algorithm_is_rejected() {
        let mut pairs = CLOUDINARY.to_vec();
        pairs.push(("CLOUDINARY_SIGNATURE_ALGORITHM", "md5"));

        let result = ServerConfig::from_lookup(lookup(&pairs));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "CLOUDINARY_SIGNATURE_ALGORITHM",
                ..
            })
        ));
    }
}
