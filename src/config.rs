//! Process configuration, read once at startup from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 9443;
pub const DEFAULT_API_URL: &str = "https://api.yoti.com/api/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("failed to read key file {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("key file {} does not contain a PEM block", .0.display())]
    NotPem(PathBuf),
}

/// Credentials and endpoint of the verification service.
#[derive(Clone)]
pub struct VerificationConfig {
    pub client_sdk_id: String,
    pub pem_key: String,
    pub api_url: String,
    /// `None` leaves the exchange call without a deadline
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for VerificationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationConfig")
            .field("client_sdk_id", &self.client_sdk_id)
            .field("pem_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub key_path: PathBuf,
    pub cert_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub application_id: String,
    pub verification: VerificationConfig,
    pub tls: TlsConfig,
    pub bind_host: IpAddr,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Load from the process environment. Call `dotenv` first to pick up a
    /// `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // a blank `.env` line counts as unset
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let application_id = required("YOTI_APPLICATION_ID")?;
        let client_sdk_id = required("YOTI_CLIENT_SDK_ID")?;
        let key_path = PathBuf::from(required("YOTI_KEY_FILE_PATH")?);
        let pem_key = read_pem_key(&key_path)?;

        let port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let bind_host = match lookup("BIND_HOST") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "BIND_HOST",
                value,
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let timeout = match lookup("VERIFICATION_TIMEOUT_SECS") {
            Some(value) => {
                let secs: u64 = value.parse().map_err(|_| ConfigError::Invalid {
                    name: "VERIFICATION_TIMEOUT_SECS",
                    value,
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            application_id,
            verification: VerificationConfig {
                client_sdk_id,
                pem_key,
                api_url: lookup("VERIFICATION_API_URL")
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                timeout,
            },
            tls: TlsConfig {
                key_path: lookup("TLS_KEY_PATH")
                    .unwrap_or_else(|| "keys/server-key.pem".to_string())
                    .into(),
                cert_path: lookup("TLS_CERT_PATH")
                    .unwrap_or_else(|| "keys/server-cert.pem".to_string())
                    .into(),
            },
            bind_host,
            port,
            static_dir: lookup("STATIC_DIR")
                .unwrap_or_else(|| "static".to_string())
                .into(),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.port)
    }
}

fn read_pem_key(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::KeyFile {
        path: path.to_path_buf(),
        source,
    })?;

    if !content.contains("-----BEGIN ") {
        return Err(ConfigError::NotPem(path.to_path_buf()));
    }

    Ok(content)
}
