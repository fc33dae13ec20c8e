//! Client for the identity-verification service.
//!
//! The service is reached through a single call that exchanges the token
//! handed to the browser after a share for the user's activity details.
//! Handlers depend on the [`ProfileExchange`] trait so they can run
//! against a fake in tests.

use crate::activity::ActivityDetails;
use crate::config::VerificationConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

pub const SDK_ID_HEADER: &str = "X-Client-Sdk-Id";
pub const DIGEST_HEADER: &str = "X-Auth-Digest";

const SUCCESS_OUTCOME: &str = "SUCCESS";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("request to verification service failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("verification service returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("sharing was not successful: {0}")]
    Rejected(String),
    #[error("malformed response from verification service: {0}")]
    Decode(String),
    #[error("invalid verification service URL: {0}")]
    InvalidUrl(String),
}

#[async_trait]
pub trait ProfileExchange: Send + Sync {
    /// Exchange a one-time token for the details of the share it refers to.
    async fn exchange(&self, token: &str) -> Result<ActivityDetails, ExchangeError>;
}

/// HTTP implementation of [`ProfileExchange`].
#[derive(Clone)]
pub struct HttpVerificationClient {
    client: Client,
    config: VerificationConfig,
}

impl HttpVerificationClient {
    pub fn new(config: VerificationConfig) -> Result<Self, ExchangeError> {
        let mut builder = Client::builder().user_agent(concat!(
            "profile-verifier/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Build the signed URL for exchanging `token`.
    fn profile_url(&self, token: &str, nonce: &str, timestamp: i64) -> Result<Url, ExchangeError> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| ExchangeError::InvalidUrl(format!("{}: {e}", self.config.api_url)))?;

        url.path_segments_mut()
            .map_err(|_| ExchangeError::InvalidUrl(self.config.api_url.clone()))?
            .pop_if_empty()
            .push("profile")
            .push(token);

        url.query_pairs_mut()
            .append_pair("appId", &self.config.client_sdk_id)
            .append_pair("nonce", nonce)
            .append_pair("timestamp", &timestamp.to_string());

        Ok(url)
    }
}

/// HMAC-SHA256 of `METHOD&path?query`, keyed with the application's private key.
pub fn request_digest(pem_key: &str, method: &str, path_and_query: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(pem_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(method.as_bytes());
    mac.update(b"&");
    mac.update(path_and_query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

#[async_trait]
impl ProfileExchange for HttpVerificationClient {
    async fn exchange(&self, token: &str) -> Result<ActivityDetails, ExchangeError> {
        let nonce = format!("{:032x}", rand::random::<u128>());
        let timestamp = chrono::Utc::now().timestamp_millis();
        let url = self.profile_url(token, &nonce, timestamp)?;
        let digest = request_digest(&self.config.pem_key, "GET", &path_and_query(&url));

        debug!("Exchanging token with {}", self.config.api_url);

        let response = self
            .client
            .get(url)
            .header(SDK_ID_HEADER, &self.config.client_sdk_id)
            .header(DIGEST_HEADER, digest)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExchangeError::Status { status, body });
        }

        let details: ActivityDetails =
            serde_json::from_str(&body).map_err(|e| ExchangeError::Decode(e.to_string()))?;

        match details.outcome.as_deref() {
            None | Some(SUCCESS_OUTCOME) => Ok(details),
            Some(outcome) => Err(ExchangeError::Rejected(outcome.to_string())),
        }
    }
}
