use crate::activity::AGE_OVER_18;
use crate::config::AppConfig;
use crate::selfie::{SelfieError, SelfieStore};
use crate::verification_client::{ExchangeError, ProfileExchange};
use crate::views::{render_error_html, render_index_html, render_profile_html, ProfileView};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

pub const MISSING_TOKEN_MESSAGE: &str = "No token has been provided.";

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub application_id: Arc<str>,
    pub static_dir: PathBuf,
    pub exchange: Arc<dyn ProfileExchange>,
    pub selfies: Arc<SelfieStore>,
}

impl AppState {
    pub fn new(config: &AppConfig, exchange: Arc<dyn ProfileExchange>) -> Self {
        Self {
            application_id: Arc::from(config.application_id.as_str()),
            static_dir: config.static_dir.clone(),
            exchange,
            selfies: Arc::new(SelfieStore::in_static_dir(&config.static_dir)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{}", MISSING_TOKEN_MESSAGE)]
    MissingToken,
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    Selfie(#[from] SelfieError),
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProfileError::MissingToken | ProfileError::Exchange(_) => StatusCode::OK,
            ProfileError::Selfie(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Html(render_error_html(&self.to_string()))).into_response()
    }
}

pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_index_html(&state.application_id))
}

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn profile_handler(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Html<String>, ProfileError> {
    let Query(params) = query.map_err(|_| ProfileError::MissingToken)?;
    let token = first_token(&params).ok_or(ProfileError::MissingToken)?;

    let details = state.exchange.exchange(token).await.map_err(|e| {
        error!("Token exchange failed: {}", e);
        ProfileError::from(e)
    })?;

    let profile = details.user_profile();

    let has_selfie = match profile.selfie() {
        Some(selfie) => {
            state.selfies.save(selfie).await.map_err(|e| {
                error!("Failed to save selfie: {}", e);
                ProfileError::from(e)
            })?;
            true
        }
        None => {
            info!("Profile for {} has no selfie", details.user_id());
            false
        }
    };

    Ok(Html(render_profile_html(&ProfileView {
        user_id: details.user_id(),
        age_verified: profile.age_verified(AGE_OVER_18),
        profile,
        has_selfie,
    })))
}

/// First `token` value in the query; repeats are ignored.
fn first_token(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(name, _)| name == "token")
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}
