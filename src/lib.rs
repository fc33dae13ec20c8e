pub mod activity;
pub mod config;
pub mod handlers;
pub mod selfie;
pub mod server;
pub mod verification_client;
pub mod views;

#[cfg(test)]
mod tests;

pub use activity::{ActivityDetails, AgeCondition, AgeVerification, UserProfile};
pub use config::{AppConfig, ConfigError};
pub use handlers::{AppState, ProfileError};
pub use selfie::{SelfieError, SelfieStore};
pub use server::{build_router, serve_tls};
pub use verification_client::{ExchangeError, HttpVerificationClient, ProfileExchange};
