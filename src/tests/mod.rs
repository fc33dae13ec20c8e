
use crate::activity::{ActivityDetails, UserProfile};
use crate::verification_client::{ExchangeError, ProfileExchange};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Start of a JFIF file, enough for format sniffing.
pub(crate) const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00\x01\x01\x00\x00\x01";

pub(crate) fn jpeg_data_uri() -> String {
    format!(
        "data:image/jpeg;base64,{}",
        general_purpose::STANDARD.encode(JPEG_BYTES)
    )
}

pub(crate) fn profile_from(value: Value) -> UserProfile {
    let attributes: BTreeMap<String, Value> = serde_json::from_value(value).unwrap();
    UserProfile::new(attributes)
}

pub(crate) fn activity(user_id: &str, profile: Value) -> ActivityDetails {
    ActivityDetails {
        user_id: user_id.to_string(),
        timestamp: None,
        outcome: Some("SUCCESS".to_string()),
        profile: profile_from(profile),
    }
}

pub(crate) fn activity_with_selfie(user_id: &str) -> ActivityDetails {
    activity(
        user_id,
        json!({
            "givenNames": "Jane",
            "ageOver:18": true,
            "selfie": jpeg_data_uri(),
        }),
    )
}

/// Exchange that answers every token the same way and counts calls.
pub(crate) struct FakeExchange {
    outcome: Result<ActivityDetails, String>,
    calls: AtomicUsize,
}

impl FakeExchange {
    pub(crate) fn succeeding(details: ActivityDetails) -> Self {
        Self {
            outcome: Ok(details),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn rejecting(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileExchange for FakeExchange {
    async fn exchange(&self, _token: &str) -> Result<ActivityDetails, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(details) => Ok(details.clone()),
            Err(reason) => Err(ExchangeError::Rejected(reason.clone())),
        }
    }
}
