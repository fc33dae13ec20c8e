//! Result types of a token exchange: the activity details and the user
//! profile they wrap.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Profile attribute holding the selfie data URI.
pub const SELFIE_ATTRIBUTE: &str = "selfie";

/// Age check rendered on the profile page.
pub const AGE_OVER_18: &str = "ageOver:18";

/// Verified attributes of a user, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile {
    attributes: BTreeMap<String, Value>,
}

impl UserProfile {
    pub fn new(attributes: BTreeMap<String, Value>) -> Self {
        Self { attributes }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Iterate attributes in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The selfie data URI, if the user shared one
    pub fn selfie(&self) -> Option<&str> {
        self.attributes.get(SELFIE_ATTRIBUTE).and_then(Value::as_str)
    }

    /// Read an age check result such as `ageOver:18`.
    ///
    /// The service sends either a JSON boolean or the strings `"true"` and
    /// `"false"`; anything else counts as absent.
    pub fn age_verified(&self, key: &str) -> Option<bool> {
        self.attributes.get(key).and_then(value_as_bool)
    }

    /// Every age check present on the profile, in attribute name order.
    pub fn age_verifications(&self) -> Vec<AgeVerification> {
        self.attributes
            .iter()
            .filter_map(|(key, value)| {
                let condition = key.parse::<AgeCondition>().ok()?;
                let result = value_as_bool(value)?;
                Some(AgeVerification { condition, result })
            })
            .collect()
    }
}

fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeComparison {
    Over,
    Under,
}

/// Parsed form of an `age[Over|Under]:<N>` attribute key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeCondition {
    pub comparison: AgeComparison,
    pub threshold: u16,
}

impl std::str::FromStr for AgeCondition {
    type Err = String;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let (prefix, threshold) = key
            .split_once(':')
            .ok_or_else(|| format!("not an age condition: {key}"))?;

        let comparison = match prefix {
            "ageOver" => AgeComparison::Over,
            "ageUnder" => AgeComparison::Under,
            _ => return Err(format!("not an age condition: {key}")),
        };

        let threshold: u16 = threshold
            .parse()
            .map_err(|_| format!("invalid age threshold in {key}"))?;
        if !(1..=999).contains(&threshold) {
            return Err(format!("age threshold out of range in {key}"));
        }

        Ok(Self {
            comparison,
            threshold,
        })
    }
}

impl fmt::Display for AgeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.comparison {
            AgeComparison::Over => write!(f, "ageOver:{}", self.threshold),
            AgeComparison::Under => write!(f, "ageUnder:{}", self.threshold),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeVerification {
    pub condition: AgeCondition,
    pub result: bool,
}

/// Outcome of a successful token exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDetails {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default)]
    pub profile: UserProfile,
}

impl ActivityDetails {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_profile(&self) -> &UserProfile {
        &self.profile
    }
}
