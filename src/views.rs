use crate::activity::{UserProfile, SELFIE_ATTRIBUTE};
use crate::selfie::SELFIE_FILE_NAME;
use serde_json::Value;

// HTML templates
static INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
static PROFILE_TEMPLATE: &str = include_str!("../templates/profile.html");
static ERROR_TEMPLATE: &str = include_str!("../templates/error.html");

/// Route prefix the static directory is mounted under.
pub const STATIC_ROUTE: &str = "/static";

/// Values rendered on the profile page.
#[derive(Debug, Clone, Copy)]
pub struct ProfileView<'a> {
    pub user_id: &'a str,
    pub age_verified: Option<bool>,
    pub profile: &'a UserProfile,
    /// Whether the selfie was written for this request
    pub has_selfie: bool,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            // keeps template placeholders out of substituted values
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_index_html(application_id: &str) -> String {
    INDEX_TEMPLATE.replace("{application_id}", &escape_html(application_id))
}

pub fn render_error_html(error: &str) -> String {
    ERROR_TEMPLATE.replace("{error}", &escape_html(error))
}

pub fn render_profile_html(view: &ProfileView<'_>) -> String {
    let selfie = if view.has_selfie {
        format!(r#"<img class="selfie" src="{STATIC_ROUTE}/{SELFIE_FILE_NAME}" alt="Selfie">"#)
    } else {
        String::new()
    };

    let age_verified = match view.age_verified {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "Not requested",
    };

    let age_checks = view
        .profile
        .age_verifications()
        .iter()
        .map(|check| {
            format!(
                r#"<li><span class="condition">{}</span>: {}</li>"#,
                check.condition, check.result
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ");

    let attributes = view
        .profile
        .iter()
        .map(|(name, value)| {
            format!(
                r#"<tr><td class="name">{}</td><td class="value">{}</td></tr>"#,
                escape_html(name),
                escape_html(&attribute_text(name, value))
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ");

    PROFILE_TEMPLATE
        .replace("{selfie}", &selfie)
        .replace("{user_id}", &escape_html(view.user_id))
        .replace("{age_verified}", age_verified)
        .replace("{age_checks}", &age_checks)
        .replace("{attributes}", &attributes)
}

fn attribute_text(name: &str, value: &Value) -> String {
    if name == SELFIE_ATTRIBUTE {
        return "(image)".to_string();
    }
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
