use crate::utils::validation::{ValidationError, validate_user_segment};
use axum::http::HeaderValue;

/// Identity asserted by the fronting platform through the principal header.
/// Nothing here verifies the assertion; the reverse proxy owns that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Raw header value, if the header was present
    pub asserted: Option<String>,
    /// Folder name derived from the header, or the configured default
    pub user: String,
}

impl Principal {
    pub fn from_header(value: Option<&HeaderValue>, default_user: &str) -> Self {
        let asserted = value.map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        let user = derive_user_name(asserted.as_deref(), default_user);
        Self { asserted, user }
    }

    /// The user name as a single, safe directory component.
    pub fn folder(&self) -> Result<&str, ValidationError> {
        validate_user_segment(&self.user)?;
        Ok(&self.user)
    }
}

/// `alice@example.com` -> `alice`, `bob` -> `bob`, absent -> `default_user`.
pub fn derive_user_name(asserted: Option<&str>, default_user: &str) -> String {
    match asserted {
        Some(value) => value.split('@').next().unwrap_or_default().to_string(),
        None => default_user.to_string(),
    }
}
