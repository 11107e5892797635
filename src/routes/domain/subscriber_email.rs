use once_cell::sync::Lazy;
use regex::Regex;

// something@something.something with no whitespace anywhere.
static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email is required")]
    Empty,
    #[error("Invalid email format")]
    MalformedEmail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: impl AsRef<str>) -> Result<Self, ValidationError> {
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(ValidationError::Empty);
        }
        if !EMAIL_SHAPE.is_match(email) {
            return Err(ValidationError::MalformedEmail);
        }
        Ok(Self(email.to_owned()))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl serde::Serialize for SubscriberEmail {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
