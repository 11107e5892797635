use crate::routes::SubscriberEmail;
use chrono::{DateTime, Utc};

pub const DEFAULT_SOURCE_TAG: &str = "website_signup";

/// A validated signup, stamped at the moment the form was submitted.
#[derive(Debug, Clone)]
pub struct SubscriptionRequest {
    pub email: SubscriberEmail,
    pub source: String,
    pub signup_date: DateTime<Utc>,
}

impl SubscriptionRequest {
    pub fn new(email: SubscriberEmail, source: impl Into<String>) -> Self {
        Self {
            email,
            source: source.into(),
            signup_date: Utc::now(),
        }
    }

    pub fn fields(&self) -> SignupFields<'_> {
        SignupFields {
            source: &self.source,
            signup_date: self.signup_date,
        }
    }
}

/// The `fields` object carried by every provider body.
#[derive(serde::Serialize, Debug)]
pub struct SignupFields<'a> {
    pub source: &'a str,
    pub signup_date: DateTime<Utc>,
}
