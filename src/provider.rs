use crate::routes::{SignupFields, SubscriberEmail, SubscriptionRequest};
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Body shape the signup form sends, picked once at startup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SignupProvider {
    /// Our own `/api/subscribe` route.
    Internal,
    Formspree,
    /// MailerLite's subscriber shape. The form holds no credentials, so the
    /// endpoint must be a proxy that adds the API key before forwarding.
    MailerLite,
}

#[derive(serde::Serialize, Debug)]
pub struct SignupBody<'a> {
    pub email: &'a SubscriberEmail,
    pub fields: SignupFields<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<&'a [String]>,
}

impl SignupProvider {
    pub fn body<'a>(&self, request: &'a SubscriptionRequest, groups: &'a [String]) -> SignupBody<'a> {
        let groups = match self {
            SignupProvider::MailerLite if !groups.is_empty() => Some(groups),
            _ => None,
        };
        SignupBody {
            email: &request.email,
            fields: request.fields(),
            groups,
        }
    }
}

/// Where the internal route sends signups it accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ForwardingKind {
    /// Accept and log only.
    None,
    Formspree,
    MailerLite,
}

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("Failed to reach the mail provider")]
    Transport(#[from] reqwest::Error),
    #[error("Mail provider rejected the signup with {status}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
}

/// Sends a JSON request and turns any non-2xx answer into a rejection.
pub async fn send_json(builder: RequestBuilder) -> Result<(), ProviderError> {
    let response = builder.header(ACCEPT, "application/json").send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .as_ref()
        .and_then(error_message);
    Err(ProviderError::Rejected { status, message })
}

/// First human-readable string among `error`, `message` and `details`.
pub fn error_message(body: &serde_json::Value) -> Option<String> {
    ["error", "message", "details"]
        .iter()
        .find_map(|key| {
            body.get(key)
                .and_then(|v| v.as_str())
                .filter(|message| !message.trim().is_empty())
        })
        .map(str::to_owned)
}

pub struct ProviderClient {
    http_client: reqwest::Client,
    kind: ForwardingKind,
    api_base_url: String,
    api_key: Secret<String>,
    group_id: Option<String>,
}

impl ProviderClient {
    pub fn new(
        kind: ForwardingKind,
        api_base_url: String,
        api_key: Secret<String>,
        group_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            kind,
            api_base_url,
            api_key,
            group_id,
        })
    }

    pub fn kind(&self) -> ForwardingKind {
        self.kind
    }

    #[tracing::instrument(
        name = "Forward a signup to the mail provider",
        skip_all,
        fields(provider = self.kind.as_ref())
    )]
    pub async fn forward(&self, request: &SubscriptionRequest) -> Result<(), ProviderError> {
        let groups = self.group_id.as_slice();
        let builder = match self.kind {
            ForwardingKind::None => {
                tracing::info!(source = %request.source, "Signup accepted without forwarding");
                return Ok(());
            }
            ForwardingKind::Formspree => self
                .http_client
                .post(&self.api_base_url)
                .json(&SignupProvider::Formspree.body(request, groups)),
            ForwardingKind::MailerLite => self
                .http_client
                .post(format!(
                    "{}/subscribers",
                    self.api_base_url.trim_end_matches('/')
                ))
                .bearer_auth(self.api_key.expose_secret())
                .json(&SignupProvider::MailerLite.body(request, groups)),
        };

        send_json(builder).await
    }
}
