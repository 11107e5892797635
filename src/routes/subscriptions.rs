use crate::configuration::SignupSettings;
use crate::provider::{ProviderClient, ProviderError};
use crate::routes::domain::{
    SubscriberEmail, SubscriptionRequest, ValidationError, DEFAULT_SOURCE_TAG,
};
use crate::utils::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

#[derive(Deserialize)]
pub struct SubscribePayload {
    email: Option<String>,
    fields: Option<SubscribeFields>,
}

#[derive(Deserialize)]
pub struct SubscribeFields {
    source: Option<String>,
}

#[derive(serde::Serialize)]
struct SubscribeResponse {
    success: bool,
    message: &'static str,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    InvalidSubscriptionForm(#[from] ValidationError),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("Email signup is currently unavailable.")]
    Disabled,
    #[error("Server error processing subscription")]
    UnexpectedError(#[source] anyhow::Error),
}

impl From<ProviderError> for SubscribeError {
    fn from(e: ProviderError) -> Self {
        match e {
            // The provider refused this address, the visitor should see why
            ProviderError::Rejected { status, message } if status.is_client_error() => {
                SubscribeError::Rejected {
                    status: StatusCode::from_u16(status.as_u16())
                        .unwrap_or(StatusCode::BAD_REQUEST),
                    message: message.unwrap_or_else(|| "Subscription was rejected".into()),
                }
            }
            e => SubscribeError::UnexpectedError(
                anyhow::Error::new(e).context("Failed to forward the signup to the mail provider"),
            ),
        }
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::InvalidSubscriptionForm(_) => StatusCode::BAD_REQUEST,
            SubscribeError::Rejected { status, .. } => *status,
            SubscribeError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
            SubscribeError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            SubscribeError::UnexpectedError(e) => Some(e.to_string()),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            details,
        })
    }
}

impl Debug for SubscribeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

// Instrument can capture arguments of function, but CAN'T capture local variables
// so the parsed email is recorded into the span once it exists
#[tracing::instrument(
    name = "Add a new subscriber",
    skip(payload, provider_client, signup),
    fields(
        email = tracing::field::Empty,
        source = tracing::field::Empty,
    )
)]
pub async fn subscribe(
    payload: web::Json<SubscribePayload>,
    provider_client: web::Data<ProviderClient>,
    signup: web::Data<SignupSettings>,
) -> Result<HttpResponse, SubscribeError> {
    if !signup.enabled {
        return Err(SubscribeError::Disabled);
    }
    let payload = payload.into_inner();
    let email = SubscriberEmail::parse(payload.email.unwrap_or_default())?;
    let source = payload
        .fields
        .and_then(|fields| fields.source)
        .filter(|source| !source.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE_TAG.to_owned());

    let span = tracing::Span::current();
    span.record("email", tracing::field::display(&email));
    span.record("source", source.as_str());

    let request = SubscriptionRequest::new(email, source);
    provider_client.forward(&request).await?;

    Ok(HttpResponse::Ok().json(SubscribeResponse {
        success: true,
        message: "Email subscription received",
    }))
}

/// Malformed JSON bodies get the same `{ "error": .. }` shape as every
/// other failure of the API.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorBody {
        error: "Invalid request body".into(),
        details: Some(err.to_string()),
    });
    actix_web::error::InternalError::from_response(err, response).into()
}
