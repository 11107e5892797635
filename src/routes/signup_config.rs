use crate::configuration::SignupSettings;
use crate::provider::SignupProvider;
use actix_web::{web, HttpResponse};

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicSignupConfig<'a> {
    enabled: bool,
    endpoint: &'a str,
    provider: SignupProvider,
    source_tag: &'a str,
    display_window_millis: u64,
}

/// What the email form needs to know at startup. Secrets never leave the server.
pub async fn signup_config(signup: web::Data<SignupSettings>) -> HttpResponse {
    HttpResponse::Ok().json(PublicSignupConfig {
        enabled: signup.enabled,
        endpoint: &signup.endpoint,
        provider: signup.provider,
        source_tag: &signup.source_tag,
        display_window_millis: signup.display_window_millis,
    })
}
