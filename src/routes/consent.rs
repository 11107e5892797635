use crate::consent::{ConsentPreferences, PreferenceLevel};
use crate::utils::e500;
use actix_web::{web, HttpRequest, HttpResponse};

#[derive(serde::Serialize)]
struct ConsentState {
    decided: bool,
    preferences: ConsentPreferences,
}

#[derive(serde::Deserialize)]
pub struct ConsentForm {
    level: PreferenceLevel,
    preferences: Option<ConsentPreferences>,
}

pub async fn get_consent(request: HttpRequest) -> HttpResponse {
    let preferences = ConsentPreferences::from_request(&request);
    HttpResponse::Ok().json(ConsentState {
        decided: preferences.is_some(),
        preferences: preferences.unwrap_or_default(),
    })
}

#[tracing::instrument(name = "Save cookie consent", skip(form), fields(level = form.level.as_ref()))]
pub async fn save_consent(
    form: web::Json<ConsentForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let ConsentForm { level, preferences } = form.into_inner();
    let preferences = ConsentPreferences::from_level(level, preferences);
    let cookie = preferences.to_cookie().map_err(e500)?;

    Ok(HttpResponse::Ok().cookie(cookie).json(ConsentState {
        decided: true,
        preferences,
    }))
}

pub async fn clear_consent() -> HttpResponse {
    HttpResponse::NoContent()
        .cookie(ConsentPreferences::removal_cookie())
        .finish()
}
