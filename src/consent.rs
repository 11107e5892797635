use actix_web::cookie::time::Duration;
use actix_web::cookie::Cookie;
use actix_web::HttpRequest;

pub const CONSENT_COOKIE_NAME: &str = "cookieConsent";
pub const CONSENT_COOKIE_MAX_AGE_DAYS: i64 = 365;

#[derive(thiserror::Error, Debug)]
pub enum ConsentError {
    #[error("Consent cookie is not valid JSON")]
    Malformed(#[from] serde_json::Error),
}

/// Which cookie categories the visitor agreed to. `necessary` is always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConsentPreferences {
    pub necessary: bool,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default)]
    pub marketing: bool,
}

impl Default for ConsentPreferences {
    fn default() -> Self {
        Self {
            necessary: true,
            analytics: false,
            marketing: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PreferenceLevel {
    Necessary,
    All,
    Analytics,
    Marketing,
    None,
    Selected,
}

impl ConsentPreferences {
    /// `selected` is only read for [`PreferenceLevel::Selected`] and
    /// [`PreferenceLevel::Necessary`], which both save the caller's toggles.
    pub fn from_level(level: PreferenceLevel, selected: Option<ConsentPreferences>) -> Self {
        let minimal = Self::default();
        match level {
            PreferenceLevel::All => Self {
                analytics: true,
                marketing: true,
                ..minimal
            },
            PreferenceLevel::Analytics => Self {
                analytics: true,
                ..minimal
            },
            // Marketing without analytics is not offered
            PreferenceLevel::Marketing => Self {
                analytics: true,
                marketing: true,
                ..minimal
            },
            PreferenceLevel::None => minimal,
            PreferenceLevel::Necessary | PreferenceLevel::Selected => {
                selected.unwrap_or(minimal).with_necessary()
            }
        }
    }

    pub fn parse(value: &str) -> Result<Self, ConsentError> {
        let preferences: Self = serde_json::from_str(value)?;
        Ok(preferences.with_necessary())
    }

    /// `None` when the visitor has not decided yet. A cookie we cannot read
    /// counts as undecided so the banner is shown again.
    pub fn from_request(request: &HttpRequest) -> Option<Self> {
        let cookie = request.cookie(CONSENT_COOKIE_NAME)?;
        match Self::parse(cookie.value()) {
            Ok(preferences) => Some(preferences),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable consent cookie");
                None
            }
        }
    }

    pub fn to_cookie(&self) -> Result<Cookie<'static>, ConsentError> {
        let value = serde_json::to_string(self)?;
        Ok(Cookie::build(CONSENT_COOKIE_NAME, value)
            .path("/")
            .max_age(Duration::days(CONSENT_COOKIE_MAX_AGE_DAYS))
            .finish())
    }

    pub fn removal_cookie() -> Cookie<'static> {
        let mut cookie = Cookie::build(CONSENT_COOKIE_NAME, "").path("/").finish();
        cookie.make_removal();
        cookie
    }

    fn with_necessary(self) -> Self {
        Self {
            necessary: true,
            ..self
        }
    }
}
