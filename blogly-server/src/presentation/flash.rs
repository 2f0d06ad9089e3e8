use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE_NAME: &str = "_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// `Set-Cookie` value holding this notice as percent-encoded JSON.
    fn to_header(&self) -> Option<String> {
        let value = serde_json::to_string(self).ok()?;
        let cookie = Cookie::build(FLASH_COOKIE_NAME, value)
            .path("/")
            .http_only(true)
            .finish();
        Some(cookie.encoded().to_string())
    }

    fn from_cookie(cookie: &Cookie<'_>) -> Option<Self> {
        serde_json::from_str(cookie.value()).ok()
    }
}

pub fn pending(req: &HttpRequest) -> Option<Flash> {
    req.cookie(FLASH_COOKIE_NAME)
        .and_then(|cookie| Flash::from_cookie(&cookie))
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE_NAME, "").path("/").finish();
    cookie.make_removal();
    cookie
}

pub fn redirect_with(location: &str, flash: Flash) -> HttpResponse {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location.to_owned()));
    if let Some(value) = flash.to_header() {
        builder.append_header((header::SET_COOKIE, value));
    }
    builder.finish()
}
