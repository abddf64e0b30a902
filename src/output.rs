use actix_web::HttpResponse;

use serde::Serialize;

/// Application error codes carried inside an otherwise successful response
pub mod codes {
    pub const INCORRECT_EMAIL_OR_PASSWORD: u16 = 1002;
    pub const NO_NOTIFICATION_METHODS: u16 = 1003;
    pub const UNKNOWN_NOTIFICATION_CHANNEL: u16 = 1005;
}

/// Root of every JSON response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub errors: ErrorBody,
    pub result: Option<T>,
    pub meta: Meta,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    pub code: u16,
    pub msg: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Meta {
    pub version: &'static str,
    pub by: &'static str,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            by: env!("CARGO_PKG_NAME"),
        }
    }
}

impl<T: Serialize> Envelope<T> {
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            errors: ErrorBody::default(),
            result: Some(result),
            meta: Meta::default(),
        }
    }
}

impl Envelope<()> {
    pub fn failure(code: u16, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: ErrorBody {
                code,
                msg: msg.into(),
            },
            result: None,
            meta: Meta::default(),
        }
    }
}

/// 200 with the payload wrapped in a success envelope
pub fn ok<T: Serialize>(result: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::success(result))
}

/// 200 carrying an application-level error code
pub fn domain_error(code: u16, msg: &str) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::failure(code, msg))
}
