//! HTTP adapter mapping for domain errors.
//!
//! Every failure leaves the API as the same JSON payload: errors raised by
//! services, extractor rejections of malformed bodies or path segments, and
//! internal faults whose message and details are withheld from the client.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

impl From<ErrorCode> for StatusCode {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidRequest => Self::BAD_REQUEST,
            ErrorCode::Unauthorized => Self::UNAUTHORIZED,
            ErrorCode::Forbidden => Self::FORBIDDEN,
            ErrorCode::NotFound => Self::NOT_FOUND,
            ErrorCode::Conflict => Self::CONFLICT,
            ErrorCode::ServiceUnavailable => Self::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Payload a client may see for `error`.
fn client_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal("Internal server error");
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        self.code().into()
    }

    fn error_response(&self) -> HttpResponse {
        match self.code() {
            ErrorCode::InternalError => {
                error!(trace_id = ?self.trace_id(), message = self.message(), "internal error");
            }
            ErrorCode::ServiceUnavailable => {
                warn!(trace_id = ?self.trace_id(), message = self.message(), "dependency unavailable");
            }
            _ => {}
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// JSON body extractor settings: unreadable bodies become
/// `invalid_request` with `details.code = "malformed_body"`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use dragonfire::inbound::http::error::json_config;
///
/// let app = App::new().app_data(json_config());
/// ```
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed request body: {err}"))
            .with_details(json!({ "code": "malformed_body" }))
            .into()
    })
}

/// Path extractor settings: segments that do not parse (a non-numeric
/// episode id, say) name no resource and become `not_found`.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, req| {
        Error::not_found(format!("no resource at {}", req.path())).into()
    })
}
