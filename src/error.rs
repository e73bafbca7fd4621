//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Per-field messages produced by form validation, ordered by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    /// Authenticated-only route hit without an identity; answered with a redirect.
    #[error("login required")]
    LoginRequired { login_url: String, next: String },
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::NotFound(_) | AppError::Db(sqlx::Error::RowNotFound) => "not_found",
            AppError::LoginRequired { .. } => "login_required",
            AppError::PermissionDenied(_) => "permission_denied",
            AppError::Validation(_) => "validation_error",
            AppError::Db(_) => "database_error",
            AppError::BadRequest(_) => "bad_request",
        }
    }
}

/// Login redirect target in the `login?next=/path` shape.
pub fn login_redirect_location(login_url: &str, next: &str) -> String {
    let sep = if login_url.contains('?') { '&' } else { '?' };
    format!("{}{}next={}", login_url, sep, encode_next(next))
}

/// Characters left as-is in the `next` parameter: unreserved ones plus the path separator.
const NEXT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_next(path: &str) -> String {
    utf8_percent_encode(path, NEXT_ENCODE_SET).to_string()
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::LoginRequired { login_url, next } = &self {
            let location = login_redirect_location(login_url, next);
            return (status, [(header::LOCATION, location)]).into_response();
        }
        if let AppError::Db(e) = &self {
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(error = %e, "database error");
            }
        }
        let details = match &self {
            AppError::Validation(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_404() {
        let err = AppError::Db(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn login_required_redirects_with_next() {
        let err = AppError::LoginRequired {
            login_url: "/accounts/login/".into(),
            next: "/dashboard".into(),
        };
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert_eq!(location, "/accounts/login/?next=/dashboard");
    }

    #[test]
    fn next_is_percent_encoded() {
        let loc = login_redirect_location("/login?x=1", "/book/1/review?a=b");
        assert_eq!(loc, "/login?x=1&next=/book/1/review%3Fa%3Db");
    }

    #[test]
    fn next_encodes_spaces_and_non_ascii() {
        let loc = login_redirect_location("/login", "/?search=café bar&x=~");
        assert_eq!(loc, "/login?next=/%3Fsearch%3Dcaf%C3%A9%20bar%26x%3D~");
    }

    #[test]
    fn permission_denied_is_403() {
        let err = AppError::PermissionDenied("not the owner".into());
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }
}
