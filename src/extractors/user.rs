//! Requester identity from the `X-User-ID` header set by the fronting auth layer.

use crate::error::AppError;
use crate::models::UserId;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the authenticated account id.
pub const USER_ID_HEADER: &str = "X-User-ID";

fn user_id_from_parts(parts: &Parts) -> Option<UserId> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<UserId>().ok())
}

/// Authenticated requester. Anonymous requests are redirected to the login page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match user_id_from_parts(parts) {
            Some(id) => Ok(CurrentUser(id)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| parts.uri.path().to_string());
                Err(AppError::LoginRequired {
                    login_url: state.settings.login_url.clone(),
                    next,
                })
            }
        }
    }
}

/// Requester that may be anonymous; a missing or malformed header reads as `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaybeUser(pub Option<UserId>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_id_from_parts(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/dashboard");
        if let Some(v) = header {
            builder = builder.header(USER_ID_HEADER, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn maybe_user_reads_header() {
        let MaybeUser(id) = MaybeUser::from_request_parts(&mut parts(Some(" 42 ")), &()).await.unwrap();
        assert_eq!(id, Some(42));
    }

    #[tokio::test]
    async fn malformed_header_is_anonymous() {
        let MaybeUser(id) = MaybeUser::from_request_parts(&mut parts(Some("alice")), &()).await.unwrap();
        assert_eq!(id, None);
        let MaybeUser(id) = MaybeUser::from_request_parts(&mut parts(None), &()).await.unwrap();
        assert_eq!(id, None);
    }
}
