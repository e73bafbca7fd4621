//! Query-string extractor that never rejects.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::convert::Infallible;

/// Deserializes the query string into `T`, keeping the first value of a repeated key.
/// A query that still does not fit `T` yields `T::default()`.
pub struct LenientQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for LenientQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();
        Ok(LenientQuery(first_values(pairs)))
    }
}

fn first_values<T: DeserializeOwned + Default>(pairs: Vec<(String, String)>) -> T {
    let mut map = Map::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(Value::String(value));
    }
    match serde_json::from_value(Value::Object(map)) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(error = %e, "query string ignored");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Params {
        page: Option<String>,
        sort: Option<String>,
    }

    async fn extract(uri: &str) -> Params {
        let mut parts = Request::builder().uri(uri).body(()).unwrap().into_parts().0;
        let LenientQuery(params) = LenientQuery::<Params>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        params
    }

    #[tokio::test]
    async fn repeated_key_keeps_first_value() {
        let params = extract("/?page=1&page=2&sort=rating").await;
        assert_eq!(params.page.as_deref(), Some("1"));
        assert_eq!(params.sort.as_deref(), Some("rating"));
    }

    #[tokio::test]
    async fn missing_query_is_default() {
        assert_eq!(extract("/").await, Params::default());
    }

    #[tokio::test]
    async fn unknown_keys_and_stray_separators_are_ignored() {
        let params = extract("/?&&x=1&page=3&=").await;
        assert_eq!(params.page.as_deref(), Some("3"));
        assert_eq!(params.sort, None);
    }
}
