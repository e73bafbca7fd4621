//! Standard response envelope helpers.

use crate::pagination::PageInfo;
use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// One page of items plus the page window and any view context (filters, choices, rankings).
#[derive(Serialize)]
pub struct SuccessPage<T, C> {
    pub data: Vec<T>,
    pub meta: PageMeta<C>,
}

#[derive(Serialize)]
pub struct PageMeta<C> {
    pub page: PageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<C>,
}

/// A page of items embedded inside a larger document.
#[derive(Serialize)]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub page: PageInfo,
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::CREATED, Json(SuccessOne { data, meta: None }))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::OK, Json(SuccessOne { data, meta: None }))
}

pub fn success_page<T: Serialize, C: Serialize>(
    data: Vec<T>,
    page: PageInfo,
    context: Option<C>,
) -> (StatusCode, Json<SuccessPage<T, C>>) {
    (
        StatusCode::OK,
        Json(SuccessPage {
            data,
            meta: PageMeta { page, context },
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_envelope_shape() {
        let page = PageInfo::resolve(None, 1, 12);
        let (status, Json(body)) = success_page(vec![1, 2], page, None::<()>);
        assert_eq!(status, StatusCode::OK);
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["data"], serde_json::json!([1, 2]));
        assert_eq!(v["meta"]["page"]["number"], 1);
        assert!(v["meta"].get("context").is_none());
    }

    #[test]
    fn created_envelope_omits_meta() {
        let (status, Json(body)) = success_one("x");
        assert_eq!(status, StatusCode::CREATED);
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v, serde_json::json!({"data": "x"}));
    }
}
