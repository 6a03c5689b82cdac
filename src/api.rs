//! Read-only HTTP API over the enriched catalog.
//!
//! | Route | Body |
//! |-------|------|
//! | `GET /repositories` | `{"repositories": [...]}`, filtered and paginated |
//! | `GET /languages_summary` | per-language totals, shares and counts |
//!
//! Every successful response is JSON, compressed with the configured
//! [`Compression`] and labelled with the matching `Content-Encoding`.

use crate::error::{ErrorKind, Result};
use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use exn::ResultExt;
use repolang_catalog::{ListParams, ListQuery, Service};
use repolang_compress::Compression;
use repolang_github::Repository;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
struct AppState {
    service: Arc<Service>,
    compression: Compression,
}

#[derive(Serialize)]
struct RepositoryList {
    repositories: Vec<Repository>,
}

/// Build the router. The service must already be fully bootstrapped.
pub fn router(service: Arc<Service>, compression: Compression) -> Router {
    Router::new()
        .route("/repositories", get(list_repositories))
        .route("/languages_summary", get(languages_summary))
        .with_state(AppState { service, compression })
}

async fn list_repositories(
    State(state): State<AppState>,
    pairs: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    // A query string that cannot be decoded at all is treated like an empty one.
    let params: ListParams = match pairs {
        Ok(Query(pairs)) => pairs.into_iter().collect(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Ignoring undecodable query string");
            ListParams::default()
        },
    };
    let query = ListQuery::from_params(params);
    let repositories = state.service.list(&query).await;
    tracing::debug!(?query, results = repositories.len(), "Listed repositories");
    state.respond(&RepositoryList { repositories })
}

async fn languages_summary(State(state): State<AppState>) -> Response {
    let summary = state.service.summary().await;
    state.respond(&summary)
}

impl AppState {
    fn encode<T: Serialize>(&self, body: &T) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(body).or_raise(|| ErrorKind::Encode)?;
        self.compression.compress(&json).or_raise(|| ErrorKind::Encode)
    }

    fn respond<T: Serialize>(&self, body: &T) -> Response {
        let bytes = match self.encode(body) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(error = ?err, "Could not encode response");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            },
        };
        let mut response =
            (StatusCode::OK, [(CONTENT_TYPE, HeaderValue::from_static("application/json"))], bytes).into_response();
        if let Some(encoding) = self.compression.content_encoding() {
            response.headers_mut().insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use repolang_github::languages;
    use rstest::rstest;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    /// A: {Go: 100, Rust: 50}, MIT. B: {Go: 200}, no license. C: not enriched.
    fn app(compression: Compression) -> Router {
        let service = Service::from_repositories(vec![
            Repository::new("x/a").with_license("MIT").with_languages(languages([("Go", 100), ("Rust", 50)])),
            Repository::new("x/b").with_languages(languages([("Go", 200)])),
            Repository::new("x/c"),
        ]);
        router(Arc::new(service), compression)
    }

    async fn get_json(app: Router, uri: &str) -> (Response<()>, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        assert_eq!(parts.status, StatusCode::OK);
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        let compression = match parts.headers.get(CONTENT_ENCODING) {
            Some(_) => Compression::Gzip,
            None => Compression::None,
        };
        let json = serde_json::from_slice(&compression.decompress(&bytes).unwrap()).unwrap();
        (Response::from_parts(parts, ()), json)
    }

    fn names(body: &Value) -> Vec<&str> {
        body["repositories"].as_array().unwrap().iter().map(|r| r["full_name"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_headers() {
        let (response, _) = get_json(app(Compression::Gzip), "/repositories").await;
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[CONTENT_ENCODING], "gzip");
    }

    #[tokio::test]
    async fn test_uncompressed() {
        let (response, body) = get_json(app(Compression::None), "/languages_summary").await;
        assert!(response.headers().get(CONTENT_ENCODING).is_none());
        assert_eq!(body["language_summary"]["Go"], 300);
    }

    #[rstest]
    #[case("/repositories", &["x/a", "x/b", "x/c"])]
    #[case("/repositories?language=Go&min_bytes=150", &["x/b"])]
    #[case("/repositories?language=Go&min_bytes=150abc", &["x/b"])]
    #[case("/repositories?license=MIT", &["x/a"])]
    #[case("/repositories?language=Rust&license=MIT", &["x/a"])]
    #[case("/repositories?language=", &["x/a", "x/b", "x/c"])]
    #[case("/repositories?per_page=2&page=2", &["x/c"])]
    #[case("/repositories?per_page=10&page=3", &[])]
    #[case("/repositories?page=0&per_page=abc", &["x/a", "x/b", "x/c"])]
    #[case("/repositories?language=Rust&page=1&page=2", &["x/a"])]
    #[case("/repositories?language=Rust&language=Go", &["x/a"])]
    #[case("/repositories?per_page=1&per_page=10&page=2", &["x/b"])]
    #[tokio::test]
    async fn test_list(#[case] uri: &str, #[case] expected: &[&str]) {
        let (_, body) = get_json(app(Compression::Gzip), uri).await;
        assert_eq!(names(&body), expected);
    }

    #[tokio::test]
    async fn test_record_shape() {
        let (_, body) = get_json(app(Compression::Gzip), "/repositories").await;
        assert_eq!(
            body["repositories"][0],
            json!({
                "full_name": "x/a",
                "owner": { "login": "x" },
                "repository": "a",
                "languages": { "Go": { "bytes": 100 }, "Rust": { "bytes": 50 } },
                "license": { "name": "MIT" },
            })
        );
        assert_eq!(body["repositories"][2]["languages"], Value::Null);
        assert_eq!(body["repositories"][2]["license"], Value::Null);
    }

    #[tokio::test]
    async fn test_summary() {
        let (_, body) = get_json(app(Compression::Gzip), "/languages_summary").await;
        assert_eq!(body["language_summary"], json!({ "Go": 300, "Rust": 50 }));
        assert_eq!(body["total_repositories_per_language"], json!({ "Go": 2, "Rust": 1 }));
        let go = body["language_percentage"]["Go"].as_f64().unwrap();
        let rust = body["language_percentage"]["Rust"].as_f64().unwrap();
        assert!((go - 85.714_285).abs() < 1e-3);
        assert!((rust - 14.285_714).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let response = app(Compression::Gzip).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
