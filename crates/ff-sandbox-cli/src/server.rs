//! HTTP delivery of the template corpus.
//!
//! `GET /api/{area}/template/{operation}` returns the operation's unbound template as a JSON
//! string. The sandbox UI binds it client-side with the user's form values, so the body is
//! exactly [`TemplateRegistry::served_text`]. Responses carry the template fingerprint as a
//! strong `ETag`; a matching `If-None-Match` gets `304 Not Modified`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::{ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ff_sandbox_core::{ApiArea, OperationKey, SandboxError, TemplateRegistry};

#[derive(Clone)]
pub struct AppState {
    registry: Arc<TemplateRegistry>,
}

pub fn build_router(registry: Arc<TemplateRegistry>) -> Router {
    Router::new()
        .route("/api/:area/template/:operation", get(get_template))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState { registry })
}

async fn get_template(
    State(state): State<AppState>,
    Path((area, operation)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let key: OperationKey = operation.parse()?;
    // Each operation lives under exactly one area.
    if ApiArea::from_name(&area) != Some(key.area()) {
        return Err(SandboxError::UnknownOperation(format!("{area}/{operation}")).into());
    }

    let text = state.registry.served_text(key)?;
    let etag = format!("\"{}\"", state.registry.fingerprint(key)?);

    if etag_matches(&headers, &etag) {
        tracing::debug!(operation = %key, "template not modified");
        return Ok((StatusCode::NOT_MODIFIED, [(ETAG, etag)]).into_response());
    }

    Ok(([(ETAG, etag)], Json(text)).into_response())
}

fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|tag| tag.trim().trim_start_matches("W/"))
        .any(|tag| tag == etag || tag == "*")
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// [`SandboxError`] mapped onto an HTTP status.
pub struct ApiError(SandboxError);

impl From<SandboxError> for ApiError {
    fn from(e: SandboxError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SandboxError::UnknownOperation(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "template request failed");
        } else {
            tracing::warn!(error = %self.0, %status, "template request rejected");
        }
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use ff_sandbox_core::templates::{bind, compile, example_parameters, format_snippet, render};

    fn registry() -> Arc<TemplateRegistry> {
        Arc::new(TemplateRegistry::bundled().unwrap())
    }

    async fn send(router: Router, uri: &str, if_none_match: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(tag) = if_none_match {
            request = request.header(IF_NONE_MATCH, tag);
        }
        router.oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_serves_every_template() {
        let registry = registry();
        for key in OperationKey::ALL {
            let response = send(build_router(registry.clone()), &key.template_path(), None).await;
            assert_eq!(response.status(), StatusCode::OK, "{key}");

            let etag = response.headers().get(ETAG).unwrap().to_str().unwrap().to_string();
            assert_eq!(etag, format!("\"{}\"", registry.fingerprint(key).unwrap()));

            let text: String = body_json(response).await;
            assert_eq!(text, registry.served_text(key).unwrap());
        }
    }

    #[tokio::test]
    async fn test_served_template_binds_like_the_server() {
        let registry = registry();
        let key = OperationKey::Transfer;
        let response = send(build_router(registry.clone()), &key.template_path(), None).await;
        let text: String = body_json(response).await;

        // Compile the delivered text the way a caller would and compare with a local render.
        let contract = &registry.get(key).unwrap().contract;
        let compiled = compile(&text, contract).unwrap();
        let binding = bind(&example_parameters(key), contract).unwrap();
        let client_side = format_snippet(&render(&compiled, &binding).unwrap());

        assert_eq!(client_side, registry.render(key, &example_parameters(key)).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_operation_is_not_found() {
        let response = send(build_router(registry()), "/api/tokens/template/nonexistent", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("nonexistent"));
    }

    #[tokio::test]
    async fn test_operation_under_wrong_area_is_not_found() {
        let response = send(build_router(registry()), "/api/simple/template/mint", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(build_router(registry()), "/api/nfts/template/mint", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_matching_etag_is_not_modified() {
        let registry = registry();
        let etag = format!("\"{}\"", registry.fingerprint(OperationKey::Pools).unwrap());

        let response = send(build_router(registry.clone()), "/api/tokens/template/pools", Some(&etag)).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());

        let response = send(build_router(registry), "/api/tokens/template/pools", Some("\"stale\"")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let request = Request::builder()
            .uri("/api/simple/template/broadcast")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = build_router(registry()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[test]
    fn test_etag_matching() {
        let mut headers = HeaderMap::new();
        assert!(!etag_matches(&headers, "\"abc\""));

        headers.insert(IF_NONE_MATCH, "\"x\", W/\"abc\"".parse().unwrap());
        assert!(etag_matches(&headers, "\"abc\""));

        headers.insert(IF_NONE_MATCH, "*".parse().unwrap());
        assert!(etag_matches(&headers, "\"abc\""));
    }
}
