// src/proxy/mod.rs

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

use crate::config;

pub const CORS_ALLOW_ANY: &str = "*";

/// Shared state for the forwarder: the fixed upstream endpoint and one
/// reused HTTP client.
pub struct ProxyState {
    pub upstream_url: Url,
    pub client: Client,
}

impl ProxyState {
    pub fn new(upstream_url: Url) -> Self {
        ProxyState {
            upstream_url,
            client: Client::new(),
        }
    }
}

/// The single `/proxy` route. Unrouted methods get axum's default 405.
pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/proxy", get(forward_get).post(forward_post))
        .with_state(state)
}

fn with_cors(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(CORS_ALLOW_ANY),
    );
    response
}

/// GET passthrough: relay the upstream's status and body verbatim, adding
/// the CORS header. A proxy-side transport failure becomes a 500 with an
/// `{"error": ...}` envelope.
async fn forward_get(State(state): State<Arc<ProxyState>>) -> Response {
    let upstream = state.upstream_url.as_str();
    let resp = match state.client.get(upstream).send().await {
        Ok(resp) => resp,
        Err(e) => {
            error!("GET forward to {} failed: {}", upstream, e);
            let body = Json(json!({ "error": e.to_string() }));
            return with_cors((StatusCode::INTERNAL_SERVER_ERROR, body).into_response());
        }
    };

    // reqwest and axum sit on different http crates; carry the code across
    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    match resp.bytes().await {
        Ok(bytes) => {
            info!(status = status.as_u16(), bytes = bytes.len(), "GET relayed");
            let response = Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(bytes))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response());
            with_cors(response)
        }
        Err(e) => {
            error!("reading upstream GET body failed: {}", e);
            let body = Json(json!({ "error": e.to_string() }));
            with_cors((StatusCode::INTERNAL_SERVER_ERROR, body).into_response())
        }
    }
}

/// POST forward: parse the JSON body, overwrite `authKey` with the
/// server-side credential, forward, and hand the upstream's JSON back as
/// 200 whatever it says. Parse and transport failures become a 500 with a
/// `{"status":"error","message":...}` envelope.
async fn forward_post(State(state): State<Arc<ProxyState>>, body: String) -> Response {
    let mut payload = match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            error!("POST body is not a JSON object: {}", other);
            return with_cors(post_error("Invalid request body"));
        }
        Err(e) => {
            error!("POST body parse failed: {}", e);
            return with_cors(post_error("Invalid request body"));
        }
    };

    payload.insert("authKey".to_string(), Value::String(config::auth_key()));

    let upstream = state.upstream_url.as_str();
    let reply = async {
        state
            .client
            .post(upstream)
            .json(&Value::Object(payload))
            .send()
            .await?
            .json::<Value>()
            .await
    }
    .await;

    match reply {
        Ok(value) => {
            info!("POST relayed");
            with_cors((StatusCode::OK, Json(value)).into_response())
        }
        Err(e) => {
            error!("POST forward to {} failed: {}", upstream, e);
            with_cors(post_error(&e.to_string()))
        }
    }
}

fn post_error(message: &str) -> Response {
    let body = Json(json!({ "status": "error", "message": message }));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use axum::routing::post;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    fn proxy_for(upstream: &str) -> Router {
        let url = Url::parse(upstream).unwrap();
        router(Arc::new(ProxyState::new(url)))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_unparseable_body_is_500_envelope() {
        // upstream is never contacted; any address will do
        let app = proxy_for("http://127.0.0.1:1/");
        let request = Request::post("/proxy")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_post_non_object_body_is_500_envelope() {
        let app = proxy_for("http://127.0.0.1:1/");
        let request = Request::post("/proxy")
            .body(Body::from("[1,2,3]"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_get_relays_upstream_status_and_body() {
        let upstream = spawn_upstream(Router::new().route(
            "/",
            get(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "sheet offline" })),
                )
            }),
        ))
        .await;

        let response = proxy_for(&upstream)
            .oneshot(Request::get("/proxy").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            CORS_ALLOW_ANY
        );
        let body = body_json(response).await;
        assert_eq!(body["error"], "sheet offline");
    }

    #[tokio::test]
    async fn test_get_network_failure_is_500_error_envelope() {
        // nothing listens on port 1
        let response = proxy_for("http://127.0.0.1:1/")
            .oneshot(Request::get("/proxy").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn test_other_methods_are_405() {
        let response = proxy_for("http://127.0.0.1:1/")
            .oneshot(Request::put("/proxy").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_post_injects_auth_key_and_returns_200_on_upstream_error() {
        std::env::set_var(config::AUTH_KEY_VAR, "secret-123");

        // echo upstream that reports an application-level error
        let upstream = spawn_upstream(Router::new().route(
            "/",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "status": "error", "message": "rejected", "received": body }))
            }),
        ))
        .await;

        let request = Request::post("/proxy")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"Loan No":"200","Case Status":"Closed"}"#))
            .unwrap();
        let response = proxy_for(&upstream).oneshot(request).await.unwrap();

        // always-200 passthrough, even for an upstream-reported error
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["received"]["authKey"], "secret-123");
        assert_eq!(body["received"]["Loan No"], "200");
    }
}
