//! HTTP API over the route service.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{GatewalkError, Result};
use crate::service::{RouteRequest, RouteService};

/// HTTP status for each error kind.
pub fn status_for(err: &GatewalkError) -> StatusCode {
    match err {
        GatewalkError::InvalidInput(_)
        | GatewalkError::UnknownPoint(_)
        | GatewalkError::LocationUnresolved(_) => StatusCode::BAD_REQUEST,
        GatewalkError::AirportNotFound(_)
        | GatewalkError::FloorNotFound { .. }
        | GatewalkError::NoRoute { .. } => StatusCode::NOT_FOUND,
        GatewalkError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error wrapper rendered as `{"message": ...}`.
pub struct ApiError(GatewalkError);

impl From<GatewalkError> for ApiError {
    fn from(err: GatewalkError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = match &self.0 {
            GatewalkError::NoRoute { .. } => {
                "No valid route found between the selected points".to_string()
            }
            err if status == StatusCode::INTERNAL_SERVER_ERROR => {
                log::error!("Request failed: {}", err);
                "An unexpected error occurred".to_string()
            }
            err => err.to_string(),
        };
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Run blocking service work off the async executor.
async fn blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&RouteService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&state.service);
    let result = tokio::task::spawn_blocking(move || f(service.as_ref()))
        .await
        .map_err(|e| {
            GatewalkError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Worker task failed: {}", e),
            ))
        })?;
    Ok(Json(result?))
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    service: Arc<RouteService>,
}

/// HTTP server wrapper
pub struct HttpServer {
    service: Arc<RouteService>,
    allowed_origins: Vec<String>,
    host: String,
}

impl HttpServer {
    pub fn new(service: Arc<RouteService>, config: &Config) -> Self {
        Self {
            service,
            allowed_origins: config.http_server.allowed_origins.clone(),
            host: config.http_server.host.clone(),
        }
    }

    /// Run the HTTP server until it fails.
    pub async fn run(&self, port: u16) -> Result<()> {
        let addr = format!("{}:{}", self.host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            GatewalkError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to bind to {}: {}. Set http_server.port in config.toml or PORT to use another port.",
                    addr, e
                ),
            ))
        })?;

        log::info!("Gatewalk API listening on http://{}", addr);

        axum::serve(listener, self.router()).await.map_err(|e| {
            GatewalkError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Create the axum router
    pub fn router(&self) -> Router {
        // No configured origins: allow any (local development).
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/health", get(handle_health))
            .route("/api/airports", get(handle_list_airports))
            .route("/api/airports/:code", get(handle_airport))
            .route("/api/airports/:code/floors/:floor", get(handle_floor))
            .route("/api/airports/:code/route", post(handle_route))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(AppState {
                service: Arc::clone(&self.service),
            })
    }
}

async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "gatewalk",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}

async fn handle_list_airports(State(state): State<AppState>) -> impl IntoResponse {
    blocking(&state, |service| service.list_airports()).await
}

async fn handle_airport(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    blocking(&state, move |service| service.airport(&code)).await
}

async fn handle_floor(
    State(state): State<AppState>,
    Path((code, floor)): Path<(String, String)>,
) -> impl IntoResponse {
    blocking(&state, move |service| {
        service.floor(&code, &floor).map(|snapshot| snapshot.floor.clone())
    })
    .await
}

async fn handle_route(
    State(state): State<AppState>,
    Path(code): Path<String>,
    body: axum::body::Bytes,
) -> Response {
    let request: RouteRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return ApiError::from(GatewalkError::InvalidInput(format!(
                "Invalid route request: {}",
                e
            )))
            .into_response();
        }
    };
    blocking(&state, move |service| service.plan_route(&code, &request))
        .await
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::{service, setup_data_dir};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router(temp: &tempfile::TempDir) -> Router {
        let server = HttpServer {
            service: Arc::new(service(temp)),
            allowed_origins: Vec::new(),
            host: "127.0.0.1".to_string(),
        };
        server.router()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_route(code: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/airports/{}/route", code))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&GatewalkError::UnknownPoint("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&GatewalkError::NoRoute {
                from: "a".to_string(),
                to: "b".to_string()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&GatewalkError::Cancelled), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_for(&GatewalkError::Config("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_health() {
        let temp = setup_data_dir();
        let response = test_router(&temp)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "gatewalk");
    }

    #[tokio::test]
    async fn test_route_endpoint() {
        let temp = setup_data_dir();
        let response = test_router(&temp)
            .oneshot(post_route(
                "sfo",
                r#"{"floor": "1", "start": "current_location", "end": "cafe-1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["path"][0], "entrance-t1");
        assert_eq!(body["distance"], 120.0);
        assert_eq!(body["estimatedTimeMinutes"], 1);
        assert_eq!(body["enhancedPath"][3]["name"], "Cafe");
    }

    #[tokio::test]
    async fn test_route_endpoint_no_route() {
        let temp = setup_data_dir();
        let response = test_router(&temp)
            .oneshot(post_route(
                "sfo",
                r#"{"floor": "1", "start": "gate-a1", "end": "gate-b1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["message"], "No valid route found between the selected points");
    }

    #[tokio::test]
    async fn test_route_endpoint_rejects_malformed_body() {
        let temp = setup_data_dir();
        let router = test_router(&temp);

        let response = router
            .clone()
            .oneshot(post_route("sfo", r#"{"floor": "1", "end": "cafe-1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("start"));

        let response = router.oneshot(post_route("sfo", "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["message"].is_string());
    }

    #[tokio::test]
    async fn test_route_endpoint_unknown_point() {
        let temp = setup_data_dir();
        let response = test_router(&temp)
            .oneshot(post_route(
                "sfo",
                r#"{"floor": "1", "start": "nowhere", "end": "gate-a1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_airport_and_floor_endpoints() {
        let temp = setup_data_dir();
        let router = test_router(&temp);

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/api/airports").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 2);

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/api/airports/sfo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["name"], "San Francisco");
        assert!(body["gates"].as_array().unwrap().is_empty());

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/airports/sfo/floors/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["nodes"].as_array().unwrap().len(), 6);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/airports/sfo/floors/9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
