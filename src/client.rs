//! Route client: asks a Gatewalk server for a route and, when the server
//! cannot answer, computes the same route in-process.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{GatewalkError, Result};
use crate::service::{RouteRequest, RouteResponse, RouteService};

/// Error body returned by the API.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct RouteClient {
    client: Client,
    base_url: Url,
    fallback: Option<Arc<RouteService>>,
}

impl RouteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewalkError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            fallback: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    /// Compute routes locally when the server is unreachable or failing.
    pub fn with_fallback(mut self, service: Arc<RouteService>) -> Self {
        self.fallback = Some(service);
        self
    }

    fn route_url(&self, code: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewalkError::Config(format!("Base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "airports", code, "route"]);
        Ok(url)
    }

    /// Ask the server for a route; fall back to the local engine on transport
    /// errors and 5xx answers. 4xx answers are final.
    pub async fn calculate_route(&self, code: &str, request: &RouteRequest) -> Result<RouteResponse> {
        let err = match self.request_remote(code, request).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        let service = match &self.fallback {
            Some(service) if should_fall_back(&err) => Arc::clone(service),
            _ => return Err(err),
        };

        log::warn!("Remote route calculation failed ({}); computing locally", err);
        let code = code.to_string();
        let request = request.clone();
        tokio::task::spawn_blocking(move || service.plan_route(&code, &request))
            .await
            .map_err(|e| {
                GatewalkError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Local route task failed: {}", e),
                ))
            })?
    }

    async fn request_remote(&self, code: &str, request: &RouteRequest) -> Result<RouteResponse> {
        let url = self.route_url(code)?;
        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<RouteResponse>().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
        Err(GatewalkError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

fn should_fall_back(err: &GatewalkError) -> bool {
    match err {
        GatewalkError::Http(_) => true,
        GatewalkError::Remote { status, .. } => {
            StatusCode::from_u16(*status).map_or(true, |s| s.is_server_error())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::http::HttpServer;
    use crate::locate::StartPoint;
    use crate::service::tests::{service, setup_data_dir};

    fn request(start: &str, end: &str) -> RouteRequest {
        RouteRequest {
            floor: "1".to_string(),
            start: StartPoint::from(start),
            end: end.to_string(),
            stops: Vec::new(),
        }
    }

    /// A localhost URL with nothing listening on it.
    async fn closed_port_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    async fn spawn_server(temp: &tempfile::TempDir) -> String {
        let data_dir = temp.path().to_str().unwrap().replace('\\', "\\\\");
        let config = Config::from_toml(&format!("[gatewalk]\ndata_dir = \"{}\"\n", data_dir)).unwrap();
        let server = HttpServer::new(Arc::new(service(temp)), &config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = server.router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_route_url_building() {
        let client = RouteClient::new("http://localhost:5000/gw/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.route_url("sfo").unwrap().as_str(),
            "http://localhost:5000/gw/api/airports/sfo/route"
        );
        let client = RouteClient::new("http://localhost:5000", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.route_url("sfo").unwrap().as_str(),
            "http://localhost:5000/api/airports/sfo/route"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            RouteClient::new("not a url", Duration::from_secs(1)),
            Err(GatewalkError::Config(_))
        ));
    }

    #[test]
    fn test_fallback_policy() {
        assert!(should_fall_back(&GatewalkError::Remote {
            status: 503,
            message: String::new()
        }));
        assert!(!should_fall_back(&GatewalkError::Remote {
            status: 404,
            message: String::new()
        }));
        assert!(!should_fall_back(&GatewalkError::UnknownPoint("x".to_string())));
    }

    #[tokio::test]
    async fn test_remote_route() {
        let temp = setup_data_dir();
        let base = spawn_server(&temp).await;
        let client = RouteClient::new(&base, Duration::from_secs(5)).unwrap();
        let response = client
            .calculate_route("sfo", &request("junction-1", "gate-a1"))
            .await
            .unwrap();
        assert_eq!(response.path, vec!["junction-1", "gate-a1"]);
        assert_eq!(response.distance, 150.0);
    }

    #[tokio::test]
    async fn test_remote_client_error_is_final() {
        let temp = setup_data_dir();
        let base = spawn_server(&temp).await;
        let client = RouteClient::new(&base, Duration::from_secs(5))
            .unwrap()
            .with_fallback(Arc::new(service(&temp)));
        let result = client.calculate_route("sfo", &request("gate-a1", "gate-b1")).await;
        match result {
            Err(GatewalkError::Remote { status, message }) => {
                assert_eq!(status, 404);
                assert!(message.contains("No valid route"));
            }
            other => panic!("expected remote 404, got {:?}", other.map(|r| r.path)),
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_local_engine() {
        let temp = setup_data_dir();
        let client = RouteClient::new(&closed_port_url().await, Duration::from_secs(2))
            .unwrap()
            .with_fallback(Arc::new(service(&temp)));
        let response = client
            .calculate_route("sfo", &request("current_location", "cafe-1"))
            .await
            .unwrap();
        assert_eq!(response.path.first().map(String::as_str), Some("entrance-t1"));
        assert_eq!(response.distance, 120.0);
    }

    #[tokio::test]
    async fn test_without_fallback_surfaces_transport_error() {
        let client = RouteClient::new(&closed_port_url().await, Duration::from_secs(2)).unwrap();
        let result = client
            .calculate_route("sfo", &request("junction-1", "cafe-1"))
            .await;
        assert!(matches!(result, Err(GatewalkError::Http(_))));
    }
}
