//! Directions HTTP client.
//!
//! Queries a transit directions API. Every request is bounded by a fixed
//! timeout and a concurrency limit.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tracing::debug;

use super::error::DirectionsError;
use super::types::DirectionsResponse;
use super::DirectionsProvider;

/// Default directions endpoint.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the directions client.
#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Endpoint URL (defaults to the production API)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Language for stop names and time formatting
    pub language: String,
}

impl DirectionsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            language: "en".to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// A departure-time directions query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectionsRequest {
    /// Origin as the rider named it.
    pub origin: String,
    pub destination: String,
    /// What is sent to the provider: the name, or "lat,lng" for a known stop.
    pub origin_query: String,
    pub destination_query: String,
    pub departure: DateTime<Utc>,
}

impl DirectionsRequest {
    /// Query by name.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure: DateTime<Utc>,
    ) -> Self {
        let origin = origin.into();
        let destination = destination.into();
        Self {
            origin_query: origin.clone(),
            destination_query: destination.clone(),
            origin,
            destination,
            departure,
        }
    }

    /// Query the origin by coordinates instead of by name.
    pub fn with_origin_location(mut self, lat_lng: impl Into<String>) -> Self {
        self.origin_query = lat_lng.into();
        self
    }

    /// Query the destination by coordinates instead of by name.
    pub fn with_destination_location(mut self, lat_lng: impl Into<String>) -> Self {
        self.destination_query = lat_lng.into();
        self
    }
}

/// Directions API client.
#[derive(Debug, Clone)]
pub struct DirectionsClient {
    http: reqwest::Client,
    config: DirectionsConfig,
    semaphore: Arc<Semaphore>,
}

impl DirectionsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: DirectionsConfig) -> Result<Self, DirectionsError> {
        if config.api_key.is_empty() {
            return Err(DirectionsError::NotConfigured(
                "directions API key is empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            config,
        })
    }

    /// Fetch transit directions departing at `request.departure`.
    ///
    /// Fails on timeout, on a non-success HTTP status, on an unparseable
    /// body and on any provider status other than `OK`.
    pub async fn fetch(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DirectionsError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        debug!(
            origin = %request.origin_query,
            destination = %request.destination_query,
            departure = %request.departure,
            "requesting directions"
        );

        let departure = request.departure.timestamp().to_string();
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("origin", request.origin_query.as_str()),
                ("destination", request.destination_query.as_str()),
                ("mode", "transit"),
                ("alternatives", "true"),
                ("language", self.config.language.as_str()),
                ("departure_time", departure.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectionsError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;

        let directions: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| DirectionsError::Json {
                message: e.to_string(),
            })?;

        if !directions.is_ok() {
            return Err(DirectionsError::Status {
                status: directions.status,
                message: directions.error_message,
            });
        }

        Ok(directions)
    }

    fn classify(&self, e: reqwest::Error) -> DirectionsError {
        if e.is_timeout() {
            DirectionsError::Timeout {
                secs: self.config.timeout_secs,
            }
        } else {
            DirectionsError::Http(e)
        }
    }
}

impl DirectionsProvider for DirectionsClient {
    async fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        self.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    /// Serve `router` on an ephemeral local port and return its URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/directions")
    }

    fn request() -> DirectionsRequest {
        DirectionsRequest::new("Lagoa", "Furnas", Utc::now())
    }

    fn client(url: String, timeout: u64) -> DirectionsClient {
        DirectionsClient::new(
            DirectionsConfig::new("test-key")
                .with_base_url(url)
                .with_timeout(timeout),
        )
        .unwrap()
    }

    #[test]
    fn config_builder() {
        let config = DirectionsConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_max_concurrent(10)
            .with_timeout(3)
            .with_language("pt");

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.language, "pt");
    }

    #[test]
    fn config_defaults() {
        let config = DirectionsConfig::new("k");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.language, "en");
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            DirectionsClient::new(DirectionsConfig::new("")),
            Err(DirectionsError::NotConfigured(_))
        ));
    }

    #[test]
    fn request_locations() {
        let req = request().with_origin_location("37.74,-25.57");
        assert_eq!(req.origin, "Lagoa");
        assert_eq!(req.origin_query, "37.74,-25.57");
        assert_eq!(req.destination_query, "Furnas");
    }

    #[tokio::test]
    async fn ok_response_is_parsed() {
        let url = serve(Router::new().route(
            "/directions",
            get(|| async { r#"{"status":"OK","routes":[{"legs":[]}]}"# }),
        ))
        .await;

        let response = client(url, 5).fetch(&request()).await.unwrap();
        assert_eq!(response.routes.len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let url = serve(Router::new().route(
            "/directions",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        ))
        .await;

        let err = client(url, 5).fetch(&request()).await.unwrap_err();
        assert_eq!(err.http_status(), Some(503));
    }

    #[tokio::test]
    async fn provider_status_is_checked() {
        let url = serve(Router::new().route(
            "/directions",
            get(|| async { r#"{"status":"ZERO_RESULTS","routes":[]}"# }),
        ))
        .await;

        let err = client(url, 5).fetch(&request()).await.unwrap_err();
        assert!(err.is_zero_results());
    }

    #[tokio::test]
    async fn garbage_body_is_json_error() {
        let url = serve(Router::new().route("/directions", get(|| async { "<html>" }))).await;
        let err = client(url, 5).fetch(&request()).await.unwrap_err();
        assert!(matches!(err, DirectionsError::Json { .. }));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let url = serve(Router::new().route(
            "/directions",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                r#"{"status":"OK","routes":[]}"#
            }),
        ))
        .await;

        let err = client(url, 1).fetch(&request()).await.unwrap_err();
        assert!(matches!(err, DirectionsError::Timeout { secs: 1 }));
    }
}
