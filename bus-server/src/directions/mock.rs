//! Mock directions provider for development and tests.
//!
//! Serves canned responses keyed by origin and destination name, so the
//! ingestion path can run without an API key.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;

use crate::text::normalize;

use super::DirectionsProvider;
use super::client::DirectionsRequest;
use super::error::DirectionsError;
use super::types::DirectionsResponse;

/// A canned response file.
///
/// ```json
/// {"origin": "Ponta Delgada", "destination": "Furnas", "response": {"status": "OK", "routes": []}}
/// ```
#[derive(Debug, Deserialize)]
struct Fixture {
    origin: String,
    destination: String,
    response: DirectionsResponse,
}

/// What the mock does for a query it has no response for.
#[derive(Debug, Clone)]
enum Fallback {
    ZeroResults,
    Respond(DirectionsResponse),
    FailWith(u16),
}

/// Mock provider serving pre-loaded responses.
///
/// Unknown queries answer `ZERO_RESULTS` unless a fallback is set. Clones
/// share the call counter.
#[derive(Debug, Clone)]
pub struct MockDirectionsClient {
    responses: Arc<HashMap<(String, String), DirectionsResponse>>,
    fallback: Fallback,
    calls: Arc<AtomicUsize>,
}

impl Default for MockDirectionsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDirectionsClient {
    /// A mock with no responses.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(HashMap::new()),
            fallback: Fallback::ZeroResults,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer queries between `origin` and `destination` with `response`.
    ///
    /// Names are matched after normalisation.
    pub fn with_response(
        mut self,
        origin: &str,
        destination: &str,
        response: DirectionsResponse,
    ) -> Self {
        Arc::make_mut(&mut self.responses).insert(key(origin, destination), response);
        self
    }

    /// Answer every unknown query with `response`.
    pub fn always(mut self, response: DirectionsResponse) -> Self {
        self.fallback = Fallback::Respond(response);
        self
    }

    /// Fail every unknown query with an HTTP `status`.
    pub fn failing(mut self, status: u16) -> Self {
        self.fallback = Fallback::FailWith(status);
        self
    }

    /// Load every `*.json` fixture in a directory.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, DirectionsError> {
        let data_dir = data_dir.as_ref();
        let mut mock = Self::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            DirectionsError::NotConfigured(format!(
                "failed to read mock data directory {:?}: {}",
                data_dir, e
            ))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| {
                    DirectionsError::NotConfigured(format!("failed to read directory entry: {e}"))
                })?
                .path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let json = std::fs::read_to_string(&path).map_err(|e| {
                DirectionsError::NotConfigured(format!("failed to read {:?}: {}", path, e))
            })?;
            let fixture: Fixture = serde_json::from_str(&json).map_err(|e| DirectionsError::Json {
                message: format!("{:?}: {}", path, e),
            })?;

            mock = mock.with_response(&fixture.origin, &fixture.destination, fixture.response);
        }

        if mock.responses.is_empty() {
            return Err(DirectionsError::NotConfigured(format!(
                "no mock directions files found in {:?}",
                data_dir
            )));
        }

        Ok(mock)
    }

    /// Number of queries answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of canned responses.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    fn respond(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, DirectionsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let response = match self
            .responses
            .get(&key(&request.origin, &request.destination))
        {
            Some(response) => response.clone(),
            None => match &self.fallback {
                Fallback::Respond(response) => response.clone(),
                Fallback::FailWith(status) => {
                    return Err(DirectionsError::Api {
                        status: *status,
                        message: "mock failure".to_string(),
                    });
                }
                Fallback::ZeroResults => DirectionsResponse {
                    status: "ZERO_RESULTS".to_string(),
                    routes: Vec::new(),
                    error_message: None,
                },
            },
        };

        if !response.is_ok() {
            return Err(DirectionsError::Status {
                status: response.status,
                message: response.error_message,
            });
        }
        Ok(response)
    }
}

fn key(origin: &str, destination: &str) -> (String, String) {
    (normalize(origin), normalize(destination))
}

impl DirectionsProvider for MockDirectionsClient {
    async fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        self.respond(request)
    }
}
