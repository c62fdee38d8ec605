use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use super::schema::{GraphSnapshot, SidebarModel};

/// Graph generation invokes an AI inference step on the backend and has
/// been observed to take 15-20 s; leave generous headroom.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to document backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("document backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Blocking HTTP client for the document-processing backend. Always driven
/// from a worker thread so the render loop never waits on the network.
pub struct BackendClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    /// Request a freshly computed graph for the document. Slow: the backend
    /// runs entity/relationship inference before responding.
    pub fn generate(&self, document_id: &str) -> Result<GraphSnapshot, FetchError> {
        let url = format!("{}/knowledge-graph/{document_id}/generate", self.base_url);
        let response = self.http.post(url).json(&json!({ "use_ai": true })).send()?;
        let response = check_status(response)?;
        Ok(response.json::<GraphSnapshot>()?.sanitized())
    }

    /// Request a node-reduced graph capped at `max_nodes`. Which nodes
    /// survive is server policy.
    pub fn simplify(&self, document_id: &str, max_nodes: usize) -> Result<GraphSnapshot, FetchError> {
        let url = format!("{}/knowledge-graph/{document_id}/simplify", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&json!({ "max_nodes": max_nodes }))
            .send()?;
        let response = check_status(response)?;
        Ok(response.json::<GraphSnapshot>()?.sanitized())
    }

    /// Convenience data for the quick-navigation list.
    pub fn sidebar_data(&self, document_id: &str) -> Result<SidebarModel, FetchError> {
        let url = format!("{}/knowledge-graph/{document_id}/sidebar-data", self.base_url);
        let response = check_status(self.http.get(url).send()?)?;
        Ok(response.json()?)
    }
}

fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect::<String>();
    Err(FetchError::Status {
        status: status.as_u16(),
        message,
    })
}
