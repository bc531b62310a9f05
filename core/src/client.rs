//! The network client the connector sends through.
//!
//! # Design
//! `NetworkClient` pairs a `reqwest::Client` with the two pieces of
//! client-level configuration a modifier may touch: a base address and a set
//! of default headers. Cloning is cheap and shares the connection pool, so
//! the connector can hand each call its own working copy.

use reqwest::header::{HeaderName, HeaderValue};
use tracing::trace;
use url::Url;

use crate::error::ConnectorError;
use crate::http::{set_header, HttpRequest, HttpResponse};

#[derive(Debug, Clone, Default)]
pub struct NetworkClient {
    http: reqwest::Client,
    base_address: Option<Url>,
    default_headers: Vec<(String, String)>,
}

impl NetworkClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already configured reqwest client.
    pub fn from_reqwest(http: reqwest::Client) -> Self {
        Self {
            http,
            base_address: None,
            default_headers: Vec::new(),
        }
    }

    pub fn with_base_address(mut self, base_address: Url) -> Self {
        self.base_address = Some(base_address);
        self
    }

    pub fn base_address(&self) -> Option<&Url> {
        self.base_address.as_ref()
    }

    pub fn set_base_address(&mut self, base_address: Url) {
        self.base_address = Some(base_address);
    }

    /// Add a header sent with every request made through this client.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Set a default header, replacing any existing value for the same name.
    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        set_header(&mut self.default_headers, name.into(), value.into());
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.http
    }

    /// Execute `request` and read the whole body as text, whatever the
    /// status. Headers that cannot go on the wire fail with
    /// `InvalidHeader` before anything is sent; otherwise only
    /// transport-level failures are errors here.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectorError> {
        let mut builder = self.http.request(request.method.into(), request.url);
        for (name, value) in &request.headers {
            let invalid = || ConnectorError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            builder = builder.header(header_name, header_value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;
        trace!(status, bytes = body.len(), "response body read");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
