//! Generic connector issuing JSON requests against a base address.
//!
//! # Design
//! A `Connector` holds only read-only configuration: the base address, an
//! optional shared client, an optional modifier and the failure policy.
//! Every call builds its own working client (a clone of the shared one, or a
//! transient one that is dropped when the call returns), so concurrent calls
//! on one connector never touch each other's client.
//!
//! Each call goes through three steps that can be exercised separately:
//! `build_request` (pure), `NetworkClient::send` (I/O) and `parse_response`
//! (pure).

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};
use url::Url;

use crate::client::NetworkClient;
use crate::codec::{decode_body, encode_content, Decoded};
use crate::error::ConnectorError;
use crate::http::{set_header, HttpMethod, HttpRequest, HttpResponse};
use crate::modifier::ClientModifier;

const CONTENT_TYPE_JSON: &str = "application/json";

/// What happens when the server answers with a non-2xx status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return `ConnectorError::NotFound` or `ConnectorError::Status`.
    #[default]
    Error,
    /// Swallow the failure: verb methods return `R::default()` and
    /// `execute` reports `Outcome::Failed`.
    DefaultValue,
}

/// How a response ended up as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    Json(R),
    Primitive(R),
    Empty,
    /// Non-success status tolerated under `FailurePolicy::DefaultValue`.
    Failed { status: u16, body: String },
}

impl<R: Default> Outcome<R> {
    pub fn into_value(self) -> R {
        match self {
            Outcome::Json(value) | Outcome::Primitive(value) => value,
            Outcome::Empty | Outcome::Failed { .. } => R::default(),
        }
    }
}

impl<R> From<Decoded<R>> for Outcome<R> {
    fn from(decoded: Decoded<R>) -> Self {
        match decoded {
            Decoded::Json(value) => Outcome::Json(value),
            Decoded::Primitive(value) => Outcome::Primitive(value),
            Decoded::Empty => Outcome::Empty,
        }
    }
}

/// A parsed response: status and headers as received, plus the outcome.
#[derive(Debug, Clone)]
pub struct Reply<R> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub outcome: Outcome<R>,
}

/// Issues requests relative to `base_address`, sending `C` as JSON and
/// decoding `R` from the response.
pub struct Connector<R, C> {
    base_address: Url,
    client: Option<NetworkClient>,
    modifier: Option<Arc<dyn ClientModifier>>,
    policy: FailurePolicy,
    _types: PhantomData<fn(&C) -> R>,
}

impl<R, C> Clone for Connector<R, C> {
    fn clone(&self) -> Self {
        Self {
            base_address: self.base_address.clone(),
            client: self.client.clone(),
            modifier: self.modifier.clone(),
            policy: self.policy,
            _types: PhantomData,
        }
    }
}

impl<R, C> std::fmt::Debug for Connector<R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("base_address", &self.base_address.as_str())
            .field("client", &self.client)
            .field("modifier", &self.modifier.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl<R, C> Connector<R, C>
where
    R: DeserializeOwned + Default,
    C: Serialize,
{
    /// `client` is shared by the caller and left untouched; with `None` each
    /// call creates and drops its own client.
    pub fn new(base_address: Url, client: Option<NetworkClient>) -> Self {
        Self {
            base_address,
            client,
            modifier: None,
            policy: FailurePolicy::default(),
            _types: PhantomData,
        }
    }

    /// Run `modifier` on the working client before every request.
    pub fn with_modifier(mut self, modifier: impl ClientModifier + 'static) -> Self {
        self.modifier = Some(Arc::new(modifier));
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_address(&self) -> &Url {
        &self.base_address
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    pub async fn get(&self, path: &str) -> Result<R, ConnectorError> {
        self.call(HttpMethod::Get, path, None).await
    }

    pub async fn post(&self, path: &str, content: Option<&C>) -> Result<R, ConnectorError> {
        self.call(HttpMethod::Post, path, content).await
    }

    pub async fn put(&self, path: &str, content: Option<&C>) -> Result<R, ConnectorError> {
        self.call(HttpMethod::Put, path, content).await
    }

    pub async fn patch(&self, path: &str, content: Option<&C>) -> Result<R, ConnectorError> {
        self.call(HttpMethod::Patch, path, content).await
    }

    pub async fn delete(&self, path: &str, content: Option<&C>) -> Result<R, ConnectorError> {
        self.call(HttpMethod::Delete, path, content).await
    }

    async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        content: Option<&C>,
    ) -> Result<R, ConnectorError> {
        Ok(self.execute(method, path, content).await?.outcome.into_value())
    }

    /// Run one request and report how the response was interpreted.
    pub async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        content: Option<&C>,
    ) -> Result<Reply<R>, ConnectorError> {
        let client = self.working_client().await;
        let request = self.build_request(&client, method, path, content)?;
        debug!(%method, url = %request.url, "sending request");

        let response = client.send(request).await?;
        debug!(%method, status = response.status, "response received");
        self.parse_response(response)
    }

    /// Clone of the shared client, or a fresh transient one, with the base
    /// address filled in and the modifier applied.
    async fn working_client(&self) -> NetworkClient {
        let mut client = match &self.client {
            Some(shared) => shared.clone(),
            None => {
                trace!("creating transient client");
                NetworkClient::new()
            }
        };

        if client.base_address().is_none() {
            client.set_base_address(self.base_address.clone());
        }

        if let Some(modifier) = &self.modifier {
            match modifier.modify_client(client.clone()).await {
                Ok(modified) => client = modified,
                Err(e) => warn!(error = %e, "client modifier failed, sending with unmodified client"),
            }
        }

        client
    }

    /// Resolve `path` against the client's base address (falling back to the
    /// connector's) and attach the client's default headers and the encoded
    /// content. `content` is ignored for GET.
    pub fn build_request(
        &self,
        client: &NetworkClient,
        method: HttpMethod,
        path: &str,
        content: Option<&C>,
    ) -> Result<HttpRequest, ConnectorError> {
        let base = client.base_address().unwrap_or(&self.base_address);
        let url = base.join(path).map_err(|source| ConnectorError::InvalidPath {
            path: path.to_string(),
            source,
        })?;

        let mut headers = client.default_headers().to_vec();
        let body = match content {
            Some(content) if method.accepts_body() => {
                set_header(&mut headers, "content-type".to_string(), CONTENT_TYPE_JSON.to_string());
                Some(encode_content(content)?)
            }
            _ => None,
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Interpret a response according to the failure policy.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Reply<R>, ConnectorError> {
        let outcome: Outcome<R> = if response.is_success() {
            decode_body::<R>(&response.body)?.into()
        } else {
            match self.policy {
                FailurePolicy::Error => return Err(status_error(response)),
                FailurePolicy::DefaultValue => {
                    debug!(status = response.status, "non-success status, returning default value");
                    Outcome::Failed {
                        status: response.status,
                        body: response.body,
                    }
                }
            }
        };

        Ok(Reply {
            status: response.status,
            headers: response.headers,
            outcome,
        })
    }
}

/// Map a non-success response to the appropriate `ConnectorError` variant.
fn status_error(response: HttpResponse) -> ConnectorError {
    if response.status == 404 {
        return ConnectorError::NotFound;
    }
    ConnectorError::Status {
        status: response.status,
        body: response.body,
    }
}
