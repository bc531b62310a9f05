//! Generic JSON connector over HTTP.
//!
//! # Overview
//! `Connector<R, C>` issues GET/POST/PUT/PATCH/DELETE requests relative to a
//! base address, sends `C` as a JSON body and decodes the response into `R`.
//! An optional `ClientModifier` adjusts the network client (headers,
//! credentials) before every request.
//!
//! # Design
//! - The connector only holds read-only configuration. Whether a call owns
//!   its client is decided inside that call, so one connector can be shared
//!   across tasks.
//! - Each call is split into `build_request` (pure), `NetworkClient::send`
//!   (I/O) and `parse_response` (pure), so the I/O boundary is explicit.
//! - Non-success statuses are errors by default; `FailurePolicy::DefaultValue`
//!   turns them into `R::default()` instead.
//! - Response bodies that are not JSON for `R` get a second chance as a
//!   primitive string value, reported as `Outcome::Primitive`.

pub mod client;
pub mod codec;
pub mod connector;
pub mod error;
pub mod http;
pub mod modifier;

pub use client::NetworkClient;
pub use codec::Decoded;
pub use connector::{Connector, FailurePolicy, Outcome, Reply};
pub use error::{BoxError, ConnectorError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use modifier::ClientModifier;
pub use url::Url;
