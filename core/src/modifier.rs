//! Per-request hook for adjusting the network client.

use async_trait::async_trait;

use crate::client::NetworkClient;
use crate::error::BoxError;

/// Capability invoked before every request to adjust the working client,
/// typically to add headers or credentials.
///
/// The connector hands over its working copy of the client and sends with
/// whatever comes back. On error the copy it already had is used unchanged.
///
/// ```ignore
/// use async_trait::async_trait;
/// use http_connector::{BoxError, ClientModifier, NetworkClient};
///
/// struct AcceptJson;
///
/// #[async_trait]
/// impl ClientModifier for AcceptJson {
///     async fn modify_client(&self, client: NetworkClient) -> Result<NetworkClient, BoxError> {
///         Ok(client.with_header("Accept", "application/json"))
///     }
/// }
/// ```
#[async_trait]
pub trait ClientModifier: Send + Sync {
    async fn modify_client(&self, client: NetworkClient) -> Result<NetworkClient, BoxError>;
}

/// Plain synchronous closures are modifiers too.
#[async_trait]
impl<F> ClientModifier for F
where
    F: Fn(NetworkClient) -> NetworkClient + Send + Sync,
{
    async fn modify_client(&self, client: NetworkClient) -> Result<NetworkClient, BoxError> {
        Ok(self(client))
    }
}
