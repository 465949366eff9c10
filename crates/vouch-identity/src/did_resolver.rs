use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use vouch_core::Did;
use vouch_crypto::{keccak256, PublicKey};

use crate::document::DidDocument;
use crate::error::IdentityError;

/// ERC-1056 registry deployed at the same address on the public networks.
pub const DEFAULT_REGISTRY_ADDRESS: &str = "0xdca7ef03e98e0dc2b855be647c39abe984fcf21b";
pub const DEFAULT_RPC_URL_TEMPLATE: &str = "https://{network}.infura.io/v3/{project_id}";

/// Trait for resolving DIDs to their documents.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolve a DID to its DID Document.
    async fn resolve(&self, did: &Did) -> Result<DidDocument, IdentityError>;
}

/// Blockchain-side lookup of a DID document through a network RPC endpoint.
///
/// `Ok(None)` means the document could not be produced; transport failures
/// are folded into it.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn lookup(&self, rpc_url: &str, did: &Did) -> Result<Option<DidDocument>, IdentityError>;
}

/// Settings for [`NetworkDidResolver`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkResolverConfig {
    /// Infura project id. Checked on every resolution, not at startup.
    #[serde(default)]
    pub infura_project_id: Option<String>,
    /// RPC URL with `{network}` and `{project_id}` placeholders.
    #[serde(default = "default_rpc_url_template")]
    pub rpc_url_template: String,
    #[serde(default = "default_registry_address")]
    pub registry_address: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_rpc_url_template() -> String {
    DEFAULT_RPC_URL_TEMPLATE.into()
}
fn default_registry_address() -> String {
    DEFAULT_REGISTRY_ADDRESS.into()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for NetworkResolverConfig {
    fn default() -> Self {
        Self {
            infura_project_id: None,
            rpc_url_template: default_rpc_url_template(),
            registry_address: default_registry_address(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NetworkResolverConfig {
    pub fn rpc_url(&self, network: &str, project_id: &str) -> String {
        self.rpc_url_template
            .replace("{network}", network)
            .replace("{project_id}", project_id)
    }
}

/// Resolves DIDs against the network named in the DID, via a [`RegistryClient`].
/// No caching.
pub struct NetworkDidResolver {
    config: NetworkResolverConfig,
    client: Arc<dyn RegistryClient>,
}

impl NetworkDidResolver {
    pub fn new(config: NetworkResolverConfig, client: Arc<dyn RegistryClient>) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl DidResolver for NetworkDidResolver {
    async fn resolve(&self, did: &Did) -> Result<DidDocument, IdentityError> {
        let project_id = self
            .config
            .infura_project_id
            .as_deref()
            .filter(|pid| !pid.is_empty())
            .ok_or(IdentityError::InfuraProjectIdMissing)?;

        let network = did.network_or_default();
        let rpc_url = self.config.rpc_url(network, project_id);

        match self.client.lookup(&rpc_url, did).await? {
            Some(doc) => {
                tracing::debug!(did = %did, network, "DID resolved");
                Ok(doc)
            }
            None => Err(IdentityError::ResolveDidFailed(did.to_string())),
        }
    }
}

/// Derives the default document offline. No credential, no network.
#[derive(Debug, Clone, Default)]
pub struct LocalDidResolver;

impl LocalDidResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DidResolver for LocalDidResolver {
    async fn resolve(&self, did: &Did) -> Result<DidDocument, IdentityError> {
        DidDocument::for_did(did).map_err(|e| {
            tracing::debug!(did = %did, error = %e, "local resolution failed");
            IdentityError::ResolveDidFailed(did.to_string())
        })
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (RpcCall<'a>, &'static str),
}

#[derive(Serialize)]
struct RpcCall<'a> {
    to: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Queries the ERC-1056 registry over JSON-RPC.
///
/// A reachable registry yields the default document for the DID. Replaying
/// the registry's change events (delegates, attribute changes) is not done.
pub struct EthrRegistryClient {
    http: reqwest::Client,
    registry_address: String,
}

impl EthrRegistryClient {
    pub fn new(config: &NetworkResolverConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdentityError::Registry(e.to_string()))?;
        Ok(Self {
            http,
            registry_address: config.registry_address.clone(),
        })
    }

    /// ABI-encoded `changed(address)` call data.
    fn changed_call_data(address: &[u8; 20]) -> String {
        let selector = &keccak256(b"changed(address)")[..4];
        let mut data = Vec::with_capacity(36);
        data.extend_from_slice(selector);
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(address);
        format!("0x{}", hex::encode(data))
    }

    fn identity_address(did: &Did) -> Result<[u8; 20], IdentityError> {
        if let Some(pk_hex) = did.public_key_hex() {
            return Ok(PublicKey::from_hex(pk_hex)?.eth_address());
        }
        did.address_hex()
            .and_then(|addr| hex::decode(&addr[2..]).ok())
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| IdentityError::ResolveDidFailed(did.to_string()))
    }
}

#[async_trait]
impl RegistryClient for EthrRegistryClient {
    async fn lookup(&self, rpc_url: &str, did: &Did) -> Result<Option<DidDocument>, IdentityError> {
        let address = Self::identity_address(did)?;
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_call",
            params: (
                RpcCall {
                    to: &self.registry_address,
                    data: Self::changed_call_data(&address),
                },
                "latest",
            ),
        };

        let response = match self.http.post(rpc_url).json(&request).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(did = %did, status = %r.status(), "registry RPC rejected the call");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(did = %did, error = %e, "registry RPC unreachable");
                return Ok(None);
            }
        };

        let body: RpcResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(did = %did, error = %e, "malformed registry RPC response");
                return Ok(None);
            }
        };

        if let Some(err) = body.error {
            tracing::warn!(did = %did, error = %err, "registry RPC returned an error");
            return Ok(None);
        }

        let changed = body
            .result
            .as_deref()
            .map(|r| r.trim_start_matches("0x").chars().any(|c| c != '0'))
            .unwrap_or(false);
        if changed {
            tracing::debug!(did = %did, "registry has change history; serving the default document");
        }

        DidDocument::for_did(did).map(Some)
    }
}
