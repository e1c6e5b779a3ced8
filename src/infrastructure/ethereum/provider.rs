//! Ethereum provider construction over Alloy transports
//!
//! The contract wrappers only need a type-erased provider; the transport
//! (HTTP, WebSocket, IPC) is decided once at connect time. WebSocket and
//! IPC endpoints support log subscriptions, HTTP falls back to filter
//! polling.

use std::path::PathBuf;

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};

/// Endpoint configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }

    /// Check if this endpoint supports log subscriptions
    pub fn supports_subscriptions(&self) -> bool {
        !matches!(self, ProviderConfig::Http(_))
    }
}

/// A connected Ethereum client shared by the contract wrappers.
///
/// Wraps a type-erased Alloy provider together with the endpoint metadata
/// the wrappers need to pick between subscribing and polling for logs.
#[derive(Clone)]
pub struct EthClient {
    provider: DynProvider,
    endpoint: String,
    subscriptions: bool,
}

impl EthClient {
    /// Connect to an endpoint without a signer. Read calls and event
    /// queries work; transactions will be rejected by the node.
    pub async fn connect(config: ProviderConfig) -> Result<Self> {
        let provider = match &config {
            ProviderConfig::Http(url) => {
                let rpc_url = url.parse().context("Invalid HTTP URL")?;
                ProviderBuilder::new().connect_http(rpc_url).erased()
            }
            ProviderConfig::WebSocket(url) => ProviderBuilder::new()
                .connect(url)
                .await
                .context("Failed to create WebSocket provider")?
                .erased(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => {
                use alloy::providers::IpcConnect;
                let ipc = IpcConnect::new(path.to_string_lossy().to_string());
                ProviderBuilder::new()
                    .connect_ipc(ipc)
                    .await
                    .context("Failed to create IPC provider")?
                    .erased()
            }
        };

        Ok(Self {
            provider,
            endpoint: config.display(),
            subscriptions: config.supports_subscriptions(),
        })
    }

    /// Connect with a local signer so transactions can be sent.
    pub async fn connect_with_signer(
        config: ProviderConfig,
        signer: PrivateKeySigner,
    ) -> Result<Self> {
        let provider = match &config {
            ProviderConfig::Http(url) => {
                let rpc_url = url.parse().context("Invalid HTTP URL")?;
                ProviderBuilder::new()
                    .wallet(signer)
                    .connect_http(rpc_url)
                    .erased()
            }
            ProviderConfig::WebSocket(url) => ProviderBuilder::new()
                .wallet(signer)
                .connect(url)
                .await
                .context("Failed to create WebSocket provider")?
                .erased(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => {
                use alloy::providers::IpcConnect;
                let ipc = IpcConnect::new(path.to_string_lossy().to_string());
                ProviderBuilder::new()
                    .wallet(signer)
                    .connect_ipc(ipc)
                    .await
                    .context("Failed to create IPC provider")?
                    .erased()
            }
        };

        Ok(Self {
            provider,
            endpoint: config.display(),
            subscriptions: config.supports_subscriptions(),
        })
    }

    /// Clone of the underlying type-erased provider
    pub fn provider(&self) -> DynProvider {
        self.provider.clone()
    }

    /// Endpoint display name
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether this client can use `eth_subscribe` for logs
    pub fn supports_subscriptions(&self) -> bool {
        self.subscriptions
    }

    /// Current head block number
    pub async fn block_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .context("eth_blockNumber failed")
    }

    /// Chain id reported by the node
    pub async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("eth_chainId failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_subscriptions() {
        let http = ProviderConfig::Http("http://localhost:8545".to_string());
        assert_eq!(http.display(), "http://localhost:8545");
        assert!(!http.supports_subscriptions());

        let ws = ProviderConfig::WebSocket("ws://localhost:8546".to_string());
        assert_eq!(ws.display(), "ws://localhost:8546");
        assert!(ws.supports_subscriptions());
    }

    #[cfg(unix)]
    #[test]
    fn test_ipc_supports_subscriptions() {
        let ipc = ProviderConfig::Ipc(PathBuf::from("/tmp/geth.ipc"));
        assert!(ipc.supports_subscriptions());
        assert_eq!(ipc.display(), "/tmp/geth.ipc");
    }
}
