mod provider;

pub use provider::{EthClient, ProviderConfig};
