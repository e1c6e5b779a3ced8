//! High-level wrapper around the Clonefactory factory contract

use alloy::contract::Event;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::DynProvider;
use alloy::rpc::types::{BlockNumberOrTag, Filter, Log};
use alloy::sol_types::SolEvent;
use anyhow::{Context, Result};

use super::stream::{spawn_event_forwarder, EventStream};
use super::Clonefactory::{self, ClonefactoryInstance};
use crate::infrastructure::ethereum::EthClient;

/// Terms of a new hashpower rental contract
#[derive(Debug, Clone)]
pub struct RentalTerms {
    /// Price in LMR for the full contract duration
    pub price: U256,
    /// Price variability limit
    pub limit: U256,
    /// Promised hashrate in hashes per second
    pub speed: U256,
    /// Contract duration in seconds
    pub length: U256,
    /// Validator address settling the contract
    pub validator: Address,
}

/// A `contractCreated` log with provenance
#[derive(Debug, Clone)]
pub struct ContractCreated {
    /// Address of the freshly cloned rental contract
    pub contract: Address,
    /// Seller public key buyers encrypt their destination against
    pub pubkey: String,
    pub block_number: Option<u64>,
    pub tx_hash: Option<B256>,
    pub log_index: Option<u64>,
}

/// A `clonefactoryContractPurchased` log with provenance
#[derive(Debug, Clone)]
pub struct ContractPurchased {
    /// Address of the purchased rental contract
    pub contract: Address,
    pub block_number: Option<u64>,
    pub tx_hash: Option<B256>,
    pub log_index: Option<u64>,
}

/// Read, transact and watch interface to a deployed Clonefactory
#[derive(Clone)]
pub struct CloneFactory {
    instance: ClonefactoryInstance<DynProvider>,
    client: EthClient,
}

impl CloneFactory {
    /// Bind to a deployed factory at the given address
    pub fn new(address: Address, client: EthClient) -> Self {
        let instance = Clonefactory::new(address, client.provider());
        Self { instance, client }
    }

    /// Address of the bound factory
    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    /// All rental contracts the factory has cloned so far
    pub async fn contract_list(&self) -> Result<Vec<Address>> {
        self.instance
            .getContractList()
            .call()
            .await
            .context("getContractList call failed")
    }

    /// Rental contract at the given index in factory storage
    pub async fn contract_at(&self, index: U256) -> Result<Address> {
        self.instance
            .rentalContracts(index)
            .call()
            .await
            .context("rentalContracts call failed")
    }

    /// Clone a new rental contract with the given terms
    ///
    /// Requires a client connected with a signer. Returns the hash of the
    /// mined transaction; the new contract address arrives through the
    /// `contractCreated` event.
    pub async fn create_rental_contract(&self, terms: &RentalTerms, pubkey: &str) -> Result<B256> {
        let pending = self
            .instance
            .setCreateNewRentalContract(
                terms.price,
                terms.limit,
                terms.speed,
                terms.length,
                terms.validator,
                pubkey.to_string(),
            )
            .send()
            .await
            .context("setCreateNewRentalContract send failed")?;

        tracing::debug!(tx = %pending.tx_hash(), "setCreateNewRentalContract sent");
        pending
            .watch()
            .await
            .context("setCreateNewRentalContract was not mined")
    }

    /// Purchase an existing rental contract
    ///
    /// `cipher_text` is the buyer's pool destination encrypted against the
    /// seller pubkey announced in `contractCreated`.
    pub async fn purchase_rental_contract(
        &self,
        contract: Address,
        cipher_text: &str,
    ) -> Result<B256> {
        let pending = self
            .instance
            .setPurchaseRentalContract(contract, cipher_text.to_string())
            .send()
            .await
            .context("setPurchaseRentalContract send failed")?;

        tracing::debug!(tx = %pending.tx_hash(), %contract, "setPurchaseRentalContract sent");
        pending
            .watch()
            .await
            .context("setPurchaseRentalContract was not mined")
    }

    /// Historical `contractCreated` logs in a block range
    pub async fn created_in_range(
        &self,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<ContractCreated>> {
        let logs = self
            .created_event()
            .from_block(from_block)
            .to_block(to_block.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number))
            .query()
            .await
            .context("contractCreated query failed")?;
        Ok(logs
            .into_iter()
            .map(|(decoded, log)| convert_created(decoded, &log))
            .collect())
    }

    /// Historical `clonefactoryContractPurchased` logs in a block range,
    /// optionally narrowed to one rental contract
    pub async fn purchased_in_range(
        &self,
        from_block: u64,
        to_block: Option<u64>,
        contract: Option<Address>,
    ) -> Result<Vec<ContractPurchased>> {
        let mut event = self
            .purchased_event()
            .from_block(from_block)
            .to_block(to_block.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number));
        if let Some(contract) = contract {
            event = event.topic1(contract.into_word());
        }
        let logs = event
            .query()
            .await
            .context("clonefactoryContractPurchased query failed")?;
        Ok(logs
            .into_iter()
            .map(|(decoded, log)| convert_purchased(decoded, &log))
            .collect())
    }

    /// Stream `contractCreated` events from the head of the chain
    pub async fn watch_created(&self) -> Result<EventStream<ContractCreated>> {
        spawn_event_forwarder(
            self.created_event(),
            self.client.supports_subscriptions(),
            convert_created,
        )
        .await
    }

    /// Stream `clonefactoryContractPurchased` events from the head of the
    /// chain
    pub async fn watch_purchased(&self) -> Result<EventStream<ContractPurchased>> {
        spawn_event_forwarder(
            self.purchased_event(),
            self.client.supports_subscriptions(),
            convert_purchased,
        )
        .await
    }

    fn created_event(&self) -> Event<DynProvider, Clonefactory::contractCreated> {
        Event::new(self.client.provider(), self.event_filter::<Clonefactory::contractCreated>())
    }

    fn purchased_event(&self) -> Event<DynProvider, Clonefactory::clonefactoryContractPurchased> {
        Event::new(
            self.client.provider(),
            self.event_filter::<Clonefactory::clonefactoryContractPurchased>(),
        )
    }

    fn event_filter<E: SolEvent>(&self) -> Filter {
        Filter::new()
            .address(self.address())
            .event_signature(E::SIGNATURE_HASH)
    }
}

fn convert_created(decoded: Clonefactory::contractCreated, log: &Log) -> ContractCreated {
    ContractCreated {
        contract: decoded._address,
        pubkey: decoded._pubkey,
        block_number: log.block_number,
        tx_hash: log.transaction_hash,
        log_index: log.log_index,
    }
}

fn convert_purchased(
    decoded: Clonefactory::clonefactoryContractPurchased,
    log: &Log,
) -> ContractPurchased {
    ContractPurchased {
        contract: decoded._address,
        block_number: log.block_number,
        tx_hash: log.transaction_hash,
        log_index: log.log_index,
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;
    use crate::infrastructure::ethereum::ProviderConfig;

    async fn factory() -> CloneFactory {
        // HTTP connect does no I/O until a request is sent
        let client = EthClient::connect(ProviderConfig::Http(
            "http://localhost:8545".to_string(),
        ))
        .await
        .unwrap();
        CloneFactory::new(
            address!("4444444444444444444444444444444444444444"),
            client,
        )
    }

    #[tokio::test]
    async fn test_event_helpers_build_over_dyn_provider() {
        let factory = factory().await;
        let _created: Event<DynProvider, Clonefactory::contractCreated> = factory.created_event();
        let _purchased: Event<DynProvider, Clonefactory::clonefactoryContractPurchased> =
            factory.purchased_event();
    }

    #[tokio::test]
    async fn test_event_filter_pins_address_and_topic() {
        let factory = factory().await;
        let filter = factory.event_filter::<Clonefactory::contractCreated>();
        assert_eq!(filter.topics[0], Clonefactory::contractCreated::SIGNATURE_HASH.into());
        assert!(filter.address.matches(&factory.address()));
    }
}
