//! High-level wrapper around the Lumerintoken (LMR) ERC20 contract

use alloy::contract::Event;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::DynProvider;
use alloy::rpc::types::{BlockNumberOrTag, Filter, Log};
use alloy::sol_types::SolEvent;
use anyhow::{Context, Result};

use super::stream::{spawn_event_forwarder, EventStream};
use super::Lumerintoken::{self, LumerintokenInstance};
use crate::infrastructure::ethereum::EthClient;

/// Token metadata snapshot
#[derive(Debug, Clone)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

/// A `Transfer` log with provenance
#[derive(Debug, Clone)]
pub struct TokenTransfer {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub block_number: Option<u64>,
    pub tx_hash: Option<B256>,
    pub log_index: Option<u64>,
}

/// An `Approval` log with provenance
#[derive(Debug, Clone)]
pub struct TokenApproval {
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
    pub block_number: Option<u64>,
    pub tx_hash: Option<B256>,
    pub log_index: Option<u64>,
}

/// Read, transact and watch interface to the deployed LMR token
#[derive(Clone)]
pub struct LumerinToken {
    instance: LumerintokenInstance<DynProvider>,
    client: EthClient,
}

impl LumerinToken {
    /// Bind to the deployed token at the given address
    pub fn new(address: Address, client: EthClient) -> Self {
        let instance = Lumerintoken::new(address, client.provider());
        Self { instance, client }
    }

    /// Address of the bound token
    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    // --- metadata ---

    pub async fn name(&self) -> Result<String> {
        self.instance.name().call().await.context("name call failed")
    }

    pub async fn symbol(&self) -> Result<String> {
        self.instance
            .symbol()
            .call()
            .await
            .context("symbol call failed")
    }

    pub async fn decimals(&self) -> Result<u8> {
        self.instance
            .decimals()
            .call()
            .await
            .context("decimals call failed")
    }

    pub async fn total_supply(&self) -> Result<U256> {
        self.instance
            .totalSupply()
            .call()
            .await
            .context("totalSupply call failed")
    }

    /// Fetch name, symbol, decimals and totalSupply in one go
    pub async fn metadata(&self) -> Result<TokenMetadata> {
        Ok(TokenMetadata {
            name: self.name().await?,
            symbol: self.symbol().await?,
            decimals: self.decimals().await?,
            total_supply: self.total_supply().await?,
        })
    }

    // --- balances and allowances ---

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        self.instance
            .balanceOf(account)
            .call()
            .await
            .context("balanceOf call failed")
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.instance
            .allowance(owner, spender)
            .call()
            .await
            .context("allowance call failed")
    }

    // --- transfers and approvals (require a signer) ---

    /// Transfer tokens to `to`; returns the mined transaction hash
    pub async fn transfer(&self, to: Address, amount: U256) -> Result<B256> {
        let pending = self
            .instance
            .transfer(to, amount)
            .send()
            .await
            .context("transfer send failed")?;
        tracing::debug!(tx = %pending.tx_hash(), %to, "transfer sent");
        pending.watch().await.context("transfer was not mined")
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<B256> {
        let pending = self
            .instance
            .approve(spender, amount)
            .send()
            .await
            .context("approve send failed")?;
        pending.watch().await.context("approve was not mined")
    }

    pub async fn transfer_from(&self, from: Address, to: Address, amount: U256) -> Result<B256> {
        let pending = self
            .instance
            .transferFrom(from, to, amount)
            .send()
            .await
            .context("transferFrom send failed")?;
        pending.watch().await.context("transferFrom was not mined")
    }

    pub async fn increase_allowance(&self, spender: Address, added: U256) -> Result<B256> {
        let pending = self
            .instance
            .increaseAllowance(spender, added)
            .send()
            .await
            .context("increaseAllowance send failed")?;
        pending
            .watch()
            .await
            .context("increaseAllowance was not mined")
    }

    pub async fn decrease_allowance(&self, spender: Address, subtracted: U256) -> Result<B256> {
        let pending = self
            .instance
            .decreaseAllowance(spender, subtracted)
            .send()
            .await
            .context("decreaseAllowance send failed")?;
        pending
            .watch()
            .await
            .context("decreaseAllowance was not mined")
    }

    // --- burning ---

    /// Burn tokens from the signer's own balance
    pub async fn burn(&self, amount: U256) -> Result<B256> {
        let pending = self
            .instance
            .burn(amount)
            .send()
            .await
            .context("burn send failed")?;
        pending.watch().await.context("burn was not mined")
    }

    /// Burn tokens from `account` using the signer's allowance
    pub async fn burn_from(&self, account: Address, amount: U256) -> Result<B256> {
        let pending = self
            .instance
            .burnFrom(account, amount)
            .send()
            .await
            .context("burnFrom send failed")?;
        pending.watch().await.context("burnFrom was not mined")
    }

    // --- pause switch (owner only on-chain) ---

    pub async fn paused(&self) -> Result<bool> {
        self.instance
            .paused()
            .call()
            .await
            .context("paused call failed")
    }

    pub async fn pause(&self) -> Result<B256> {
        let pending = self
            .instance
            .pause()
            .send()
            .await
            .context("pause send failed")?;
        pending.watch().await.context("pause was not mined")
    }

    pub async fn unpause(&self) -> Result<B256> {
        let pending = self
            .instance
            .unpause()
            .send()
            .await
            .context("unpause send failed")?;
        pending.watch().await.context("unpause was not mined")
    }

    // --- ownership ---

    pub async fn owner(&self) -> Result<Address> {
        self.instance
            .owner()
            .call()
            .await
            .context("owner call failed")
    }

    pub async fn transfer_ownership(&self, new_owner: Address) -> Result<B256> {
        let pending = self
            .instance
            .transferOwnership(new_owner)
            .send()
            .await
            .context("transferOwnership send failed")?;
        pending
            .watch()
            .await
            .context("transferOwnership was not mined")
    }

    pub async fn renounce_ownership(&self) -> Result<B256> {
        let pending = self
            .instance
            .renounceOwnership()
            .send()
            .await
            .context("renounceOwnership send failed")?;
        pending
            .watch()
            .await
            .context("renounceOwnership was not mined")
    }

    // --- events ---

    /// Historical `Transfer` logs in a block range, optionally narrowed
    /// by sender and/or recipient
    pub async fn transfers_in_range(
        &self,
        from_block: u64,
        to_block: Option<u64>,
        from: Option<Address>,
        to: Option<Address>,
    ) -> Result<Vec<TokenTransfer>> {
        let mut event = self
            .transfer_event()
            .from_block(from_block)
            .to_block(to_block.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number));
        if let Some(from) = from {
            event = event.topic1(from.into_word());
        }
        if let Some(to) = to {
            event = event.topic2(to.into_word());
        }
        let logs = event.query().await.context("Transfer query failed")?;
        Ok(logs
            .into_iter()
            .map(|(decoded, log)| convert_transfer(decoded, &log))
            .collect())
    }

    /// Historical `Approval` logs in a block range
    pub async fn approvals_in_range(
        &self,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<TokenApproval>> {
        let logs = self
            .approval_event()
            .from_block(from_block)
            .to_block(to_block.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number))
            .query()
            .await
            .context("Approval query failed")?;
        Ok(logs
            .into_iter()
            .map(|(decoded, log)| convert_approval(decoded, &log))
            .collect())
    }

    /// Stream `Transfer` events from the head of the chain
    pub async fn watch_transfers(&self) -> Result<EventStream<TokenTransfer>> {
        spawn_event_forwarder(
            self.transfer_event(),
            self.client.supports_subscriptions(),
            convert_transfer,
        )
        .await
    }

    /// Stream `Approval` events from the head of the chain
    pub async fn watch_approvals(&self) -> Result<EventStream<TokenApproval>> {
        spawn_event_forwarder(
            self.approval_event(),
            self.client.supports_subscriptions(),
            convert_approval,
        )
        .await
    }

    fn transfer_event(&self) -> Event<DynProvider, Lumerintoken::Transfer> {
        Event::new(self.client.provider(), self.event_filter::<Lumerintoken::Transfer>())
    }

    fn approval_event(&self) -> Event<DynProvider, Lumerintoken::Approval> {
        Event::new(self.client.provider(), self.event_filter::<Lumerintoken::Approval>())
    }

    fn event_filter<E: SolEvent>(&self) -> Filter {
        Filter::new()
            .address(self.address())
            .event_signature(E::SIGNATURE_HASH)
    }
}

fn convert_transfer(decoded: Lumerintoken::Transfer, log: &Log) -> TokenTransfer {
    TokenTransfer {
        from: decoded.from,
        to: decoded.to,
        value: decoded.value,
        block_number: log.block_number,
        tx_hash: log.transaction_hash,
        log_index: log.log_index,
    }
}

fn convert_approval(decoded: Lumerintoken::Approval, log: &Log) -> TokenApproval {
    TokenApproval {
        owner: decoded.owner,
        spender: decoded.spender,
        value: decoded.value,
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

    async fn token() -> LumerinToken {
        // HTTP connect does no I/O until a request is sent
        let client = EthClient::connect(ProviderConfig::Http(
            "http://localhost:8545".to_string(),
        ))
        .await
        .unwrap();
        LumerinToken::new(
            address!("5555555555555555555555555555555555555555"),
            client,
        )
    }

    #[tokio::test]
    async fn test_event_helpers_build_over_dyn_provider() {
        let token = token().await;
        let _transfers: Event<DynProvider, Lumerintoken::Transfer> = token.transfer_event();
        let _approvals: Event<DynProvider, Lumerintoken::Approval> = token.approval_event();
    }

    #[tokio::test]
    async fn test_event_filter_pins_address_and_topic() {
        let token = token().await;
        let filter = token.event_filter::<Lumerintoken::Transfer>();
        assert_eq!(filter.topics[0], Lumerintoken::Transfer::SIGNATURE_HASH.into());
        assert!(filter.address.matches(&token.address()));
    }
}
