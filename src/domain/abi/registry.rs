//! Selector and topic registry built from the embedded ABI documents

use std::collections::HashMap;

use alloy_json_abi::JsonAbi;
use alloy_primitives::B256;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{CLONEFACTORY_ABI, LUMERINTOKEN_ABI};

/// A function or event parameter specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Canonical Solidity type (e.g., "address", "uint256")
    pub kind: String,
    /// Whether the parameter is an indexed event topic
    pub indexed: bool,
}

/// A contract function indexed by its 4-byte selector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEntry {
    /// 4-byte function selector
    pub selector: [u8; 4],
    /// Function name
    pub name: String,
    /// Canonical signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
    /// Contract the function belongs to
    pub contract: String,
}

impl FunctionEntry {
    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }
}

/// A contract event indexed by its topic0 hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    /// keccak256 hash of the event signature
    pub topic0: B256,
    /// Event name
    pub name: String,
    /// Canonical signature (e.g., "Transfer(address,address,uint256)")
    pub signature: String,
    /// Event parameters in declaration order
    pub inputs: Vec<ParamSpec>,
    /// Whether the event is anonymous (no topic0)
    pub anonymous: bool,
    /// Contract the event belongs to
    pub contract: String,
}

/// Registry of functions by selector and events by topic0
///
/// Covers both Lumerin contracts; the two ABIs share the ERC20 selectors
/// with every other token, so a lookup identifies the signature, not the
/// emitting contract.
#[derive(Debug, Default, Clone)]
pub struct AbiRegistry {
    functions: HashMap<[u8; 4], FunctionEntry>,
    events: HashMap<B256, EventEntry>,
}

impl AbiRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry over the embedded Clonefactory and Lumerintoken ABIs
    pub fn lumerin() -> Result<Self> {
        let mut registry = Self::new();
        registry.load_abi("Clonefactory", CLONEFACTORY_ABI)?;
        registry.load_abi("Lumerintoken", LUMERINTOKEN_ABI)?;
        Ok(registry)
    }

    /// Load every function and event from an ABI JSON document
    ///
    /// Note: first entry for a given selector/topic wins (no overwrite)
    pub fn load_abi(&mut self, contract: &str, abi_json: &str) -> Result<()> {
        let abi: JsonAbi = serde_json::from_str(abi_json)
            .with_context(|| format!("Invalid ABI JSON for {contract}"))?;

        for function in abi.functions() {
            let entry = FunctionEntry {
                selector: function.selector().0,
                name: function.name.clone(),
                signature: function.signature(),
                inputs: function
                    .inputs
                    .iter()
                    .map(|param| ParamSpec {
                        name: param.name.clone(),
                        kind: param.selector_type().to_string(),
                        indexed: false,
                    })
                    .collect(),
                contract: contract.to_string(),
            };
            self.functions.entry(entry.selector).or_insert(entry);
        }

        for event in abi.events() {
            let entry = EventEntry {
                topic0: event.selector(),
                name: event.name.clone(),
                signature: event.signature(),
                inputs: event
                    .inputs
                    .iter()
                    .map(|param| ParamSpec {
                        name: param.name.clone(),
                        kind: param.selector_type().to_string(),
                        indexed: param.indexed,
                    })
                    .collect(),
                anonymous: event.anonymous,
                contract: contract.to_string(),
            };
            self.events.entry(entry.topic0).or_insert(entry);
        }

        Ok(())
    }

    /// Look up a function by selector
    pub fn function(&self, selector: [u8; 4]) -> Option<&FunctionEntry> {
        self.functions.get(&selector)
    }

    /// Look up a function by selector hex string (e.g., "0xa9059cbb")
    pub fn function_hex(&self, selector_hex: &str) -> Option<&FunctionEntry> {
        let normalized = selector_hex
            .strip_prefix("0x")
            .or_else(|| selector_hex.strip_prefix("0X"))
            .unwrap_or(selector_hex);

        if normalized.len() != 8 {
            return None;
        }

        let bytes = hex::decode(normalized).ok()?;
        let selector: [u8; 4] = bytes.try_into().ok()?;
        self.function(selector)
    }

    /// Look up an event by its topic0 hash
    pub fn event(&self, topic0: B256) -> Option<&EventEntry> {
        self.events.get(&topic0)
    }

    /// Number of registered functions
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Number of registered events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// All registered functions
    pub fn functions(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.functions.values()
    }

    /// All registered events
    pub fn events(&self) -> impl Iterator<Item = &EventEntry> {
        self.events.values()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::b256;

    use super::*;

    #[test]
    fn test_lumerin_registry_counts() {
        let registry = AbiRegistry::lumerin().unwrap();
        // 4 factory functions + 19 token functions
        assert_eq!(registry.function_count(), 23);
        // 2 factory events + 5 token events
        assert_eq!(registry.event_count(), 7);
    }

    #[test]
    fn test_factory_selectors() {
        let registry = AbiRegistry::lumerin().unwrap();

        let list = registry.function([0x99, 0xac, 0xac, 0x8c]).unwrap();
        assert_eq!(list.name, "getContractList");
        assert_eq!(list.signature, "getContractList()");
        assert!(list.inputs.is_empty());

        let create = registry.function_hex("0x86712686").unwrap();
        assert_eq!(create.name, "setCreateNewRentalContract");
        assert_eq!(
            create.signature,
            "setCreateNewRentalContract(uint256,uint256,uint256,uint256,address,string)"
        );
        assert_eq!(create.contract, "Clonefactory");

        let purchase = registry.function_hex("0x739a8353").unwrap();
        assert_eq!(
            purchase.signature,
            "setPurchaseRentalContract(address,string)"
        );

        let at = registry.function_hex("0x53da0206").unwrap();
        assert_eq!(at.signature, "rentalContracts(uint256)");
    }

    #[test]
    fn test_token_selectors() {
        let registry = AbiRegistry::lumerin().unwrap();

        for (selector, signature) in [
            ("0xa9059cbb", "transfer(address,uint256)"),
            ("0x095ea7b3", "approve(address,uint256)"),
            ("0x23b872dd", "transferFrom(address,address,uint256)"),
            ("0x70a08231", "balanceOf(address)"),
            ("0xdd62ed3e", "allowance(address,address)"),
            ("0x42966c68", "burn(uint256)"),
            ("0x79cc6790", "burnFrom(address,uint256)"),
            ("0x39509351", "increaseAllowance(address,uint256)"),
            ("0xa457c2d7", "decreaseAllowance(address,uint256)"),
            ("0x8456cb59", "pause()"),
            ("0x3f4ba83a", "unpause()"),
            ("0xf2fde38b", "transferOwnership(address)"),
        ] {
            let entry = registry.function_hex(selector).unwrap();
            assert_eq!(entry.signature, signature, "selector {selector}");
            assert_eq!(entry.contract, "Lumerintoken");
        }
    }

    #[test]
    fn test_event_topics() {
        let registry = AbiRegistry::lumerin().unwrap();

        let created = registry
            .event(b256!(
                "1b08e1646439b7521399d47f93ab6b1ebc92803e155d0b2f2ad2d4702a050804"
            ))
            .unwrap();
        assert_eq!(created.signature, "contractCreated(address,string)");
        assert!(created.inputs[0].indexed);
        assert!(!created.inputs[1].indexed);

        let purchased = registry
            .event(b256!(
                "bf1df41b401a1bb8d9bd03fb6fe59b6ced0e61a76cdd3d3d511b4d06eb2cdebe"
            ))
            .unwrap();
        assert_eq!(purchased.signature, "clonefactoryContractPurchased(address)");

        let transfer = registry
            .event(b256!(
                "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
            ))
            .unwrap();
        assert_eq!(transfer.signature, "Transfer(address,address,uint256)");
        assert_eq!(transfer.contract, "Lumerintoken");
    }

    #[test]
    fn test_unknown_selector() {
        let registry = AbiRegistry::lumerin().unwrap();
        assert!(registry.function([0xde, 0xad, 0xbe, 0xef]).is_none());
        assert!(registry.function_hex("0xdeadbeef").is_none());
        assert!(registry.function_hex("not-hex").is_none());
    }

    #[test]
    fn test_first_wins_on_duplicate_load() {
        let mut registry = AbiRegistry::new();
        registry.load_abi("First", LUMERINTOKEN_ABI).unwrap();
        registry.load_abi("Second", LUMERINTOKEN_ABI).unwrap();

        let transfer = registry.function_hex("0xa9059cbb").unwrap();
        assert_eq!(transfer.contract, "First");
    }
}
