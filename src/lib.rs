//! Typed client bindings for the Lumerin hashpower marketplace contracts.
//!
//! Two contracts are covered, both addressed through their deployed ABI:
//!
//! - **Clonefactory** - the factory that clones hashpower rental contracts
//!   and records purchases.
//! - **Lumerintoken** - the LMR ERC20 token (burnable, pausable, ownable).
//!
//! The ABI documents under `abi/` are preserved byte-for-byte from the
//! deployed contracts; everything in this crate encodes calls and decodes
//! logs against them. [`contracts`] exposes the typed wrappers, [`domain`]
//! the selector/topic registry and dynamic decoders, and
//! [`infrastructure`] the provider plumbing.

pub mod config;
pub mod contracts;
pub mod domain;
pub mod infrastructure;

pub use contracts::{
    CloneFactory, ContractCreated, ContractPurchased, EventStream, LumerinToken, RentalTerms,
    TokenApproval, TokenMetadata, TokenTransfer,
};
pub use domain::abi::{AbiRegistry, DecodedArg, DecodedCall, DecodedEvent, LumerinDecoder};
pub use infrastructure::ethereum::{EthClient, ProviderConfig};
