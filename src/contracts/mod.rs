//! Typed bindings for the deployed Lumerin contracts
//!
//! The `sol!` invocations generate call/return/event types straight from
//! the ABI documents under `abi/`, so every selector and topic hash is
//! derived from the same JSON the deployed bytecode answers to. The
//! wrapper types ([`CloneFactory`], [`LumerinToken`]) put a snake_case,
//! `Result`-returning surface over the generated instances.

mod clonefactory;
mod stream;
mod token;

pub use clonefactory::{CloneFactory, ContractCreated, ContractPurchased, RentalTerms};
pub use stream::EventStream;
pub use token::{LumerinToken, TokenApproval, TokenMetadata, TokenTransfer};

use alloy::sol;

sol!(
    #[allow(non_camel_case_types, missing_docs)]
    #[sol(rpc)]
    Clonefactory,
    "abi/clonefactory.json"
);

sol!(
    #[allow(non_camel_case_types, missing_docs)]
    #[sol(rpc)]
    Lumerintoken,
    "abi/lumerintoken.json"
);

#[cfg(test)]
mod tests {
    use alloy::primitives::b256;
    use alloy::sol_types::{SolCall, SolEvent};

    use super::*;

    #[test]
    fn test_clonefactory_selectors() {
        assert_eq!(
            Clonefactory::getContractListCall::SELECTOR,
            [0x99, 0xac, 0xac, 0x8c]
        );
        assert_eq!(
            Clonefactory::rentalContractsCall::SELECTOR,
            [0x53, 0xda, 0x02, 0x06]
        );
        assert_eq!(
            Clonefactory::setCreateNewRentalContractCall::SELECTOR,
            [0x86, 0x71, 0x26, 0x86]
        );
        assert_eq!(
            Clonefactory::setPurchaseRentalContractCall::SELECTOR,
            [0x73, 0x9a, 0x83, 0x53]
        );
    }

    #[test]
    fn test_clonefactory_event_topics() {
        assert_eq!(
            Clonefactory::contractCreated::SIGNATURE_HASH,
            b256!("1b08e1646439b7521399d47f93ab6b1ebc92803e155d0b2f2ad2d4702a050804")
        );
        assert_eq!(
            Clonefactory::clonefactoryContractPurchased::SIGNATURE_HASH,
            b256!("bf1df41b401a1bb8d9bd03fb6fe59b6ced0e61a76cdd3d3d511b4d06eb2cdebe")
        );
    }

    #[test]
    fn test_token_selectors() {
        assert_eq!(Lumerintoken::transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(Lumerintoken::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(
            Lumerintoken::transferFromCall::SELECTOR,
            [0x23, 0xb8, 0x72, 0xdd]
        );
        assert_eq!(Lumerintoken::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(Lumerintoken::allowanceCall::SELECTOR, [0xdd, 0x62, 0xed, 0x3e]);
        assert_eq!(
            Lumerintoken::totalSupplyCall::SELECTOR,
            [0x18, 0x16, 0x0d, 0xdd]
        );
        assert_eq!(Lumerintoken::burnCall::SELECTOR, [0x42, 0x96, 0x6c, 0x68]);
        assert_eq!(Lumerintoken::burnFromCall::SELECTOR, [0x79, 0xcc, 0x67, 0x90]);
        assert_eq!(Lumerintoken::pauseCall::SELECTOR, [0x84, 0x56, 0xcb, 0x59]);
        assert_eq!(Lumerintoken::unpauseCall::SELECTOR, [0x3f, 0x4b, 0xa8, 0x3a]);
        assert_eq!(
            Lumerintoken::transferOwnershipCall::SELECTOR,
            [0xf2, 0xfd, 0xe3, 0x8b]
        );
        assert_eq!(
            Lumerintoken::renounceOwnershipCall::SELECTOR,
            [0x71, 0x50, 0x18, 0xa6]
        );
    }

    #[test]
    fn test_token_event_topics() {
        assert_eq!(
            Lumerintoken::Transfer::SIGNATURE_HASH,
            b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
        assert_eq!(
            Lumerintoken::Approval::SIGNATURE_HASH,
            b256!("8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925")
        );
        assert_eq!(
            Lumerintoken::OwnershipTransferred::SIGNATURE_HASH,
            b256!("8be0079c531659141344cd1fd0a4f28419497f9722a3daafe3b4186f6b6457e0")
        );
        assert_eq!(
            Lumerintoken::Paused::SIGNATURE_HASH,
            b256!("62e78cea01bee320cd4e420270b5ea74000d11b0c9f74754ebdbfc544b05a258")
        );
        assert_eq!(
            Lumerintoken::Unpaused::SIGNATURE_HASH,
            b256!("5db9ee0a495bf2e6ff9c91a7834c1ba4fdd244a5e8aa4e537bd38aeae4b073aa")
        );
    }
}
