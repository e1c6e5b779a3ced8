//! ABI registry and dynamic decoding for the two Lumerin contracts

mod decoder;
mod registry;

pub use decoder::{DecodedArg, DecodedCall, DecodedEvent, LumerinDecoder};
pub use registry::{AbiRegistry, EventEntry, FunctionEntry, ParamSpec};

/// Clonefactory ABI document, byte-for-byte as deployed
pub const CLONEFACTORY_ABI: &str = include_str!("../../../abi/clonefactory.json");

/// Lumerintoken ABI document, byte-for-byte as deployed
pub const LUMERINTOKEN_ABI: &str = include_str!("../../../abi/lumerintoken.json");

/// Errors raised while decoding calldata or logs against the registry
#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("calldata too short: {0} bytes (need at least 4 for the selector)")]
    CalldataTooShort(usize),

    #[error("failed to parse type '{kind}': {message}")]
    TypeParse { kind: String, message: String },

    #[error("abi decoding failed: {0}")]
    Decode(String),

    #[error("log is missing an indexed topic for '{0}'")]
    MissingTopic(String),
}
