//! Dynamic calldata and log decoding using alloy-dyn-abi
//!
//! The typed wrappers in [`crate::contracts`] decode through generated
//! types; this decoder is the untyped path for raw bytes coming from a
//! node or a transaction inspector.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use super::{AbiError, AbiRegistry, ParamSpec};

/// A decoded function or event argument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedArg {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256")
    pub kind: String,
    /// Decoded value as a formatted string
    pub value: String,
}

/// Result of decoding a function call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedCall {
    /// Function name
    pub function_name: String,
    /// Canonical signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Contract the selector was found in
    pub contract: String,
    /// Decoded arguments
    pub arguments: Vec<DecodedArg>,
}

/// Result of decoding an event log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedEvent {
    /// Event name
    pub event_name: String,
    /// Canonical signature (e.g., "Transfer(address,address,uint256)")
    pub signature: String,
    /// Contract the topic was found in
    pub contract: String,
    /// Decoded arguments in declaration order
    pub arguments: Vec<DecodedArg>,
}

/// Decoder over the Lumerin selector/topic registry
pub struct LumerinDecoder {
    registry: AbiRegistry,
}

impl LumerinDecoder {
    /// Decoder over the embedded Clonefactory and Lumerintoken ABIs
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            registry: AbiRegistry::lumerin()?,
        })
    }

    /// Decoder over a caller-supplied registry
    pub fn with_registry(registry: AbiRegistry) -> Self {
        Self { registry }
    }

    /// Get the underlying registry
    pub fn registry(&self) -> &AbiRegistry {
        &self.registry
    }

    /// Decode calldata by looking up its 4-byte selector
    ///
    /// Returns `Ok(None)` if the selector is not part of either ABI.
    pub fn decode_calldata(&self, data: &[u8]) -> Result<Option<DecodedCall>, AbiError> {
        if data.len() < 4 {
            return Err(AbiError::CalldataTooShort(data.len()));
        }
        let selector = [data[0], data[1], data[2], data[3]];
        let Some(function) = self.registry.function(selector) else {
            return Ok(None);
        };

        let values = decode_tuple(&function.inputs, &data[4..])?;
        let arguments = zip_arguments(&function.inputs, values);

        Ok(Some(DecodedCall {
            function_name: function.name.clone(),
            signature: function.signature.clone(),
            contract: function.contract.clone(),
            arguments,
        }))
    }

    /// Decode a raw log by looking up its topic0 hash
    ///
    /// Returns `Ok(None)` if topic0 is missing or not part of either ABI.
    /// Indexed dynamic parameters (strings, bytes) only carry their hash
    /// on-chain; those are rendered as the topic hash.
    pub fn decode_log(
        &self,
        topics: &[B256],
        data: &[u8],
    ) -> Result<Option<DecodedEvent>, AbiError> {
        let Some(topic0) = topics.first() else {
            return Ok(None);
        };
        let Some(event) = self.registry.event(*topic0) else {
            return Ok(None);
        };

        let body_specs: Vec<ParamSpec> = event
            .inputs
            .iter()
            .filter(|param| !param.indexed)
            .cloned()
            .collect();
        let mut body_values = decode_tuple(&body_specs, data)?.into_iter();
        let mut topic_iter = topics.iter().skip(1);

        let mut arguments = Vec::with_capacity(event.inputs.len());
        for (idx, param) in event.inputs.iter().enumerate() {
            let value = if param.indexed {
                let topic = topic_iter
                    .next()
                    .ok_or_else(|| AbiError::MissingTopic(param.name.clone()))?;
                decode_topic(&param.kind, topic)?
            } else {
                match body_values.next() {
                    Some(value) => format_dyn_sol_value(&value),
                    None => return Err(AbiError::Decode("log data truncated".to_string())),
                }
            };

            arguments.push(DecodedArg {
                name: display_name(&param.name, idx),
                kind: param.kind.clone(),
                value,
            });
        }

        Ok(Some(DecodedEvent {
            event_name: event.name.clone(),
            signature: event.signature.clone(),
            contract: event.contract.clone(),
            arguments,
        }))
    }
}

/// Decode a flat parameter list as a tuple
fn decode_tuple(specs: &[ParamSpec], data: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
    if specs.is_empty() {
        return Ok(Vec::new());
    }

    let types: Vec<DynSolType> = specs
        .iter()
        .map(|param| {
            param.kind.parse::<DynSolType>().map_err(|err| AbiError::TypeParse {
                kind: param.kind.clone(),
                message: err.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Calldata arguments and event data are encoded as a parameter
    // sequence, not as a single offset-wrapped tuple value.
    let tuple_type = DynSolType::Tuple(types);
    let decoded = tuple_type
        .abi_decode_params(data)
        .map_err(|err| AbiError::Decode(err.to_string()))?;

    match decoded {
        DynSolValue::Tuple(values) => Ok(values),
        other => Ok(vec![other]),
    }
}

/// Decode a single indexed topic word
fn decode_topic(kind: &str, topic: &B256) -> Result<String, AbiError> {
    let ty = kind.parse::<DynSolType>().map_err(|err| AbiError::TypeParse {
        kind: kind.to_string(),
        message: err.to_string(),
    })?;

    // Dynamic types are stored as their keccak hash in the topic; the
    // original value is unrecoverable.
    match ty {
        DynSolType::String
        | DynSolType::Bytes
        | DynSolType::Array(_)
        | DynSolType::FixedArray(_, _)
        | DynSolType::Tuple(_) => Ok(format!("{topic}")),
        elementary => {
            let value = elementary
                .abi_decode(topic.as_slice())
                .map_err(|err| AbiError::Decode(err.to_string()))?;
            Ok(format_dyn_sol_value(&value))
        }
    }
}

fn display_name(name: &str, idx: usize) -> String {
    if name.trim().is_empty() {
        format!("arg{idx}")
    } else {
        name.to_string()
    }
}

fn zip_arguments(specs: &[ParamSpec], values: Vec<DynSolValue>) -> Vec<DecodedArg> {
    specs
        .iter()
        .zip(values.iter())
        .enumerate()
        .map(|(idx, (param, value))| DecodedArg {
            name: display_name(&param.name, idx),
            kind: param.kind.clone(),
            value: format_dyn_sol_value(value),
        })
        .collect()
}

/// Format a DynSolValue for display
fn format_dyn_sol_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            format!("0x{}", hex::encode(bytes))
        }
        DynSolValue::Address(addr) => format!("{addr:?}"),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => format!("\"{s}\""),
        DynSolValue::Array(arr) | DynSolValue::FixedArray(arr) => {
            let items: Vec<String> = arr.iter().map(format_dyn_sol_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_dyn_sol_value).collect();
            format!("({})", items.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::b256;

    use super::*;

    fn decoder() -> LumerinDecoder {
        LumerinDecoder::new().unwrap()
    }

    #[test]
    fn test_decode_transfer_calldata() {
        // transfer(0x1234567890123456789012345678901234567890, 1000)
        let calldata = hex::decode(
            "a9059cbb000000000000000000000000123456789012345678901234567890123456789000000000000000000000000000000000000000000000000000000000000003e8"
        ).unwrap();

        let decoded = decoder().decode_calldata(&calldata).unwrap().unwrap();

        assert_eq!(decoded.function_name, "transfer");
        assert_eq!(decoded.contract, "Lumerintoken");
        assert_eq!(decoded.arguments.len(), 2);
        assert_eq!(decoded.arguments[0].name, "to");
        assert!(decoded.arguments[0].value.contains("1234567890"));
        assert_eq!(decoded.arguments[1].name, "amount");
        assert_eq!(decoded.arguments[1].value, "1000");
    }

    #[test]
    fn test_decode_purchase_calldata() {
        // setPurchaseRentalContract(0x1111..., "secret")
        let calldata = hex::decode(concat!(
            "739a8353",
            "0000000000000000000000001111111111111111111111111111111111111111",
            "0000000000000000000000000000000000000000000000000000000000000040",
            "0000000000000000000000000000000000000000000000000000000000000006",
            "7365637265740000000000000000000000000000000000000000000000000000",
        ))
        .unwrap();

        let decoded = decoder().decode_calldata(&calldata).unwrap().unwrap();

        assert_eq!(decoded.function_name, "setPurchaseRentalContract");
        assert_eq!(decoded.contract, "Clonefactory");
        assert_eq!(decoded.arguments[0].name, "contractAddress");
        assert_eq!(decoded.arguments[1].name, "_cipherText");
        assert_eq!(decoded.arguments[1].value, "\"secret\"");
    }

    #[test]
    fn test_decode_unknown_selector() {
        let calldata = hex::decode("deadbeef00000000").unwrap();
        assert!(decoder().decode_calldata(&calldata).unwrap().is_none());
    }

    #[test]
    fn test_decode_short_calldata() {
        let err = decoder().decode_calldata(&[0xa9, 0x05]).unwrap_err();
        assert!(matches!(err, AbiError::CalldataTooShort(2)));
    }

    #[test]
    fn test_decode_transfer_log() {
        let topics = vec![
            b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"),
            b256!("0000000000000000000000001111111111111111111111111111111111111111"),
            b256!("0000000000000000000000002222222222222222222222222222222222222222"),
        ];
        let data =
            hex::decode("00000000000000000000000000000000000000000000000000000000000003e8")
                .unwrap();

        let decoded = decoder().decode_log(&topics, &data).unwrap().unwrap();

        assert_eq!(decoded.event_name, "Transfer");
        assert_eq!(decoded.arguments.len(), 3);
        assert!(decoded.arguments[0].value.contains("1111111111111111"));
        assert!(decoded.arguments[1].value.contains("2222222222222222"));
        assert_eq!(decoded.arguments[2].name, "value");
        assert_eq!(decoded.arguments[2].value, "1000");
    }

    #[test]
    fn test_decode_contract_created_log() {
        let topics = vec![
            b256!("1b08e1646439b7521399d47f93ab6b1ebc92803e155d0b2f2ad2d4702a050804"),
            b256!("0000000000000000000000003333333333333333333333333333333333333333"),
        ];
        // abi-encoded string "test"
        let data = hex::decode(concat!(
            "0000000000000000000000000000000000000000000000000000000000000020",
            "0000000000000000000000000000000000000000000000000000000000000004",
            "7465737400000000000000000000000000000000000000000000000000000000",
        ))
        .unwrap();

        let decoded = decoder().decode_log(&topics, &data).unwrap().unwrap();

        assert_eq!(decoded.event_name, "contractCreated");
        assert_eq!(decoded.arguments[0].name, "_address");
        assert!(decoded.arguments[0].value.contains("3333333333333333"));
        assert_eq!(decoded.arguments[1].name, "_pubkey");
        assert_eq!(decoded.arguments[1].value, "\"test\"");
    }

    #[test]
    fn test_decode_log_unknown_topic() {
        let topics = vec![b256!(
            "00000000000000000000000000000000000000000000000000000000deadbeef"
        )];
        assert!(decoder().decode_log(&topics, &[]).unwrap().is_none());
    }

    #[test]
    fn test_decode_log_missing_topic() {
        // Transfer expects two indexed topics after topic0
        let topics = vec![b256!(
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        )];
        let data =
            hex::decode("00000000000000000000000000000000000000000000000000000000000003e8")
                .unwrap();
        let err = decoder().decode_log(&topics, &data).unwrap_err();
        assert!(matches!(err, AbiError::MissingTopic(_)));
    }
}
