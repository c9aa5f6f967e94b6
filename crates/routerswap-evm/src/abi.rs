//! Contract-call ABI codec.
//!
//! Every function the client calls is declared once in a static
//! [`FunctionSpec`] table below, so selectors and argument types are checked
//! in one place instead of being parsed from strings at each call site.
//! Word-level encoding is delegated to alloy's dynamic ABI implementation.

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{keccak256, Address, Bytes, U256};
use thiserror::Error;

/// Errors from encoding calls or decoding return data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("{function}: {reason}")]
    ArgumentMismatch {
        function: &'static str,
        reason: String,
    },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// The supported ABI types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiType {
    Address,
    Uint256,
    Bool,
    AddressArray,
    Uint256Array,
}

impl AbiType {
    /// Canonical name used in function signatures.
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Uint256 => "uint256",
            Self::Bool => "bool",
            Self::AddressArray => "address[]",
            Self::Uint256Array => "uint256[]",
        }
    }

    fn sol_type(self) -> DynSolType {
        match self {
            Self::Address => DynSolType::Address,
            Self::Uint256 => DynSolType::Uint(256),
            Self::Bool => DynSolType::Bool,
            Self::AddressArray => DynSolType::Array(Box::new(DynSolType::Address)),
            Self::Uint256Array => DynSolType::Array(Box::new(DynSolType::Uint(256))),
        }
    }
}

/// A typed argument or return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Bool(bool),
    AddressArray(Vec<Address>),
    UintArray(Vec<U256>),
}

impl AbiValue {
    pub fn abi_type(&self) -> AbiType {
        match self {
            Self::Address(_) => AbiType::Address,
            Self::Uint(_) => AbiType::Uint256,
            Self::Bool(_) => AbiType::Bool,
            Self::AddressArray(_) => AbiType::AddressArray,
            Self::UintArray(_) => AbiType::Uint256Array,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint_array(&self) -> Option<&[U256]> {
        match self {
            Self::UintArray(v) => Some(v),
            _ => None,
        }
    }

    fn to_sol(&self) -> DynSolValue {
        match self {
            Self::Address(a) => DynSolValue::Address(*a),
            Self::Uint(v) => DynSolValue::Uint(*v, 256),
            Self::Bool(b) => DynSolValue::Bool(*b),
            Self::AddressArray(items) => {
                DynSolValue::Array(items.iter().copied().map(DynSolValue::Address).collect())
            }
            Self::UintArray(items) => DynSolValue::Array(
                items.iter().map(|v| DynSolValue::Uint(*v, 256)).collect(),
            ),
        }
    }

    fn from_sol(ty: AbiType, value: DynSolValue) -> Result<Self, AbiError> {
        let unexpected = |value: &DynSolValue| {
            AbiError::MalformedResponse(format!("expected {}, got {value:?}", ty.canonical()))
        };

        match (ty, value) {
            (AbiType::Address, DynSolValue::Address(a)) => Ok(Self::Address(a)),
            (AbiType::Uint256, DynSolValue::Uint(v, _)) => Ok(Self::Uint(v)),
            (AbiType::Bool, DynSolValue::Bool(b)) => Ok(Self::Bool(b)),
            (AbiType::AddressArray, DynSolValue::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    DynSolValue::Address(a) => Ok(a),
                    other => Err(unexpected(&other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::AddressArray),
            (AbiType::Uint256Array, DynSolValue::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    DynSolValue::Uint(v, _) => Ok(v),
                    other => Err(unexpected(&other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::UintArray),
            (_, other) => Err(unexpected(&other)),
        }
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<Address>> for AbiValue {
    fn from(value: Vec<Address>) -> Self {
        Self::AddressArray(value)
    }
}

/// Minimal description of a contract function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub inputs: &'static [AbiType],
    pub outputs: &'static [AbiType],
}

impl FunctionSpec {
    /// Canonical signature, e.g. `approve(address,uint256)`.
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.inputs.iter().map(|t| t.canonical()).collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// First four bytes of keccak256 over the canonical signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Encodes a call: selector followed by the argument words.
    pub fn encode(&self, args: &[AbiValue]) -> Result<Bytes, AbiError> {
        encode(self, args)
    }

    /// Decodes this function's return data.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        decode(self.outputs, data)
    }
}

/// WETH `deposit()`; payable, wraps `msg.value`.
pub const DEPOSIT: FunctionSpec = FunctionSpec {
    name: "deposit",
    inputs: &[],
    outputs: &[],
};

/// ERC-20 `approve(spender, amount) -> bool`.
pub const APPROVE: FunctionSpec = FunctionSpec {
    name: "approve",
    inputs: &[AbiType::Address, AbiType::Uint256],
    outputs: &[AbiType::Bool],
};

/// ERC-20 `balanceOf(owner) -> uint256`.
pub const BALANCE_OF: FunctionSpec = FunctionSpec {
    name: "balanceOf",
    inputs: &[AbiType::Address],
    outputs: &[AbiType::Uint256],
};

/// Router `swapExactTokensForTokens(amountIn, amountOutMin, path, to, deadline)`.
pub const SWAP_EXACT_TOKENS_FOR_TOKENS: FunctionSpec = FunctionSpec {
    name: "swapExactTokensForTokens",
    inputs: &[
        AbiType::Uint256,
        AbiType::Uint256,
        AbiType::AddressArray,
        AbiType::Address,
        AbiType::Uint256,
    ],
    outputs: &[AbiType::Uint256Array],
};

/// Router `getAmountsOut(amountIn, path) -> uint256[]`.
pub const GET_AMOUNTS_OUT: FunctionSpec = FunctionSpec {
    name: "getAmountsOut",
    inputs: &[AbiType::Uint256, AbiType::AddressArray],
    outputs: &[AbiType::Uint256Array],
};

/// Encodes `args` as a call to `function`.
pub fn encode(function: &FunctionSpec, args: &[AbiValue]) -> Result<Bytes, AbiError> {
    if args.len() != function.inputs.len() {
        return Err(AbiError::ArgumentMismatch {
            function: function.name,
            reason: format!(
                "expected {} arguments, got {}",
                function.inputs.len(),
                args.len()
            ),
        });
    }
    for (i, (arg, ty)) in args.iter().zip(function.inputs).enumerate() {
        if arg.abi_type() != *ty {
            return Err(AbiError::ArgumentMismatch {
                function: function.name,
                reason: format!(
                    "argument {i}: expected {}, got {}",
                    ty.canonical(),
                    arg.abi_type().canonical()
                ),
            });
        }
    }

    let params = DynSolValue::Tuple(args.iter().map(AbiValue::to_sol).collect());
    let mut out = function.selector().to_vec();
    out.extend_from_slice(&params.abi_encode_params());
    Ok(Bytes::from(out))
}

/// Decodes return data against the declared output types.
///
/// Data shorter than the head section is rejected instead of being read as
/// zero values.
pub fn decode(outputs: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let head_len = outputs.len() * 32;
    if data.len() < head_len {
        return Err(AbiError::MalformedResponse(format!(
            "expected at least {head_len} bytes, got {}",
            data.len()
        )));
    }
    if outputs.is_empty() {
        return Ok(Vec::new());
    }

    let ty = DynSolType::Tuple(outputs.iter().map(|t| t.sol_type()).collect());
    let decoded = ty
        .abi_decode_params(data)
        .map_err(|e| AbiError::MalformedResponse(e.to_string()))?;

    let DynSolValue::Tuple(values) = decoded else {
        return Err(AbiError::MalformedResponse("expected a tuple".into()));
    };
    if values.len() != outputs.len() {
        return Err(AbiError::MalformedResponse(format!(
            "expected {} values, got {}",
            outputs.len(),
            values.len()
        )));
    }

    outputs
        .iter()
        .zip(values)
        .map(|(ty, value)| AbiValue::from_sol(*ty, value))
        .collect()
}
