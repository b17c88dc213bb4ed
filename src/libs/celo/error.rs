use alloy::transports::{RpcError, TransportError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid contract address: {0}")]
    InvalidAddress(String),

    #[error("invalid rpc url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("endpoint reports chain {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("method `{0}` is not declared in the contract ABI")]
    UnknownMethod(String),

    #[error("method `{method}` takes {expected:?} arguments, got {got}")]
    ArgumentCount {
        method: String,
        expected: Vec<usize>,
        got: usize,
    },

    #[error("abi error: {0}")]
    Abi(String),

    #[error("amount error: {0}")]
    Amount(String),

    #[error("gas estimate {0} does not fit in 64 bits")]
    GasOverflow(alloy::primitives::U256),

    /// JSON-RPC error response, code and message as sent by the node.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("signer error: {0}")]
    Signer(String),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => Self::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<alloy::dyn_abi::Error> for Error {
    fn from(err: alloy::dyn_abi::Error) -> Self {
        Self::Abi(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Abi(format!("bad abi json: {err}"))
    }
}

impl From<alloy::contract::Error> for Error {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(e) => e.into(),
            other => Self::Abi(other.to_string()),
        }
    }
}
