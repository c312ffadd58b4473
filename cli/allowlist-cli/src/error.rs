use thiserror::Error;

/// Errors raised while loading an allowlist or building its commitment.
#[derive(Error, Debug)]
pub enum AllowlistError {
    #[error("line {line}: expected 'address,maxAllowance', got '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("line {line}: invalid address '{address}': {reason}")]
    InvalidAddress {
        line: usize,
        address: String,
        reason: String,
    },

    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("line {line}: invalid allowance '{value}': {source}")]
    InvalidAllowance {
        line: usize,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Allowlist contains no records")]
    EmptyAllowlist,

    #[error("Leaf 0x{0} is not part of the Merkle tree")]
    LeafNotFound(String),

    #[error("Address {0} is not in the allowlist")]
    AddressNotFound(String),

    #[error("Invalid hash '{0}': expected 32 bytes of hex")]
    InvalidHash(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons an address string is rejected.
#[derive(Error, Debug, PartialEq)]
pub enum AddressError {
    #[error("expected 40 hex chars, got {0}")]
    Length(usize),

    #[error("invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("zero address not allowed")]
    Zero,
}

pub type Result<T> = std::result::Result<T, AllowlistError>;
