//! Error types for the matching core
//!
//! Admission errors are returned to the caller and never leave a book
//! partially mutated. Broken internal invariants are not represented here:
//! they panic.

use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Market not found: {market}")]
    MarketNotFound { market: String },

    #[error("Market service stopped: {market}")]
    ServiceStopped { market: String },
}

/// Order admission errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Invalid market id: book trades {expected}, order targets {received}")]
    InvalidMarketId { expected: String, received: String },

    #[error("Invalid order id: {order_id}")]
    InvalidOrderId { order_id: String },

    #[error("Order out of sequence: latest timestamp {latest}, received {received}")]
    OutOfSequence { latest: u64, received: u64 },

    #[error("Invalid remaining size: remaining {remaining}, size {size}")]
    InvalidRemainingSize { remaining: u64, size: u64 },

    #[error("Invalid price: limit orders need a non-zero price")]
    InvalidPrice,

    #[error("Invalid size: order size must be positive")]
    InvalidSize,

    #[error("Order amend failed: {reason}")]
    AmendFailure { reason: String },

    #[error("Invalid expiration: GTT expires at {expires_at}, order timestamp {timestamp}")]
    InvalidExpiration { expires_at: u64, timestamp: u64 },

    #[error("Volume overflow: side holds {volume}, order adds {remaining}")]
    VolumeOverflow { volume: u64, remaining: u64 },
}
