//! Identifier types for exchange entities
//!
//! Order and trade ids are content-derived: a SHA-256 digest of the canonical
//! bincode encoding of the identifying fields plus a sequence discriminator
//! supplied by the book. Two replicas replaying the same submissions derive
//! the same ids, and identical submissions at the same timestamp still get
//! distinct ids because their sequence numbers differ.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 over the canonical bincode encoding of `value`.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> [u8; 32] {
    let bytes = bincode::serialize(value).expect("canonical encoding of plain data never fails");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Lowercase hex rendering of a digest
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for byte in bytes {
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}

/// Identifier of an admitted order
///
/// Assigned by the order book on admission. `OrderId::UNASSIGNED` marks an
/// order that has not been through a book yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId([u8; 32]);

impl OrderId {
    pub const UNASSIGNED: OrderId = OrderId([0u8; 32]);

    /// Derive the id from the order's canonical content
    pub fn from_content<T: Serialize + ?Sized>(content: &T) -> Self {
        Self(content_hash(content))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_assigned(&self) -> bool {
        *self != Self::UNASSIGNED
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// Identifier of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId([u8; 32]);

impl TradeId {
    pub fn from_content<T: Serialize + ?Sized>(content: &T) -> Self {
        Self(content_hash(content))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// Party (trader) identifier, usually a public key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    pub fn new(party: impl Into<String>) -> Self {
        Self(party.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Market identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(String);

impl MarketId {
    pub fn new(market: impl Into<String>) -> Self {
        Self(market.into())
    }

    /// Try to create a MarketId, returning None for an empty identifier
    pub fn try_new(market: impl Into<String>) -> Option<Self> {
        let s = market.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MarketId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_deterministic() {
        let a = OrderId::from_content(&("BTC/USDT", 42u64, 7u64));
        let b = OrderId::from_content(&("BTC/USDT", 42u64, 7u64));
        assert_eq!(a, b);
        assert!(a.is_assigned());
    }

    #[test]
    fn test_sequence_discriminates_identical_content() {
        let a = OrderId::from_content(&("BTC/USDT", 42u64, 1u64));
        let b = OrderId::from_content(&("BTC/USDT", 42u64, 2u64));
        assert_ne!(a, b);
    }

    #[test]
    fn test_order_id_display_is_hex() {
        let id = OrderId::from_bytes([0xab; 32]);
        let shown = id.to_string();
        assert_eq!(shown.len(), 64);
        assert!(shown.starts_with("abab"));
        assert!(!OrderId::UNASSIGNED.is_assigned());
    }

    #[test]
    fn test_order_id_serialization() {
        let id = OrderId::from_content(&"order");
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_market_id_try_new() {
        assert!(MarketId::try_new("BTC/USDT").is_some());
        assert!(MarketId::try_new("").is_none());
    }

    #[test]
    fn test_market_id_serialization() {
        let market = MarketId::new("ETH/USDC");
        let json = serde_json::to_string(&market).unwrap();
        assert_eq!(json, "\"ETH/USDC\"");
    }
}
