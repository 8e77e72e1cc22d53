//! Admission checks run before an order touches a book
//!
//! Every check here is read-only. A rejected order leaves the book exactly
//! as it was.

use types::errors::OrderError;
use types::ids::MarketId;
use types::order::{Order, OrderAmendment, TimeInForce};

/// Validate a new submission against the book it targets
pub fn validate_order(order: &Order, market: &MarketId, latest_timestamp: u64) -> Result<(), OrderError> {
    if order.market != *market {
        return Err(OrderError::InvalidMarketId {
            expected: market.to_string(),
            received: order.market.to_string(),
        });
    }

    if order.price.is_zero() {
        return Err(OrderError::InvalidPrice);
    }

    if order.size == 0 {
        return Err(OrderError::InvalidSize);
    }

    if order.remaining == 0 || order.remaining > order.size {
        return Err(OrderError::InvalidRemainingSize {
            remaining: order.remaining,
            size: order.size,
        });
    }

    if let TimeInForce::GTT(expires_at) = order.time_in_force {
        if expires_at <= order.timestamp {
            return Err(OrderError::InvalidExpiration {
                expires_at,
                timestamp: order.timestamp,
            });
        }
    }

    check_sequence(order.timestamp, latest_timestamp)
}

/// Reject an order whose remaining would overflow its side's resting volume
pub fn check_capacity(order: &Order, side_volume: u64) -> Result<(), OrderError> {
    if side_volume.checked_add(order.remaining).is_none() {
        return Err(OrderError::VolumeOverflow {
            volume: side_volume,
            remaining: order.remaining,
        });
    }
    Ok(())
}

/// Validate an amendment against the resting order it targets
pub fn validate_amendment(amendment: &OrderAmendment, resting: &Order, latest_timestamp: u64) -> Result<(), OrderError> {
    if amendment.party != resting.party {
        return Err(OrderError::AmendFailure {
            reason: format!("party {} does not own order {}", amendment.party, resting.id),
        });
    }

    check_sequence(amendment.timestamp, latest_timestamp)?;

    if amendment.remaining > resting.remaining {
        return Err(OrderError::AmendFailure {
            reason: format!(
                "remaining can only be reduced in place ({} -> {})",
                resting.remaining, amendment.remaining
            ),
        });
    }

    if amendment.remaining == 0 {
        return Err(OrderError::InvalidRemainingSize {
            remaining: amendment.remaining,
            size: resting.size,
        });
    }

    Ok(())
}

fn check_sequence(timestamp: u64, latest_timestamp: u64) -> Result<(), OrderError> {
    if timestamp < latest_timestamp {
        return Err(OrderError::OutOfSequence {
            latest: latest_timestamp,
            received: timestamp,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::PartyId;
    use types::numeric::Price;
    use types::order::{Side, TimeInForce};

    fn market() -> MarketId {
        MarketId::new("BTC/USDT")
    }

    fn order(price: u64, size: u64, timestamp: u64) -> Order {
        Order::new(
            market(),
            PartyId::new("A"),
            Side::BUY,
            Price::from_u64(price),
            size,
            TimeInForce::GTC,
            timestamp,
        )
    }

    #[test]
    fn test_valid_order_passes() {
        assert!(validate_order(&order(100, 10, 5), &market(), 5).is_ok());
    }

    #[test]
    fn test_market_mismatch() {
        let err = validate_order(&order(100, 10, 1), &MarketId::new("ETH/USDT"), 0).unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidMarketId {
                expected: "ETH/USDT".to_string(),
                received: "BTC/USDT".to_string(),
            }
        );
    }

    #[test]
    fn test_zero_price_and_size() {
        assert_eq!(validate_order(&order(0, 10, 1), &market(), 0), Err(OrderError::InvalidPrice));
        assert_eq!(validate_order(&order(100, 0, 1), &market(), 0), Err(OrderError::InvalidSize));
    }

    #[test]
    fn test_remaining_above_size() {
        let mut o = order(100, 10, 1);
        o.remaining = 11;
        assert_eq!(
            validate_order(&o, &market(), 0),
            Err(OrderError::InvalidRemainingSize { remaining: 11, size: 10 })
        );
    }

    #[test]
    fn test_out_of_sequence() {
        assert_eq!(
            validate_order(&order(100, 10, 3), &market(), 4),
            Err(OrderError::OutOfSequence { latest: 4, received: 3 })
        );
    }

    #[test]
    fn test_gtt_must_expire_after_arrival() {
        let mut o = order(100, 10, 5);
        o.time_in_force = TimeInForce::GTT(5);
        assert_eq!(
            validate_order(&o, &market(), 0),
            Err(OrderError::InvalidExpiration { expires_at: 5, timestamp: 5 })
        );

        o.time_in_force = TimeInForce::GTT(6);
        assert!(validate_order(&o, &market(), 0).is_ok());
    }

    #[test]
    fn test_capacity() {
        let o = order(100, 2, 1);
        assert!(check_capacity(&o, u64::MAX - 2).is_ok());
        assert_eq!(
            check_capacity(&o, u64::MAX - 1),
            Err(OrderError::VolumeOverflow { volume: u64::MAX - 1, remaining: 2 })
        );
    }

    #[test]
    fn test_amendment_rules() {
        let resting = order(100, 10, 1);
        let amend = |party: &str, remaining: u64, timestamp: u64| OrderAmendment {
            order_id: resting.id,
            party: PartyId::new(party),
            remaining,
            timestamp,
        };

        assert!(validate_amendment(&amend("A", 4, 2), &resting, 1).is_ok());
        assert!(matches!(
            validate_amendment(&amend("B", 4, 2), &resting, 1),
            Err(OrderError::AmendFailure { .. })
        ));
        assert!(matches!(
            validate_amendment(&amend("A", 11, 2), &resting, 1),
            Err(OrderError::AmendFailure { .. })
        ));
        assert_eq!(
            validate_amendment(&amend("A", 4, 0), &resting, 1),
            Err(OrderError::OutOfSequence { latest: 1, received: 0 })
        );
        assert!(matches!(
            validate_amendment(&amend("A", 0, 2), &resting, 1),
            Err(OrderError::InvalidRemainingSize { .. })
        ));
    }
}
