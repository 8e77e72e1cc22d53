//! Crossing detection logic
//!
//! Determines when a bid and ask can match based on price compatibility

use types::numeric::Price;
use types::order::Side;

/// Check if a bid and ask can match at given prices
///
/// For a buy order to match with a sell order the buy price must be
/// greater than or equal to the sell price.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    Side::BUY.crosses(bid_price, ask_price)
}

/// Check if an incoming order can match against resting liquidity at
/// `resting_price`
pub fn incoming_can_match(incoming_side: Side, incoming_price: Price, resting_price: Price) -> bool {
    incoming_side.crosses(incoming_price, resting_price)
}

/// Whether a book with these top-of-book prices is crossed (zero = empty side)
pub fn is_crossed(best_bid: Price, best_ask: Price) -> bool {
    !best_bid.is_zero() && !best_ask.is_zero() && can_match(best_bid, best_ask)
}
