//! Event structures for downstream publishing
//!
//! Events are derived from results the book has already computed. They are
//! handed to subscribers after the command completes and never feed back
//! into matching.

use serde::{Deserialize, Serialize};
use types::order::Order;
use types::trade::{OrderConfirmation, Trade};

/// Book event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "UPPERCASE")]
pub enum BookEvent {
    OrderAccepted(Order),
    TradeExecuted(Trade),
    OrderCanceled(Order),
    OrderExpired(Order),
    OrderAmended(Order),
}

impl BookEvent {
    /// Events for a submission: the order, then its trades in execution
    /// order
    pub fn from_confirmation(confirmation: &OrderConfirmation) -> Vec<BookEvent> {
        let mut events = Vec::with_capacity(1 + confirmation.trades.len());
        events.push(BookEvent::OrderAccepted(confirmation.order.clone()));
        events.extend(confirmation.trades.iter().cloned().map(BookEvent::TradeExecuted));
        events
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            BookEvent::OrderAccepted(_) => "ORDERACCEPTED",
            BookEvent::TradeExecuted(_) => "TRADEEXECUTED",
            BookEvent::OrderCanceled(_) => "ORDERCANCELED",
            BookEvent::OrderExpired(_) => "ORDEREXPIRED",
            BookEvent::OrderAmended(_) => "ORDERAMENDED",
        }
    }
}
