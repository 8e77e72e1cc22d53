//! Trade execution
//!
//! Owns the per-book trade sequence, which feeds the content hash of every
//! trade id.

use thiserror::Error;
use types::order::Order;
use types::trade::Trade;

/// Trade builder with sequence generation
#[derive(Debug, Clone)]
pub struct TradeExecutor {
    sequence_counter: u64,
}

impl TradeExecutor {
    /// Create a new executor with starting sequence number
    pub fn new(starting_sequence: u64) -> Self {
        Self {
            sequence_counter: starting_sequence,
        }
    }

    /// Get next sequence number (monotonically increasing)
    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }

    /// Sequence the next trade will carry
    pub fn peek_sequence(&self) -> u64 {
        self.sequence_counter
    }

    /// Execute `size` units between the aggressor and a passive order,
    /// reducing both orders' remaining.
    ///
    /// Orders of the same party never trade with each other; neither order
    /// is touched and no sequence is consumed.
    pub fn execute(&mut self, aggressor: &mut Order, passive: &mut Order, size: u64) -> Result<Trade, MatchError> {
        if aggressor.party == passive.party {
            return Err(MatchError::SelfTrade);
        }

        let sequence = self.next_sequence();
        Ok(Trade::new(sequence, aggressor, passive, size))
    }
}

/// Match execution errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    /// Aggressor and passive order belong to the same party
    #[error("self-trade prevented")]
    SelfTrade,
}

impl Default for TradeExecutor {
    fn default() -> Self {
        Self::new(1)
    }
}
