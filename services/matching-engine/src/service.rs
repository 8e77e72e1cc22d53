//! Sequential per-market service
//!
//! One tokio task owns one `OrderBook` and applies commands from a bounded
//! channel strictly in the order they were received. Callers get replies
//! over oneshot channels. Book events are published on a broadcast channel
//! after the command has been applied, so a slow subscriber lags (and
//! eventually drops events) without ever holding up matching.

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use types::errors::{EngineError, OrderError};
use types::ids::{MarketId, OrderId};
use types::order::{Order, OrderAmendment};
use types::trade::{MarketData, MarketDepth, OrderConfirmation};

use crate::book::OrderBook;
use crate::config::ServiceConfig;
use crate::events::BookEvent;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Submit {
        order: Order,
        reply: Reply<Result<OrderConfirmation, OrderError>>,
    },
    Cancel {
        order_id: OrderId,
        reply: Reply<Result<Order, OrderError>>,
    },
    Amend {
        amendment: OrderAmendment,
        reply: Reply<Result<Order, OrderError>>,
    },
    Expire {
        now: u64,
        reply: Reply<Vec<Order>>,
    },
    MarketData {
        reply: Reply<MarketData>,
    },
    Depth {
        levels: usize,
        reply: Reply<MarketDepth>,
    },
    StateHash {
        reply: Reply<String>,
    },
}

/// Task owning a single market's book
pub struct MarketService {
    book: OrderBook,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<BookEvent>,
}

impl MarketService {
    /// Start the service on the current tokio runtime
    ///
    /// The task ends once every `MarketHandle` has been dropped and yields
    /// the final book.
    pub fn spawn(book: OrderBook, config: &ServiceConfig) -> (MarketHandle, JoinHandle<OrderBook>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (event_tx, _) = broadcast::channel(config.event_buffer);

        let handle = MarketHandle {
            market: book.market().clone(),
            commands: command_tx,
            events: event_tx.clone(),
        };
        let service = MarketService {
            book,
            commands: command_rx,
            events: event_tx,
        };

        info!(market = %handle.market, "Market service started");
        (handle, tokio::spawn(service.run()))
    }

    async fn run(mut self) -> OrderBook {
        while let Some(command) = self.commands.recv().await {
            self.apply(command);
        }
        info!(market = %self.book.market(), "Market service stopped");
        self.book
    }

    fn apply(&mut self, command: Command) {
        // A caller that gave up waiting has dropped its receiver; the
        // command has been applied regardless.
        match command {
            Command::Submit { order, reply } => {
                let result = self.book.submit_order(order);
                if let Ok(confirmation) = &result {
                    self.publish(BookEvent::from_confirmation(confirmation));
                }
                let _ = reply.send(result);
            }
            Command::Cancel { order_id, reply } => {
                let result = self.book.cancel_order(&order_id);
                if let Ok(order) = &result {
                    self.publish(vec![BookEvent::OrderCanceled(order.clone())]);
                }
                let _ = reply.send(result);
            }
            Command::Amend { amendment, reply } => {
                let result = self.book.amend_order(&amendment);
                if let Ok(order) = &result {
                    self.publish(vec![BookEvent::OrderAmended(order.clone())]);
                }
                let _ = reply.send(result);
            }
            Command::Expire { now, reply } => {
                let expired = self.book.remove_expired_orders(now);
                self.publish(expired.iter().cloned().map(BookEvent::OrderExpired).collect());
                let _ = reply.send(expired);
            }
            Command::MarketData { reply } => {
                let _ = reply.send(self.book.market_data());
            }
            Command::Depth { levels, reply } => {
                let _ = reply.send(self.book.depth(levels));
            }
            Command::StateHash { reply } => {
                let _ = reply.send(self.book.state_hash());
            }
        }
    }

    fn publish(&self, events: Vec<BookEvent>) {
        if self.events.receiver_count() == 0 {
            return;
        }
        for event in events {
            if self.events.send(event).is_err() {
                debug!(market = %self.book.market(), "No subscribers left");
                break;
            }
        }
    }
}

/// Client side of a running `MarketService`
#[derive(Debug, Clone)]
pub struct MarketHandle {
    market: MarketId,
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<BookEvent>,
}

impl MarketHandle {
    pub fn market(&self) -> &MarketId {
        &self.market
    }

    pub async fn submit(&self, order: Order) -> Result<OrderConfirmation, EngineError> {
        let result = self.request(|reply| Command::Submit { order, reply }).await?;
        Ok(result?)
    }

    pub async fn cancel(&self, order_id: OrderId) -> Result<Order, EngineError> {
        let result = self.request(|reply| Command::Cancel { order_id, reply }).await?;
        Ok(result?)
    }

    pub async fn amend(&self, amendment: OrderAmendment) -> Result<Order, EngineError> {
        let result = self.request(|reply| Command::Amend { amendment, reply }).await?;
        Ok(result?)
    }

    pub async fn remove_expired(&self, now: u64) -> Result<Vec<Order>, EngineError> {
        self.request(|reply| Command::Expire { now, reply }).await
    }

    pub async fn market_data(&self) -> Result<MarketData, EngineError> {
        self.request(|reply| Command::MarketData { reply }).await
    }

    pub async fn depth(&self, levels: usize) -> Result<MarketDepth, EngineError> {
        self.request(|reply| Command::Depth { levels, reply }).await
    }

    pub async fn state_hash(&self) -> Result<String, EngineError> {
        self.request(|reply| Command::StateHash { reply }).await
    }

    /// Receive events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<BookEvent> {
        self.events.subscribe()
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| self.stopped())?;
        response.await.map_err(|_| self.stopped())
    }

    fn stopped(&self) -> EngineError {
        EngineError::ServiceStopped {
            market: self.market.to_string(),
        }
    }
}
