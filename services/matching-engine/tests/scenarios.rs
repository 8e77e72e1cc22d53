//! End-to-end matching scenarios

mod common;

use common::{book, init_tracing, ioc, limit, MARKET};
use matching_engine::{MatchingConfig, MatchingEngine};
use types::errors::OrderError;
use types::ids::{MarketId, PartyId};
use types::numeric::Price;
use types::order::{CancelReason, OrderStatus, Side, TimeInForce};

fn sizes_by_seller(trades: &[types::trade::Trade]) -> Vec<(String, u64)> {
    trades
        .iter()
        .map(|t| (t.seller.as_str().to_string(), t.size))
        .collect()
}

#[test]
fn test_same_timestamp_orders_share_pro_rata() {
    init_tracing();
    let mut book = book(MatchingConfig::default());
    let a = book.submit_order(limit("A", Side::SELL, 100, 10, 1)).unwrap();
    let b = book.submit_order(limit("B", Side::SELL, 100, 5, 1)).unwrap();

    let confirmation = book.submit_order(ioc("C", Side::BUY, 100, 12, 1)).unwrap();

    assert_eq!(
        sizes_by_seller(&confirmation.trades),
        vec![("A".to_string(), 8), ("B".to_string(), 4)]
    );
    assert!(confirmation.trades.iter().all(|t| t.price == Price::from_u64(100)));
    assert_eq!(book.order(&a.order_id()).unwrap().remaining, 2);
    assert_eq!(book.order(&b.order_id()).unwrap().remaining, 1);
    assert_eq!(confirmation.order.status, OrderStatus::Filled);
}

#[test]
fn test_thirty_seventy_split() {
    let mut book = book(MatchingConfig::default());
    book.submit_order(limit("A", Side::BUY, 100, 30, 1)).unwrap();
    book.submit_order(limit("B", Side::BUY, 100, 70, 1)).unwrap();

    let confirmation = book.submit_order(ioc("C", Side::SELL, 100, 50, 2)).unwrap();

    let sizes: Vec<u64> = confirmation.trades.iter().map(|t| t.size).collect();
    assert_eq!(sizes, vec![15, 35]);
    assert_eq!(book.bids().volume_at(Price::from_u64(100)), 50);
}

#[test]
fn test_buy_walks_two_levels() {
    let mut book = book(MatchingConfig::default());
    book.submit_order(limit("A", Side::SELL, 100, 5, 1)).unwrap();
    book.submit_order(limit("B", Side::SELL, 101, 10, 1)).unwrap();

    let confirmation = book.submit_order(ioc("C", Side::BUY, 101, 12, 2)).unwrap();

    let fills: Vec<(u64, u64)> = confirmation
        .trades
        .iter()
        .map(|t| (t.price.as_u64(), t.size))
        .collect();
    assert_eq!(fills, vec![(100, 5), (101, 7)]);
    assert_eq!(book.asks().volume_at(Price::from_u64(101)), 3);
    assert_eq!(book.asks().level_count(), 1);
    assert_eq!(book.market_data().last_traded_price, Price::from_u64(101));
}

#[test]
fn test_trade_price_is_passive_price() {
    let mut book = book(MatchingConfig::default());
    book.submit_order(limit("A", Side::BUY, 105, 5, 1)).unwrap();

    let confirmation = book.submit_order(ioc("B", Side::SELL, 90, 5, 2)).unwrap();

    assert_eq!(confirmation.trades[0].price, Price::from_u64(105));
    assert_eq!(confirmation.trades[0].aggressor, Side::SELL);
    assert_eq!(confirmation.trades[0].buyer, PartyId::new("A"));
    assert_eq!(confirmation.trades[0].seller, PartyId::new("B"));
}

#[test]
fn test_earlier_timestamp_exhausted_first() {
    let mut book = book(MatchingConfig::default());
    let early = book.submit_order(limit("A", Side::SELL, 100, 10, 1)).unwrap();
    let late = book.submit_order(limit("B", Side::SELL, 100, 10, 2)).unwrap();

    let confirmation = book.submit_order(ioc("C", Side::BUY, 100, 12, 3)).unwrap();

    assert_eq!(confirmation.trades[0].sell_order, early.order_id());
    assert_eq!(confirmation.trades[0].size, 10);
    assert_eq!(confirmation.trades[1].sell_order, late.order_id());
    assert_eq!(confirmation.trades[1].size, 2);
    assert!(book.order(&early.order_id()).is_none());
}

/// Two orders at ts0, one at ts1, one at ts2, all at 101
fn seed_pro_rata_book(config: MatchingConfig) -> matching_engine::OrderBook {
    let mut book = book(config);
    book.submit_order(limit("A", Side::SELL, 101, 100, 0)).unwrap();
    book.submit_order(limit("B", Side::SELL, 101, 100, 0)).unwrap();
    book.submit_order(limit("M", Side::SELL, 101, 100, 1)).unwrap();
    book.submit_order(limit("R", Side::SELL, 101, 100, 2)).unwrap();
    book
}

#[test]
fn test_pro_rata_across_buckets() {
    let mut book = seed_pro_rata_book(MatchingConfig::default());

    let first = book.submit_order(ioc("X", Side::BUY, 101, 100, 3)).unwrap();
    assert_eq!(
        sizes_by_seller(&first.trades),
        vec![("A".to_string(), 50), ("B".to_string(), 50)]
    );

    let second = book.submit_order(ioc("X", Side::BUY, 102, 150, 3)).unwrap();
    assert_eq!(
        sizes_by_seller(&second.trades),
        vec![("A".to_string(), 50), ("B".to_string(), 50), ("M".to_string(), 50)]
    );

    let third = book.submit_order(ioc("X", Side::BUY, 101, 70, 3)).unwrap();
    assert_eq!(
        sizes_by_seller(&third.trades),
        vec![("M".to_string(), 50), ("R".to_string(), 20)]
    );
    assert_eq!(book.asks().total_volume(), 80);
    assert_eq!(book.order_count(), 1);
}

#[test]
fn test_price_time_is_fifo() {
    let mut book = seed_pro_rata_book(MatchingConfig::price_time());

    let first = book.submit_order(ioc("X", Side::BUY, 101, 100, 3)).unwrap();
    assert_eq!(sizes_by_seller(&first.trades), vec![("A".to_string(), 100)]);

    let second = book.submit_order(ioc("X", Side::BUY, 102, 150, 3)).unwrap();
    assert_eq!(
        sizes_by_seller(&second.trades),
        vec![("B".to_string(), 100), ("M".to_string(), 50)]
    );

    let third = book.submit_order(ioc("X", Side::BUY, 101, 70, 3)).unwrap();
    assert_eq!(
        sizes_by_seller(&third.trades),
        vec![("M".to_string(), 50), ("R".to_string(), 20)]
    );
}

#[test]
fn test_passive_orders_affected_track_fills() {
    let mut book = book(MatchingConfig::default());
    book.submit_order(limit("A", Side::SELL, 100, 10, 1)).unwrap();
    book.submit_order(limit("B", Side::SELL, 100, 5, 1)).unwrap();

    let confirmation = book.submit_order(limit("C", Side::BUY, 100, 20, 2)).unwrap();

    assert_eq!(confirmation.passive_orders_affected.len(), 2);
    assert!(confirmation
        .passive_orders_affected
        .iter()
        .all(|o| o.status == OrderStatus::Filled && o.remaining == 0));
    assert_eq!(confirmation.order.remaining, 5);
    assert_eq!(confirmation.order.status, OrderStatus::Active);
    assert_eq!(book.market_data().best_bid, Price::from_u64(100));
    assert_eq!(book.market_data().best_offer, Price::ZERO);
}

#[test]
fn test_out_of_sequence_rejected() {
    let mut book = book(MatchingConfig::default());
    book.submit_order(limit("A", Side::SELL, 100, 10, 5)).unwrap();
    let before = book.state_hash();

    let err = book.submit_order(limit("B", Side::BUY, 100, 10, 4)).unwrap_err();

    assert_eq!(err, OrderError::OutOfSequence { latest: 5, received: 4 });
    assert_eq!(book.state_hash(), before);
}

#[test]
fn test_invalid_remaining_rejected() {
    let mut book = book(MatchingConfig::default());
    let mut order = limit("A", Side::SELL, 100, 10, 1);
    order.remaining = 11;

    let err = book.submit_order(order).unwrap_err();

    assert_eq!(err, OrderError::InvalidRemainingSize { remaining: 11, size: 10 });
    assert!(book.asks().is_empty());
}

#[test]
fn test_engine_rejects_unknown_market() {
    let mut engine = MatchingEngine::new(MatchingConfig::default());
    engine.create_market(MarketId::new(MARKET));

    let mut order = limit("A", Side::BUY, 100, 1, 1);
    order.market = MarketId::new("DOGE/USDT");

    assert!(matches!(
        engine.submit_order(order),
        Err(OrderError::InvalidMarketId { .. })
    ));
    assert_eq!(engine.markets().count(), 1);
}

#[test]
fn test_engine_delete_and_expire() {
    let mut engine = MatchingEngine::default();
    engine.create_market(MarketId::new(MARKET));

    let gtt = engine
        .submit_order(common::order(
            "A",
            Side::BUY,
            100,
            5,
            types::order::TimeInForce::GTT(50),
            1,
        ))
        .unwrap();
    let gtc = engine.submit_order(limit("B", Side::BUY, 99, 5, 2)).unwrap();

    let expired = engine.remove_expired_orders(50);
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, gtt.order_id());
    assert!(engine.delete_order(&gtt.order_id()).is_none());

    let deleted = engine.delete_order(&gtc.order_id()).unwrap();
    assert_eq!(deleted.remaining, 5);
    let data = engine.get_market_data(&MarketId::new(MARKET)).unwrap();
    assert_eq!(data.best_bid, Price::ZERO);
}

#[test]
fn test_fok_stops_before_own_order() {
    init_tracing();
    let mut book = book(MatchingConfig::default());
    book.submit_order(limit("B", Side::SELL, 100, 1, 1)).unwrap();
    book.submit_order(limit("A", Side::SELL, 100, 1, 2)).unwrap();
    let before = book.state_hash();

    let confirmation = book
        .submit_order(common::order("A", Side::BUY, 100, 2, TimeInForce::FOK, 3))
        .unwrap();

    assert!(confirmation.trades.is_empty());
    assert_eq!(confirmation.order.remaining, 2);
    assert_eq!(confirmation.order.status, OrderStatus::Canceled(CancelReason::SelfTrade));
    assert_eq!(book.state_hash(), before);
}

#[test]
fn test_other_party_trades_through_after_self_trade_stop() {
    let mut book = book(MatchingConfig::default());
    book.submit_order(limit("B", Side::SELL, 100, 1, 1)).unwrap();
    book.submit_order(limit("A", Side::SELL, 100, 1, 2)).unwrap();

    let stopped = book.submit_order(limit("A", Side::BUY, 100, 2, 3)).unwrap();
    assert_eq!(stopped.traded_volume(), 1);
    assert_eq!(stopped.order.status, OrderStatus::Canceled(CancelReason::SelfTrade));

    let confirmation = book.submit_order(ioc("C", Side::BUY, 100, 2, 4)).unwrap();
    assert_eq!(sizes_by_seller(&confirmation.trades), vec![("A".to_string(), 1)]);
    assert!(book.asks().is_empty());
}
