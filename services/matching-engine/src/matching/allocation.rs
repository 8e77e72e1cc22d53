//! Fill allocation inside a timestamp bucket
//!
//! Orders that arrived at the same logical time at the same price share an
//! incoming fill in proportion to their remaining size. The arithmetic is
//! integer only, with u128 intermediates, so every platform allocates the
//! same units.

use crate::config::Allocation;

/// Tentative pro-rata fill for one passive order.
///
/// `ceil(remaining * min(to_share, bucket_total) / bucket_total)`. Rounding
/// up means the bucket never strands a unit to truncation; the caller clamps
/// the result to both orders' remaining.
///
/// # Panics
/// Panics if `bucket_total` is zero or smaller than `remaining`: the level's
/// per-timestamp bookkeeping is broken.
pub fn pro_rata_share(remaining: u64, bucket_total: u64, to_share: u64) -> u64 {
    assert!(
        bucket_total > 0 && remaining <= bucket_total,
        "bucket volume out of sync with resting orders"
    );

    let shared = u128::from(to_share.min(bucket_total));
    let total = u128::from(bucket_total);
    let numerator = u128::from(remaining) * shared;

    let mut share = numerator / total;
    if numerator % total != 0 {
        share += 1;
    }
    // shared <= total, so share <= remaining and fits back into u64
    share as u64
}

/// Size to trade against one passive order, before clamping
pub fn tentative_size(mode: Allocation, remaining: u64, bucket_total: u64, to_share: u64) -> u64 {
    match mode {
        Allocation::ProRata => pro_rata_share(remaining, bucket_total, to_share),
        Allocation::PriceTime => remaining,
    }
}
