//! Point scoring rules.
//!
//! Five independent rules, summed: alphanumeric retailer characters,
//! total-amount bonuses, item pair and description-length bonuses, the
//! odd-day bonus, and the afternoon-purchase bonus. The scorer is pure and
//! deterministic; it assumes the receipt already passed validation, and any
//! sub-rule that still fails to parse its field contributes zero rather
//! than failing the whole computation. Contributions accumulate with
//! saturating arithmetic, so amounts too large for `u64` clamp the score
//! at `u64::MAX` instead of overflowing.

use crate::model::{Item, Receipt};

/// Per-rule contributions to a receipt's score. Only `total` is surfaced
/// through the API; the breakdown feeds debug logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointsBreakdown {
    /// One point per Unicode letter or digit in the retailer name.
    pub retailer_alphanumeric: u64,
    /// 50 points when the total is a round dollar amount.
    pub total_round_dollar: u64,
    /// 25 points when the total is a multiple of 0.25.
    pub total_quarter_multiple: u64,
    /// 5 points for every two items.
    pub item_pairs: u64,
    /// Price-derived bonus for descriptions whose trimmed length is a
    /// multiple of three.
    pub item_descriptions: u64,
    /// 6 points when the purchase day is odd.
    pub odd_purchase_day: u64,
    /// 10 points for purchases between 14:00 and 15:59.
    pub afternoon_purchase: u64,
    pub total: u64,
}

/// Computes the full per-rule breakdown for a receipt.
pub fn points_breakdown(receipt: &Receipt) -> PointsBreakdown {
    let cents = parse_cents(&receipt.total);

    let retailer_alphanumeric = alphanumeric_points(&receipt.retailer);
    let total_round_dollar = if cents.is_some_and(|c| c % 100 == 0) {
        50
    } else {
        0
    };
    let total_quarter_multiple = if cents.is_some_and(|c| c % 25 == 0) {
        25
    } else {
        0
    };
    let item_pairs = (receipt.items.len() as u64 / 2) * 5;
    // The amount pattern puts no bound on digit count, so a valid price
    // can saturate the per-item cast; the sums must saturate as well.
    let item_descriptions = receipt
        .items
        .iter()
        .map(description_bonus)
        .fold(0u64, u64::saturating_add);
    let odd_purchase_day = odd_day_points(&receipt.purchase_date);
    let afternoon_purchase = afternoon_points(&receipt.purchase_time);

    let total = [
        retailer_alphanumeric,
        total_round_dollar,
        total_quarter_multiple,
        item_pairs,
        item_descriptions,
        odd_purchase_day,
        afternoon_purchase,
    ]
    .into_iter()
    .fold(0u64, u64::saturating_add);

    PointsBreakdown {
        retailer_alphanumeric,
        total_round_dollar,
        total_quarter_multiple,
        item_pairs,
        item_descriptions,
        odd_purchase_day,
        afternoon_purchase,
        total,
    }
}

/// The point total for a receipt, the sum of every rule's contribution.
pub fn score_receipt(receipt: &Receipt) -> u64 {
    points_breakdown(receipt).total
}

fn alphanumeric_points(retailer: &str) -> u64 {
    retailer.chars().filter(|c| c.is_alphanumeric()).count() as u64
}

/// Whole cents via round(total * 100), so "9.00" is 900 exactly despite
/// the binary representation of 9.00 * 100.
fn parse_cents(total: &str) -> Option<i64> {
    total
        .parse::<f64>()
        .ok()
        .map(|value| (value * 100.0).round() as i64)
}

fn description_bonus(item: &Item) -> u64 {
    // Trimmed length 0 is a multiple of three and keeps the bonus.
    let trimmed_len = item.short_description.trim().chars().count();
    if trimmed_len % 3 != 0 {
        return 0;
    }
    match item.price.parse::<f64>() {
        // The float-to-int cast saturates, clamping oversized bonuses
        // at u64::MAX.
        Ok(price) => (price * 0.2).ceil() as u64,
        Err(_) => 0,
    }
}

/// The day is read from the trailing two characters of the date, not from
/// a calendar parse. Anything unparseable contributes zero.
fn odd_day_points(date: &str) -> u64 {
    let day = date
        .get(date.len().saturating_sub(2)..)
        .and_then(|tail| tail.parse::<u32>().ok());
    match day {
        Some(day) if day % 2 == 1 => 6,
        _ => 0,
    }
}

/// The hour is read from the leading two characters of the time. The bonus
/// window is hour 14 and hour 15 inclusive.
fn afternoon_points(time: &str) -> u64 {
    match time.get(..2).and_then(|head| head.parse::<u32>().ok()) {
        Some(hour) if (14..16).contains(&hour) => 10,
        _ => 0,
    }
}
