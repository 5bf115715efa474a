//! Receipt validation.
//!
//! A receipt is either fully valid or rejected outright; there is no
//! partially-valid state. Checks run in field order and stop at the first
//! failure. The variant carried in the error names the failed check for
//! server-side logging; clients only ever see the generic rejection text.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::model::Receipt;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

static RETAILER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\s\-&]+$").expect("retailer pattern"));
static DESCRIPTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\s\-]+$").expect("description pattern"));
static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d{2}$").expect("amount pattern"));
static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date shape"));
static TIME_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("time shape"));

#[derive(Debug, Error)]
pub enum ValidationError {
    /// Retailer name contains characters outside the allowed set
    #[error("retailer '{value}' contains characters outside [\\w\\s\\-&]")]
    InvalidRetailer { value: String },

    /// Purchase date is not a real YYYY-MM-DD calendar date
    #[error("purchase date '{value}' is not a valid YYYY-MM-DD date")]
    InvalidPurchaseDate { value: String },

    /// Purchase time is not a real HH:MM wall-clock time
    #[error("purchase time '{value}' is not a valid 24-hour HH:MM time")]
    InvalidPurchaseTime { value: String },

    /// Receipt carries no items
    #[error("receipt must contain at least one item")]
    NoItems,

    /// An item price is not a two-decimal amount
    #[error("item {index} price '{value}' is not a valid amount")]
    InvalidItemPrice { index: usize, value: String },

    /// An item description contains characters outside the allowed set
    #[error("item {index} description '{value}' contains characters outside [\\w\\s\\-]")]
    InvalidItemDescription { index: usize, value: String },

    /// Receipt total is not a two-decimal amount
    #[error("total '{value}' is not a valid amount")]
    InvalidTotal { value: String },
}

/// Checks every field of a submitted receipt. The order is retailer, date,
/// time, item count, per-item price and description, total; the first
/// failing check wins.
pub fn validate_receipt(receipt: &Receipt) -> ValidationResult<()> {
    if !RETAILER_PATTERN.is_match(&receipt.retailer) {
        return Err(ValidationError::InvalidRetailer {
            value: receipt.retailer.clone(),
        });
    }
    if !is_valid_date(&receipt.purchase_date) {
        return Err(ValidationError::InvalidPurchaseDate {
            value: receipt.purchase_date.clone(),
        });
    }
    if !is_valid_time(&receipt.purchase_time) {
        return Err(ValidationError::InvalidPurchaseTime {
            value: receipt.purchase_time.clone(),
        });
    }
    if receipt.items.is_empty() {
        return Err(ValidationError::NoItems);
    }
    for (index, item) in receipt.items.iter().enumerate() {
        if !AMOUNT_PATTERN.is_match(&item.price) {
            return Err(ValidationError::InvalidItemPrice {
                index,
                value: item.price.clone(),
            });
        }
        if !DESCRIPTION_PATTERN.is_match(&item.short_description) {
            return Err(ValidationError::InvalidItemDescription {
                index,
                value: item.short_description.clone(),
            });
        }
    }
    if !AMOUNT_PATTERN.is_match(&receipt.total) {
        return Err(ValidationError::InvalidTotal {
            value: receipt.total.clone(),
        });
    }
    Ok(())
}

/// The shape regex pins the widths; chrono then rejects impossible
/// dates the shape alone would let through (month 13, day 00).
fn is_valid_date(value: &str) -> bool {
    DATE_SHAPE.is_match(value) && chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn is_valid_time(value: &str) -> bool {
    TIME_SHAPE.is_match(value) && chrono::NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}
