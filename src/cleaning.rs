//! Typed cleaning of raw scraped fields.
//!
//! Every sentinel/absence decision lives in [`is_sentinel`]; the rest of the
//! crate only ever sees `Option`s. Cleaning is idempotent: a cleaned record
//! converted back to its raw form cleans to itself.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CleanError;
use crate::models::{ProductRecord, RawProduct, RawReview, RawValue, ReviewRecord, SENTINELS};
use crate::parsers::price::strip_currency_symbols;

pub fn is_sentinel(value: &str) -> bool {
    let value = value.trim();
    SENTINELS.iter().any(|s| value.eq_ignore_ascii_case(s))
}

fn text_field(value: &Option<String>) -> Option<String> {
    match value {
        Some(v) if !is_sentinel(v) => Some(v.clone()),
        _ => None,
    }
}

/// Text that still carries a number, or `None` when it denotes absence.
fn numeric_text(value: &str) -> Option<String> {
    if is_sentinel(value) {
        return None;
    }
    let trimmed = value.replace('\u{a0}', " ").trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// `"1.299,95"` -> `"1299.95"`, `"4,5"` -> `"4.5"`, `"12.95"` unchanged.
fn decimal_point(text: &str) -> String {
    if text.contains(',') {
        text.replace('.', "").replace(',', ".")
    } else {
        text.to_string()
    }
}

/// Plain decimal notation only; `f64::from_str` would also take `NaN` and `inf`.
static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("Invalid decimal regex"));

fn parse_decimal(text: &str) -> Option<f64> {
    if DECIMAL.is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

fn float_field(field: &'static str, value: &Option<RawValue>) -> Result<Option<f64>, CleanError> {
    match value {
        None => Ok(None),
        Some(RawValue::Int(v)) => Ok(Some(*v as f64)),
        Some(RawValue::Float(v)) => Ok(Some(*v)),
        Some(RawValue::Text(text)) => match numeric_text(text) {
            None => Ok(None),
            Some(text) => parse_decimal(&decimal_point(&text))
                .map(Some)
                .ok_or(CleanError::NotNumeric { field, value: text }),
        },
    }
}

fn price_field(field: &'static str, value: &Option<RawValue>) -> Result<Option<f64>, CleanError> {
    match value {
        Some(RawValue::Text(text)) => {
            let stripped = strip_currency_symbols(text);
            float_field(field, &Some(RawValue::Text(stripped)))
        }
        other => float_field(field, other),
    }
}

/// `None` for fractions and for whole numbers outside the `i64` range.
fn whole_number(v: f64) -> Option<i64> {
    (v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

fn int_field(field: &'static str, value: &Option<RawValue>) -> Result<Option<i64>, CleanError> {
    let not_integer = |value: String| CleanError::NotInteger { field, value };
    match value {
        None => Ok(None),
        Some(RawValue::Int(v)) => Ok(Some(*v)),
        Some(RawValue::Float(v)) => whole_number(*v)
            .map(Some)
            .ok_or_else(|| not_integer(v.to_string())),
        Some(RawValue::Text(text)) => match numeric_text(text) {
            None => Ok(None),
            Some(text) => text.parse::<i64>().map(Some).or_else(|_| {
                parse_decimal(&text)
                    .and_then(whole_number)
                    .map(Some)
                    .ok_or_else(|| not_integer(text.clone()))
            }),
        },
    }
}

pub fn clean_product(raw: &RawProduct) -> Result<ProductRecord, CleanError> {
    Ok(ProductRecord {
        product_url: text_field(&raw.product_url),
        article_number: text_field(&raw.article_number),
        name: text_field(&raw.name),
        price: price_field("Preis", &raw.price)?,
        promo_price: price_field("Promo_Preis", &raw.promo_price)?,
        on_promo: raw.on_promo,
        currency: text_field(&raw.currency),
        brand: text_field(&raw.brand),
        description: text_field(&raw.description),
        ingredients: text_field(&raw.ingredients),
        rating: float_field("GesamtRating", &raw.rating)?,
        review_count: int_field("Gesamtanzahl_Reviews", &raw.review_count)?,
        product_id: raw.product_id.unwrap_or_default(),
    })
}

pub fn clean_review(raw: &RawReview) -> Result<ReviewRecord, CleanError> {
    Ok(ReviewRecord {
        reviewer: text_field(&raw.reviewer),
        body: text_field(&raw.body),
        rating: int_field("Rating", &raw.rating)?,
        date: text_field(&raw.date),
        author_location: text_field(&raw.author_location),
        review_count: int_field("Review_Count", &raw.review_count)?,
        review_votes: int_field("Review_Votes", &raw.review_votes)?,
        gender: text_field(&raw.gender),
        age: text_field(&raw.age),
        review_id: raw.review_id.unwrap_or_default(),
        product_id: raw.product_id.unwrap_or_default(),
    })
}

/// A promo price without the promo flag. Never corrected, only reported.
pub fn has_promo_mismatch(product: &ProductRecord) -> bool {
    product.promo_price.is_some() && !product.on_promo
}
