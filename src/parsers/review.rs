use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::stripped_text;
use crate::models::{RawReview, RawValue};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid review selector")
}

static ENTRY: Lazy<Selector> = Lazy::new(|| selector("ol.bv-content-list > li.bv-content-item"));
static AUTHOR: Lazy<Selector> = Lazy::new(|| selector(".bv-author"));
static BODY: Lazy<Selector> = Lazy::new(|| selector(".bv-content-summary-body-text"));
static STARS: Lazy<Selector> = Lazy::new(|| selector(".bv-rating-stars-container > abbr"));
static DATE: Lazy<Selector> =
    Lazy::new(|| selector(".bv-content-datetime .bv-content-datetime-stamp"));
static LOCATION: Lazy<Selector> = Lazy::new(|| selector(".bv-author-location span"));
static AUTHOR_REVIEWS: Lazy<Selector> =
    Lazy::new(|| selector(".bv-author-userstats-reviews .bv-author-userstats-value"));
static AUTHOR_VOTES: Lazy<Selector> =
    Lazy::new(|| selector(".bv-author-userstats-votes .bv-author-userstats-value"));
static AUTHOR_INFO: Lazy<Selector> =
    Lazy::new(|| selector(".bv-author-userinfo .bv-author-userinfo-value"));

fn first<'a>(entry: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    entry.select(selector).next()
}

/// Star rating from the `title` of the stars element, e.g. `"5 out of 5 stars"`.
fn star_rating(stars: ElementRef<'_>) -> Option<i64> {
    stars
        .value()
        .attr("title")?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

/// Author statistics default to zero when the site omits them.
fn author_stat(entry: ElementRef<'_>, selector: &Selector, field: &str) -> Option<RawValue> {
    match first(entry, selector) {
        None => Some(RawValue::Int(0)),
        Some(el) => {
            let text = stripped_text(el);
            match text.parse::<i64>() {
                Ok(value) => Some(RawValue::Int(value)),
                Err(_) => {
                    warn!("Ignoring non-numeric {} {:?}", field, text);
                    None
                }
            }
        }
    }
}

/// Parses one review entry. Entries lacking reviewer, body, rating or date
/// are rejected as a whole.
pub fn parse_review_entry(entry: ElementRef<'_>) -> Option<RawReview> {
    let reviewer = first(entry, &AUTHOR).map(stripped_text)?;
    let body = first(entry, &BODY).map(stripped_text)?;
    let rating = first(entry, &STARS).and_then(star_rating)?;
    let date = first(entry, &DATE).map(stripped_text)?;

    let info: Vec<String> = entry.select(&AUTHOR_INFO).map(stripped_text).collect();

    Some(RawReview {
        reviewer: Some(reviewer),
        body: Some(body),
        rating: Some(RawValue::Int(rating)),
        date: Some(date),
        author_location: first(entry, &LOCATION).map(stripped_text),
        review_count: author_stat(entry, &AUTHOR_REVIEWS, "review count"),
        review_votes: author_stat(entry, &AUTHOR_VOTES, "vote count"),
        gender: info.first().cloned(),
        age: info.get(1).cloned(),
        review_id: None,
        product_id: None,
    })
}

/// All complete review entries of the rendered page, in page order.
pub fn parse_review_page(html: &str) -> Vec<RawReview> {
    let document = Html::parse_document(html);
    document
        .select(&ENTRY)
        .filter_map(|entry| {
            let review = parse_review_entry(entry);
            if review.is_none() {
                warn!("A review entry could not be extracted completely, skipping it");
            }
            review
        })
        .collect()
}
