use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::{clean_text, element_text, split_currency};
use crate::models::{RawProduct, RawValue};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid product page selector")
}

static ARTICLE_NUMBER: Lazy<Selector> =
    Lazy::new(|| selector(".mu-product-details-page__article-number"));
static PRODUCT_NAME: Lazy<Selector> =
    Lazy::new(|| selector(".mu-product-details-page__product-name"));
static PRICE: Lazy<Selector> = Lazy::new(|| {
    selector("div.mu-product-price__price-container span.mu-product-price__price")
});
static PROMO_PRICE: Lazy<Selector> = Lazy::new(|| {
    selector("div.mu-product-price__price-container span.mu-product-price__price--promo")
});
static BRAND_LOGO: Lazy<Selector> = Lazy::new(|| selector("a.mu-product-details-page__brand img"));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector(".mu-product-description__text"));
static TABLE_CELL: Lazy<Selector> = Lazy::new(|| selector("td"));

const INGREDIENTS_LABEL: &str = "Inhaltsstoffe";
const ARTICLE_NUMBER_PREFIX: &str = "Art.Nr.";

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(element_text)
}

/// The cell right after the first "Inhaltsstoffe" label that has one.
fn ingredients(document: &Html) -> Option<String> {
    document
        .select(&TABLE_CELL)
        .filter(|cell| cell.text().collect::<String>().contains(INGREDIENTS_LABEL))
        .find_map(|label| {
            label
                .next_siblings()
                .find_map(ElementRef::wrap)
                .filter(|cell| cell.value().name() == "td")
        })
        .map(element_text)
}

/// Extracts the statically rendered fields of a product page. URL, rating,
/// review count and id are filled in by the caller.
pub fn parse_product_page(html: &str) -> RawProduct {
    let document = Html::parse_document(html);

    let article_number = document
        .select(&ARTICLE_NUMBER)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>().replace(ARTICLE_NUMBER_PREFIX, "")));

    let name = first_text(&document, &PRODUCT_NAME);

    let price_text = first_text(&document, &PRICE);
    let promo_text = first_text(&document, &PROMO_PRICE);
    let on_promo = promo_text.is_some();

    let (price, currency) = match price_text {
        Some(text) => {
            let (residue, code) = split_currency(&text);
            (Some(residue), code.map(str::to_string))
        }
        None => (None, None),
    };

    let brand = document
        .select(&BRAND_LOGO)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(clean_text);

    RawProduct {
        article_number,
        name,
        price: price.map(RawValue::Text),
        promo_price: promo_text.map(RawValue::Text),
        on_promo,
        currency,
        brand,
        description: first_text(&document, &DESCRIPTION),
        ingredients: ingredients(&document),
        ..RawProduct::default()
    }
}

/// Review count as shown next to the rating stars, e.g. `"(128)"`.
pub fn review_count_text(text: &str) -> String {
    clean_text(&text.replace(['(', ')'], ""))
}
