use serde::{Deserialize, Serialize};

use super::SessionStamp;

/// A scraped value before typing. The intermediate JSON files carry numbers
/// either as JSON numbers or as the text found on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Product fields as extracted from a detail page (or read back from an
/// intermediate file). Keys match the intermediate JSON format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(rename = "Produkt_URL", default)]
    pub product_url: Option<String>,
    #[serde(rename = "Artikelnummer", default)]
    pub article_number: Option<String>,
    #[serde(rename = "Produktname", default)]
    pub name: Option<String>,
    #[serde(rename = "Preis", default)]
    pub price: Option<RawValue>,
    #[serde(rename = "Promo_Preis", default)]
    pub promo_price: Option<RawValue>,
    #[serde(rename = "on_promo", default)]
    pub on_promo: bool,
    #[serde(rename = "Währung", default)]
    pub currency: Option<String>,
    #[serde(rename = "Marke", default)]
    pub brand: Option<String>,
    #[serde(rename = "Artikelbeschreibung", default)]
    pub description: Option<String>,
    #[serde(rename = "Inhaltsstoffe", default)]
    pub ingredients: Option<String>,
    #[serde(rename = "GesamtRating", default)]
    pub rating: Option<RawValue>,
    #[serde(rename = "Gesamtanzahl_Reviews", default)]
    pub review_count: Option<RawValue>,
    #[serde(rename = "Produkt_ID", default)]
    pub product_id: Option<i64>,
}

/// A cleaned product: sentinels are gone and numbers are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Produkt_URL")]
    pub product_url: Option<String>,
    #[serde(rename = "Artikelnummer")]
    pub article_number: Option<String>,
    #[serde(rename = "Produktname")]
    pub name: Option<String>,
    #[serde(rename = "Preis")]
    pub price: Option<f64>,
    #[serde(rename = "Promo_Preis")]
    pub promo_price: Option<f64>,
    #[serde(rename = "on_promo")]
    pub on_promo: bool,
    #[serde(rename = "Währung")]
    pub currency: Option<String>,
    #[serde(rename = "Marke")]
    pub brand: Option<String>,
    #[serde(rename = "Artikelbeschreibung")]
    pub description: Option<String>,
    #[serde(rename = "Inhaltsstoffe")]
    pub ingredients: Option<String>,
    #[serde(rename = "GesamtRating")]
    pub rating: Option<f64>,
    #[serde(rename = "Gesamtanzahl_Reviews")]
    pub review_count: Option<i64>,
    #[serde(rename = "Produkt_ID")]
    pub product_id: i64,
}

impl ProductRecord {
    /// Only products with a positive aggregate rating have reviews worth
    /// paginating through.
    pub fn has_reviews(&self) -> bool {
        self.rating.map_or(false, |rating| rating > 0.0)
    }
}

impl From<&ProductRecord> for RawProduct {
    fn from(record: &ProductRecord) -> Self {
        Self {
            product_url: record.product_url.clone(),
            article_number: record.article_number.clone(),
            name: record.name.clone(),
            price: record.price.map(RawValue::Float),
            promo_price: record.promo_price.map(RawValue::Float),
            on_promo: record.on_promo,
            currency: record.currency.clone(),
            brand: record.brand.clone(),
            description: record.description.clone(),
            ingredients: record.ingredients.clone(),
            rating: record.rating.map(RawValue::Float),
            review_count: record.review_count.map(RawValue::Int),
            product_id: Some(record.product_id),
        }
    }
}

/// A product row as committed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProduct {
    pub id: i64,
    pub record: ProductRecord,
    pub session: SessionStamp,
}
