use serde::{Deserialize, Serialize};

use super::{RawValue, SessionStamp};

/// One accepted review entry as extracted from a rendered review page, or
/// read back from an intermediate file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    #[serde(rename = "Reviewer", default)]
    pub reviewer: Option<String>,
    #[serde(rename = "Review", default)]
    pub body: Option<String>,
    #[serde(rename = "Rating", default)]
    pub rating: Option<RawValue>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Author_Location", default)]
    pub author_location: Option<String>,
    #[serde(rename = "Review_Count", default)]
    pub review_count: Option<RawValue>,
    #[serde(rename = "Review_Votes", default)]
    pub review_votes: Option<RawValue>,
    #[serde(rename = "Gender", default)]
    pub gender: Option<String>,
    #[serde(rename = "Age", default)]
    pub age: Option<String>,
    #[serde(rename = "Review_ID", default)]
    pub review_id: Option<i64>,
    #[serde(rename = "Produkt_ID", default)]
    pub product_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "Reviewer")]
    pub reviewer: Option<String>,
    #[serde(rename = "Review")]
    pub body: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: Option<i64>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Author_Location")]
    pub author_location: Option<String>,
    #[serde(rename = "Review_Count")]
    pub review_count: Option<i64>,
    #[serde(rename = "Review_Votes")]
    pub review_votes: Option<i64>,
    #[serde(rename = "Gender")]
    pub gender: Option<String>,
    #[serde(rename = "Age")]
    pub age: Option<String>,
    #[serde(rename = "Review_ID")]
    pub review_id: i64,
    /// Run-scoped id of the owning product.
    #[serde(rename = "Produkt_ID")]
    pub product_id: i64,
}

impl From<&ReviewRecord> for RawReview {
    fn from(record: &ReviewRecord) -> Self {
        Self {
            reviewer: record.reviewer.clone(),
            body: record.body.clone(),
            rating: record.rating.map(RawValue::Int),
            date: record.date.clone(),
            author_location: record.author_location.clone(),
            review_count: record.review_count.map(RawValue::Int),
            review_votes: record.review_votes.map(RawValue::Int),
            gender: record.gender.clone(),
            age: record.age.clone(),
            review_id: Some(record.review_id),
            product_id: Some(record.product_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredReview {
    pub id: i64,
    /// Primary key of the product row this review belongs to.
    pub product_row_id: i64,
    pub record: ReviewRecord,
    pub session: SessionStamp,
}
