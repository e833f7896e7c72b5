use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use review_crawler::analysis::{
    AnalysisPreset, HttpLanguageModel, LanguageModel, ReviewAnalyzer, Token,
};
use review_crawler::config::Config;
use review_crawler::error::CrawlError;
use review_crawler::models::{ProductRecord, ReviewRecord};
use review_crawler::storage::{SqliteStorage, Storage};

mod common;
use common::session;

/// Tags every word `wunderbar`/`schlecht` as an adjective governed by the
/// following word, which is tagged as a noun.
struct KeywordModel;

#[async_trait]
impl LanguageModel for KeywordModel {
    async fn parse(&self, text: &str) -> Result<Vec<Token>, CrawlError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        Ok(words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let adjective = matches!(*word, "wunderbar" | "schlecht");
                Token {
                    text: word.to_string(),
                    lemma: word.to_lowercase(),
                    pos: if adjective { "ADJ" } else { "NOUN" }.to_string(),
                    head: if adjective && i + 1 < words.len() { i + 1 } else { i },
                }
            })
            .collect())
    }
}

fn product(product_id: i64, name: &str) -> ProductRecord {
    ProductRecord {
        product_url: None,
        article_number: None,
        name: Some(name.to_string()),
        price: None,
        promo_price: None,
        on_promo: false,
        currency: None,
        brand: Some("ACME".into()),
        description: None,
        ingredients: None,
        rating: Some(4.0),
        review_count: None,
        product_id,
    }
}

fn review(rating: i64, body: &str) -> ReviewRecord {
    ReviewRecord {
        reviewer: Some("Kunde".into()),
        body: Some(body.to_string()),
        rating: Some(rating),
        date: Some("heute".into()),
        author_location: None,
        review_count: Some(0),
        review_votes: Some(0),
        gender: None,
        age: None,
        review_id: 1,
        product_id: 1,
    }
}

async fn seeded_storage() -> SqliteStorage {
    let storage = SqliteStorage::in_memory().unwrap();
    storage.migrate().await.unwrap();
    let stamp = session();

    let duft = storage.insert_product(&product(1, "Duft"), &stamp).await.unwrap();
    for body in ["wunderbar Duft", "wunderbar Duft", "wunderbar Duft", "wunderbar Flakon"] {
        storage.insert_review(&review(5, body), duft.id, &stamp).await.unwrap();
    }
    storage
        .insert_review(&review(1, "schlecht Haltbarkeit"), duft.id, &stamp)
        .await
        .unwrap();

    let other = storage.insert_product(&product(2, "Aftershave"), &stamp).await.unwrap();
    storage
        .insert_review(&review(4, "wunderbar Pflege"), other.id, &stamp)
        .await
        .unwrap();
    storage
}

#[tokio::test]
async fn positive_analysis_keeps_pairs_seen_more_than_twice() {
    let storage = seeded_storage().await;

    let rows = ReviewAnalyzer::new(&storage, &KeywordModel)
        .analyze(&AnalysisPreset::positive())
        .await
        .unwrap();

    let found: Vec<_> = rows
        .iter()
        .map(|r| (r.product_name.as_str(), r.pair.as_str(), r.count))
        .collect();
    assert_eq!(found, vec![("Duft", "wunderbar duft", 3)]);
}

#[tokio::test]
async fn negative_analysis_keeps_single_sightings() {
    let storage = seeded_storage().await;

    let rows = ReviewAnalyzer::new(&storage, &KeywordModel)
        .analyze(&AnalysisPreset::negative())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].pair, "schlecht haltbarkeit");
    assert_eq!(rows[0].count, 1);
}

#[tokio::test]
async fn run_writes_timestamped_csv() {
    let storage = seeded_storage().await;
    let out = tempfile::tempdir().unwrap();

    let path = ReviewAnalyzer::new(&storage, &KeywordModel)
        .run(&AnalysisPreset::positive(), out.path())
        .await
        .unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("positive_product_features_"));
    assert!(name.ends_with(".csv"));
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "marke,produktname,kombination,anzahl\nACME,Duft,wunderbar duft,3\n"
    );
}

fn model_for(server: &MockServer) -> HttpLanguageModel {
    let mut config = Config::default();
    config.nlp.endpoint = format!("{}/parse", server.uri());
    HttpLanguageModel::new(&config).unwrap()
}

#[tokio::test]
async fn http_model_posts_text_and_reads_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/parse"))
        .and(body_json(json!({"text": "toller Duft", "model": "de_core_news_sm"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokens": [
                {"text": "toller", "lemma": "toll", "pos": "ADJ", "head": 1},
                {"text": "Duft", "lemma": "Duft", "pos": "NOUN", "head": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = model_for(&server).parse("toller Duft").await.unwrap();

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].lemma, "toll");
    assert_eq!(tokens[0].head, 1);
}

#[tokio::test]
async fn http_model_rejects_heads_outside_the_parse() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokens": [{"text": "gut", "lemma": "gut", "pos": "ADJ", "head": 4}]
        })))
        .mount(&server)
        .await;

    let result = model_for(&server).parse("gut").await;

    assert!(matches!(result, Err(CrawlError::LanguageModel(_))));
}

#[tokio::test]
async fn http_model_surfaces_service_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = model_for(&server).parse("gut").await;

    assert!(matches!(result, Err(CrawlError::LanguageModel(_))));
}
