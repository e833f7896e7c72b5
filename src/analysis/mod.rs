//! Offline review analysis.
//!
//! Reviews of a rating band are grouped per product, parsed, and the
//! adjective pairings that recur across a product's reviews are written to a
//! CSV file.

use chrono::Local;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::CrawlError;
use crate::storage::Storage;

mod model;

pub use model::{HttpLanguageModel, LanguageModel, Token};

/// Pair counts keyed by `"<adjective lemma> <head lemma>"`.
pub type PairCounts = BTreeMap<String, usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPreset {
    pub ratings: Vec<i64>,
    /// Keep pairs seen once instead of requiring more than two sightings.
    pub lenient: bool,
    pub file_stem: String,
}

impl AnalysisPreset {
    pub fn positive() -> Self {
        Self {
            ratings: vec![4, 5],
            lenient: false,
            file_stem: "positive_product_features".to_string(),
        }
    }

    pub fn negative() -> Self {
        Self {
            ratings: vec![1, 2],
            lenient: true,
            file_stem: "negative_product_features".to_string(),
        }
    }

    fn min_count(&self) -> usize {
        if self.lenient {
            1
        } else {
            3
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRow {
    #[serde(rename = "marke")]
    pub brand: String,
    #[serde(rename = "produktname")]
    pub product_name: String,
    #[serde(rename = "kombination")]
    pub pair: String,
    #[serde(rename = "anzahl")]
    pub count: usize,
}

/// Counts adjective pairings in one parse: adjectives governed by a noun,
/// and adjectives governed by a verb.
pub fn count_pairs(tokens: &[Token]) -> (PairCounts, PairCounts) {
    let mut adj_noun = PairCounts::new();
    let mut adj_verb = PairCounts::new();

    for token in tokens.iter().filter(|t| t.pos == "ADJ") {
        let Some(head) = tokens.get(token.head) else {
            continue;
        };
        let target = match head.pos.as_str() {
            "NOUN" => &mut adj_noun,
            "VERB" => &mut adj_verb,
            _ => continue,
        };
        *target
            .entry(format!("{} {}", token.lemma, head.lemma))
            .or_default() += 1;
    }

    (adj_noun, adj_verb)
}

/// Surviving pairs, most frequent first.
pub fn frequent_pairs(counts: &PairCounts, min_count: usize) -> Vec<(String, usize)> {
    let mut kept: Vec<_> = counts
        .iter()
        .filter(|(_, count)| **count >= min_count)
        .map(|(pair, &count)| (pair.clone(), count))
        .collect();
    kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    kept
}

pub struct ReviewAnalyzer<'a> {
    storage: &'a dyn Storage,
    model: &'a dyn LanguageModel,
}

impl<'a> ReviewAnalyzer<'a> {
    pub fn new(storage: &'a dyn Storage, model: &'a dyn LanguageModel) -> Self {
        Self { storage, model }
    }

    pub async fn analyze(&self, preset: &AnalysisPreset) -> Result<Vec<FeatureRow>, CrawlError> {
        let reviews = self.storage.reviews_with_rating(&preset.ratings).await?;
        info!("{} reviews with rating {:?} loaded", reviews.len(), preset.ratings);

        // Reviews of products without brand or name cannot be attributed.
        let mut groups: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
        let mut unattributed = 0;
        for review in reviews {
            match (review.brand, review.product_name) {
                (Some(brand), Some(name)) => groups.entry((brand, name)).or_default().push(review.body),
                _ => unattributed += 1,
            }
        }
        if unattributed > 0 {
            warn!("{} reviews skipped, their product has no brand or name", unattributed);
        }

        let total = groups.len();
        let mut rows = Vec::new();
        for (index, ((brand, name), bodies)) in groups.into_iter().enumerate() {
            info!("Analyzing {} - {} ({}/{})", brand, name, index + 1, total);
            let tokens = self.model.parse(&bodies.join(" ")).await?;
            let (adj_noun, adj_verb) = count_pairs(&tokens);

            for counts in [&adj_noun, &adj_verb] {
                for (pair, count) in frequent_pairs(counts, preset.min_count()) {
                    rows.push(FeatureRow {
                        brand: brand.clone(),
                        product_name: name.clone(),
                        pair,
                        count,
                    });
                }
            }
        }
        Ok(rows)
    }

    /// Runs the analysis and writes `<file_stem>_<YYYYmmddHHMMSS>.csv` to
    /// `out_dir`. Returns the written path.
    pub async fn run(&self, preset: &AnalysisPreset, out_dir: &Path) -> Result<PathBuf, CrawlError> {
        let rows = self.analyze(preset).await?;

        fs::create_dir_all(out_dir)?;
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let path = out_dir.join(format!("{}_{}.csv", preset.file_stem, stamp));
        write_feature_csv(&rows, &path)?;

        info!("{} feature rows written to {}", rows.len(), path.display());
        Ok(path)
    }
}

pub fn write_feature_csv(rows: &[FeatureRow], path: &Path) -> Result<(), CrawlError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(["marke", "produktname", "kombination", "anzahl"])?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
