use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use review_crawler::analysis::{AnalysisPreset, HttpLanguageModel, ReviewAnalyzer};
use review_crawler::config::Config;
use review_crawler::export::export_tables;
use review_crawler::logging;
use review_crawler::models::SessionStamp;
use review_crawler::pipeline::{self, CrawlOptions};
use review_crawler::storage::{SqliteStorage, Storage};
use review_crawler::utils::output::SessionPaths;

#[derive(Parser)]
#[command(name = "review-crawler", version, about = "Crawls products and reviews of a category listing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl products and reviews, then load them into the database
    Crawl {
        /// Visit only the first N product links
        #[arg(long)]
        limit: Option<usize>,
        /// Write the intermediate files but leave the database alone
        #[arg(long)]
        skip_ingest: bool,
    },
    /// Load every intermediate file below the output directory
    Ingest,
    /// Dump the products and reviews tables as CSV
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Count recurring adjective pairings in reviews
    Analyze {
        #[arg(value_enum)]
        preset: Preset,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// 4 and 5 star reviews
    Positive,
    /// 1 and 2 star reviews
    Negative,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Arc::new(Config::load()?);

    match cli.command {
        Command::Crawl { limit, skip_ingest } => {
            let session = SessionStamp::now();
            let paths = SessionPaths::new(&config.output_dir, &session);
            paths
                .create()
                .with_context(|| format!("Failed to create {}", paths.dir.display()))?;
            logging::init(Some(&paths.log_file))?;

            let summary = pipeline::run_crawl(
                config,
                session,
                &paths,
                CrawlOptions { limit, skip_ingest },
            )
            .await?;
            info!(
                "Crawl finished: {} products, {} reviews",
                summary.products, summary.reviews
            );
        }
        Command::Ingest => {
            logging::init(None)?;
            let report = pipeline::ingest(&config, &SessionStamp::now()).await?;
            info!(
                "Ingested {} products and {} reviews",
                report.products, report.reviews
            );
        }
        Command::Export { out } => {
            logging::init(None)?;
            let storage = SqliteStorage::open(&config.database_path)?;
            storage.migrate().await?;
            let out_dir = out.unwrap_or_else(|| config.export_dir.clone());
            export_tables(&storage, &out_dir).await?;
        }
        Command::Analyze { preset } => {
            logging::init(None)?;
            let preset = match preset {
                Preset::Positive => AnalysisPreset::positive(),
                Preset::Negative => AnalysisPreset::negative(),
            };
            let storage = SqliteStorage::open(&config.database_path)?;
            storage.migrate().await?;
            let model = HttpLanguageModel::new(&config)?;

            let path = ReviewAnalyzer::new(&storage, &model)
                .run(&preset, &config.analysis_dir)
                .await?;
            info!("Analysis written to {}", path.display());
        }
    }

    Ok(())
}
