//! Product and review crawler for a retail category listing, with SQLite
//! persistence and an offline review analyzer.

pub mod analysis;
pub mod browser;
pub mod cleaning;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod scrapers;
pub mod storage;
pub mod utils;
