pub mod product;
pub mod review;
pub mod session;

pub use product::*;
pub use review::*;
pub use session::*;

/// Placeholder the site (and older intermediate files) use for missing data.
pub const SENTINELS: &[&str] = &["unknown", "unbekannt", "n/a"];
