use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_DIRECTIVE: &str = "review_crawler=info";

/// Installs the global subscriber: stderr always, plus `log_file` when given
/// (the per-session crawl log). `RUST_LOG` extends the default directive.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(DEFAULT_DIRECTIVE.parse()?);

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;
    Ok(())
}
