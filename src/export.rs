use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::CrawlError;
use crate::storage::{Storage, Table, TableDump};

pub const EXPORT_DELIMITER: u8 = b';';

pub fn write_table_csv(dump: &TableDump, path: &Path) -> Result<(), CrawlError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(EXPORT_DELIMITER)
        .from_path(path)?;

    writer.write_record(&dump.columns)?;
    for row in &dump.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Dumps `products` and `reviews` to `products.csv` and `reviews.csv` in
/// `out_dir`.
pub async fn export_tables(storage: &dyn Storage, out_dir: &Path) -> Result<Vec<PathBuf>, CrawlError> {
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for table in [Table::Products, Table::Reviews] {
        let dump = storage.dump_table(table).await?;
        let path = out_dir.join(format!("{}.csv", table.name()));
        write_table_csv(&dump, &path)?;
        info!("Exported {} rows of {} to {}", dump.rows.len(), table.name(), path.display());
        written.push(path);
    }
    Ok(written)
}
