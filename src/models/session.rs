use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date and time a crawl session started. Stamped uniformly on every record
/// of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStamp(pub NaiveDateTime);

impl SessionStamp {
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// `20240131_174502`, used in directory and file names.
    pub fn file_suffix(&self) -> String {
        self.0.format("%Y%m%d_%H%M%S").to_string()
    }

    pub fn db_date(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    pub fn db_time(&self) -> String {
        self.0.format("%H:%M:%S%.6f").to_string()
    }
}

impl fmt::Display for SessionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn renders_file_and_db_forms() {
        let stamp = SessionStamp(
            NaiveDate::from_ymd_opt(2024, 1, 31)
                .unwrap()
                .and_hms_micro_opt(17, 45, 2, 120)
                .unwrap(),
        );
        assert_eq!(stamp.file_suffix(), "20240131_174502");
        assert_eq!(stamp.db_date(), "2024-01-31");
        assert_eq!(stamp.db_time(), "17:45:02.000120");
    }
}
