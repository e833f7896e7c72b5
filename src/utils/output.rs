use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::CrawlError;
use crate::models::SessionStamp;

pub const PRODUCTS_MARKER: &str = "produkte";
pub const REVIEWS_MARKER: &str = "reviews";

/// File layout of one crawl session below the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub dir: PathBuf,
    pub products_json: PathBuf,
    pub reviews_json: PathBuf,
    pub log_file: PathBuf,
}

impl SessionPaths {
    pub fn new(output_root: &Path, stamp: &SessionStamp) -> Self {
        let suffix = stamp.file_suffix();
        let dir = output_root.join(format!("Crawler_Session_{}", suffix));
        Self {
            products_json: dir.join(format!("{}_{}.json", PRODUCTS_MARKER, suffix)),
            reviews_json: dir.join(format!("{}_{}.json", REVIEWS_MARKER, suffix)),
            log_file: dir.join(format!("crawler_log_{}.txt", suffix)),
            dir,
        }
    }

    pub fn create(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }
}

/// Pretty-printed UTF-8 JSON (4-space indent) without U+2028/U+2029, which
/// some downstream readers treat as line breaks.
pub fn to_clean_json<T: Serialize + ?Sized>(data: &T) -> Result<String, CrawlError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    data.serialize(&mut serializer)?;

    let json = String::from_utf8(buffer)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(json.replace(['\u{2028}', '\u{2029}'], ""))
}

pub fn save_clean_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), CrawlError> {
    fs::write(path, to_clean_json(data)?)?;
    Ok(())
}

/// Intermediate files found in one session directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFiles {
    pub dir: PathBuf,
    pub products: Vec<PathBuf>,
    pub reviews: Vec<PathBuf>,
}

/// Every session directory directly below `root` that holds product or
/// review JSON files, sorted by directory name.
pub fn find_session_files(root: &Path) -> io::Result<Vec<SessionFiles>> {
    let mut sessions = Vec::new();

    for entry in fs::read_dir(root)? {
        let dir = entry?.path();
        if !dir.is_dir() {
            continue;
        }

        let mut files = SessionFiles {
            dir: dir.clone(),
            ..SessionFiles::default()
        };
        for file in fs::read_dir(&dir)? {
            let path = file?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            if name.contains(PRODUCTS_MARKER) {
                files.products.push(path);
            } else if name.contains(REVIEWS_MARKER) {
                files.reviews.push(path);
            }
        }

        if !files.products.is_empty() || !files.reviews.is_empty() {
            files.products.sort();
            files.reviews.sort();
            sessions.push(files);
        }
    }

    sessions.sort_by(|a, b| a.dir.cmp(&b.dir));
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> SessionStamp {
        SessionStamp(
            NaiveDate::from_ymd_opt(2024, 5, 4)
                .unwrap()
                .and_hms_opt(9, 8, 7)
                .unwrap(),
        )
    }

    #[test]
    fn session_paths_share_the_timestamp() {
        let paths = SessionPaths::new(Path::new("Output"), &stamp());
        assert_eq!(paths.dir, Path::new("Output/Crawler_Session_20240504_090807"));
        assert_eq!(
            paths.products_json,
            Path::new("Output/Crawler_Session_20240504_090807/produkte_20240504_090807.json")
        );
        assert_eq!(
            paths.reviews_json.file_name().unwrap(),
            "reviews_20240504_090807.json"
        );
    }

    #[test]
    fn clean_json_strips_separators_and_indents_by_four() {
        let json = to_clean_json(&vec![serde_json::json!({"Review": "a\u{2028}b\u{2029}c ü"})]).unwrap();
        assert!(json.contains("\"Review\": \"abc ü\""));
        assert!(json.contains("\n        \"Review\""));
    }

    #[test]
    fn finds_json_files_one_level_down() {
        let root = tempfile::tempdir().unwrap();
        let session = root.path().join("Crawler_Session_1");
        fs::create_dir_all(&session).unwrap();
        fs::write(session.join("produkte_1.json"), "[]").unwrap();
        fs::write(session.join("reviews_1.json"), "[]").unwrap();
        fs::write(session.join("crawler_log_1.txt"), "").unwrap();
        fs::write(session.join("notes.json"), "{}").unwrap();
        fs::write(root.path().join("produkte_top.json"), "[]").unwrap();
        fs::create_dir_all(root.path().join("empty")).unwrap();

        let sessions = find_session_files(root.path()).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].products, vec![session.join("produkte_1.json")]);
        assert_eq!(sessions[0].reviews, vec![session.join("reviews_1.json")]);
    }
}
