//! Flat-file JSON record store.
//!
//! Each collection is a single JSON array at `{data_dir}/{kind}.json`,
//! appended to under a process-wide lock and replaced atomically so
//! concurrent readers never observe a partial record.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::email::SimilarEmail;

pub const EMAIL_ANALYSES: &str = "email_analyses";
pub const PHISHING_URLS: &str = "phishing_urls";

/// Maximum number of entries a similar-email lookup returns.
const SIMILAR_EMAIL_LIMIT: usize = 3;

pub struct RecordStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Self {
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn collection_path(&self, kind: &str) -> PathBuf {
        self.data_dir.join(format!("{kind}.json"))
    }

    /// All records of a collection in insertion order. A missing or
    /// unreadable collection is treated as empty.
    pub fn load(&self, kind: &str) -> Vec<Value> {
        let path = self.collection_path(kind);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                log::warn!("Collection {kind} is not a JSON array, treating as empty");
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to parse collection {kind}: {e}");
                Vec::new()
            }
        }
    }

    /// Append one record. The whole array is rewritten to a temp file and
    /// renamed into place, so readers see either the old or the new file.
    pub fn append(&self, kind: &str, record: Value) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut records = self.load(kind);
        records.push(record);
        self.write_all(kind, &records)
    }

    fn write_all(&self, kind: &str, records: &[Value]) -> Result<()> {
        let path = self.collection_path(kind);
        let tmp_path = self.data_dir.join(format!("{kind}.json.tmp"));

        let content = serde_json::to_string_pretty(records)
            .with_context(|| format!("Failed to serialize collection {kind}"))?;
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }

    /// Records whose top-level `field` equals `value`, preserving
    /// insertion order.
    pub fn query_by_field(&self, kind: &str, field: &str, value: &str) -> Vec<Value> {
        self.load(kind)
            .into_iter()
            .filter(|record| record.get(field).and_then(Value::as_str) == Some(value))
            .collect()
    }

    /// Remove a collection entirely.
    pub fn clear(&self, kind: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = self.collection_path(kind);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }

    /// Previously analyzed addresses sharing this address's domain,
    /// excluding the address itself, capped at three, in store order.
    pub fn similar_emails(&self, email: &str) -> Vec<SimilarEmail> {
        let Some((_, domain)) = email.split_once('@') else {
            return Vec::new();
        };

        self.query_by_field(EMAIL_ANALYSES, "domain", domain)
            .into_iter()
            .filter_map(|record| {
                record
                    .get("email")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .filter(|candidate| candidate != email)
            .take(SIMILAR_EMAIL_LIMIT)
            .map(|candidate| SimilarEmail {
                email: candidate,
                domain: domain.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (RecordStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let (store, _dir) = store();
        assert!(store.load(EMAIL_ANALYSES).is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let (store, _dir) = store();
        for i in 0..5 {
            store
                .append(PHISHING_URLS, json!({ "url": format!("https://x{i}.test") }))
                .unwrap();
        }

        let records = store.load(PHISHING_URLS);
        assert_eq!(records.len(), 5);
        assert_eq!(records[0]["url"], json!("https://x0.test"));
        assert_eq!(records[4]["url"], json!("https://x4.test"));
    }

    #[test]
    fn test_append_leaves_no_temp_file() {
        let (store, dir) = store();
        store.append(PHISHING_URLS, json!({ "url": "a" })).unwrap();
        assert!(!dir.path().join("phishing_urls.json.tmp").exists());
        assert!(dir.path().join("phishing_urls.json").exists());
    }

    #[test]
    fn test_corrupt_collection_degrades_to_empty() {
        let (store, dir) = store();
        std::fs::write(dir.path().join("email_analyses.json"), "{not json").unwrap();
        assert!(store.load(EMAIL_ANALYSES).is_empty());
    }

    #[test]
    fn test_query_by_field() {
        let (store, _dir) = store();
        store
            .append(EMAIL_ANALYSES, json!({ "email": "a@x.com", "domain": "x.com" }))
            .unwrap();
        store
            .append(EMAIL_ANALYSES, json!({ "email": "b@y.com", "domain": "y.com" }))
            .unwrap();
        store
            .append(EMAIL_ANALYSES, json!({ "email": "c@x.com", "domain": "x.com" }))
            .unwrap();

        let matches = store.query_by_field(EMAIL_ANALYSES, "domain", "x.com");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0]["email"], json!("a@x.com"));
        assert_eq!(matches[1]["email"], json!("c@x.com"));
    }

    #[test]
    fn test_similar_emails_excludes_self_and_caps_at_three() {
        let (store, _dir) = store();
        for name in ["one", "two", "three", "four", "me"] {
            store
                .append(
                    EMAIL_ANALYSES,
                    json!({ "email": format!("{name}@x.com"), "domain": "x.com" }),
                )
                .unwrap();
        }

        let similar = store.similar_emails("me@x.com");
        assert_eq!(similar.len(), 3);
        assert_eq!(similar[0].email, "one@x.com");
        assert_eq!(similar[0].domain, "x.com");
        assert!(similar.iter().all(|s| s.email != "me@x.com"));
    }

    #[test]
    fn test_similar_emails_without_at_is_empty() {
        let (store, _dir) = store();
        assert!(store.similar_emails("not-an-email").is_empty());
    }

    #[test]
    fn test_clear_removes_collection() {
        let (store, dir) = store();
        store.append(PHISHING_URLS, json!({ "url": "a" })).unwrap();
        store.clear(PHISHING_URLS).unwrap();
        assert!(!dir.path().join("phishing_urls.json").exists());
        assert!(store.load(PHISHING_URLS).is_empty());
        // Clearing an absent collection is fine
        store.clear(PHISHING_URLS).unwrap();
    }
}
