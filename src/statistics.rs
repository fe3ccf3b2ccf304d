use serde::Serialize;
use serde_json::Value;

use crate::storage::{RecordStore, EMAIL_ANALYSES, PHISHING_URLS};

/// Aggregate counters over the record store.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub total_emails_analyzed: usize,
    pub total_phishing_urls: usize,
    pub phishing_emails_detected: usize,
}

impl StatsSummary {
    pub fn collect(store: &RecordStore) -> Self {
        let email_analyses = store.load(EMAIL_ANALYSES);
        let phishing_urls = store.load(PHISHING_URLS);

        let phishing_emails_detected = email_analyses
            .iter()
            .filter(|record| {
                record
                    .pointer("/result/is_phishing")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
            .count();

        Self {
            total_emails_analyzed: email_analyses.len(),
            total_phishing_urls: phishing_urls.len(),
            phishing_emails_detected,
        }
    }
}
