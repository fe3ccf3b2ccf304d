//! URL risk engine.
//!
//! Purely lexical: the URL is never fetched or resolved. Each rule
//! contributes a score delta and at most one warning, in a fixed order, and
//! the accumulated total is clamped to 100 only at the end.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::rules;

lazy_static! {
    static ref IPV4_IN_HOST: Regex = Regex::new(r"(?:\d{1,3}\.){3}\d{1,3}").unwrap();
}

/// Risk score at or above which a URL is classified as phishing.
pub const PHISHING_THRESHOLD: u32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlAnalysis {
    pub is_phishing: bool,
    pub risk_score: u8,
    pub warnings: Vec<String>,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
}

impl UrlAnalysis {
    /// Zero-risk result for input that could not be analyzed.
    pub fn degraded(warning: &str) -> Self {
        Self {
            is_phishing: false,
            risk_score: 0,
            warnings: vec![warning.to_string()],
            domain: "unknown".to_string(),
            timestamp: Utc::now(),
        }
    }
}

pub struct UrlAnalyzer;

impl UrlAnalyzer {
    /// Analyze a URL string. Malformed input degrades to a zero-risk
    /// result; this never fails.
    pub fn analyze(url: &str) -> UrlAnalysis {
        log::debug!("Analyzing URL: {url}");

        if url.is_empty() {
            return UrlAnalysis::degraded("No URL provided");
        }

        // Normalization only; says nothing about reachability
        let normalized = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{url}")
        };

        let parsed = match Url::parse(&normalized) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("URL parse failed for {url}: {e}");
                return UrlAnalysis::degraded("Error analyzing URL");
            }
        };

        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        let path = parsed.path().to_lowercase();
        log::debug!("Host: {host}, path: {path}");

        let mut risk_score: u32 = 0;
        let mut warnings = Vec::new();

        // Known phishing domains, exact equality, first match only
        for phishing_domain in rules::PHISHING_DOMAINS {
            if host == *phishing_domain {
                risk_score += 80;
                warnings.push("Known phishing domain detected".to_string());
                log::debug!("Known phishing domain: {phishing_domain}");
                break;
            }
        }

        for tld in rules::SUSPICIOUS_TLDS {
            if host.ends_with(tld) {
                risk_score += 30;
                warnings.push(format!("Suspicious domain extension: {tld}"));
                break;
            }
        }

        if IPV4_IN_HOST.is_match(&host) {
            risk_score += 40;
            warnings.push("IP address used instead of domain name".to_string());
        }

        let subdomain_count = host.matches('.').count();
        if subdomain_count > 3 {
            risk_score += 20;
            warnings.push(format!("Excessive subdomains ({subdomain_count})"));
        }

        let mut keyword_count = 0;
        for keyword in rules::PHISHING_KEYWORDS {
            if host.contains(keyword) || path.contains(keyword) {
                keyword_count += 1;
                risk_score += 8;
            }
        }
        if keyword_count >= 2 {
            risk_score += 15;
            warnings.push(format!(
                "Multiple suspicious keywords detected ({keyword_count})"
            ));
        }

        // Typosquatting: brand appears in the host, the host is not the
        // brand's real domain, and a known lookalike fragment is present
        for brand in rules::BRAND_NAMES {
            if host.contains(brand) && host != format!("{brand}.com") {
                let lookalike = rules::TYPOSQUAT_VARIANTS
                    .iter()
                    .any(|variant| host.contains(&format!("{brand}{variant}")));
                if lookalike {
                    risk_score += 50;
                    warnings.push(format!("Typosquatting detected: mimicking {brand}"));
                    log::debug!("Typosquatting detected: {brand} in {host}");
                    break;
                }
            }
        }

        if normalized.len() < 20 {
            risk_score += 10;
            warnings.push("Very short URL - might be masked".to_string());
        }

        let is_phishing = risk_score >= PHISHING_THRESHOLD;
        let risk_score = risk_score.min(100) as u8;
        log::debug!("Risk score for {host}: {risk_score} (phishing: {is_phishing})");

        UrlAnalysis {
            is_phishing,
            risk_score,
            warnings,
            domain: host,
            timestamp: Utc::now(),
        }
    }
}
