use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rules;

/// Category a domain resolves to. Serialized lowercase into analysis results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainCategory {
    Trusted,
    Disposable,
    Phishing,
    Unknown,
}

impl fmt::Display for DomainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DomainCategory::Trusted => "trusted",
            DomainCategory::Disposable => "disposable",
            DomainCategory::Phishing => "phishing",
            DomainCategory::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainVerdict {
    pub acceptable: bool,
    pub message: &'static str,
    pub category: DomainCategory,
}

/// Exact-match domain classification against the static rule tables.
pub struct DomainClassifier;

impl DomainClassifier {
    /// Classify a domain. Ordered checks, first match wins; comparison is
    /// case-insensitive exact equality only. Unseen domains are `unknown`
    /// and acceptable.
    pub fn classify(domain: &str) -> DomainVerdict {
        let domain_lower = domain.to_lowercase();

        for phishing_domain in rules::PHISHING_DOMAINS {
            if domain_lower == *phishing_domain {
                return DomainVerdict {
                    acceptable: false,
                    message: "Phishing domain detected",
                    category: DomainCategory::Phishing,
                };
            }
        }

        if rules::DISPOSABLE_DOMAINS
            .iter()
            .any(|disposable| domain_lower == *disposable)
        {
            return DomainVerdict {
                acceptable: false,
                message: "Disposable email domain",
                category: DomainCategory::Disposable,
            };
        }

        if rules::TRUSTED_DOMAINS
            .iter()
            .any(|trusted| domain_lower == *trusted)
        {
            return DomainVerdict {
                acceptable: true,
                message: "Valid domain",
                category: DomainCategory::Trusted,
            };
        }

        DomainVerdict {
            acceptable: true,
            message: "Unknown domain",
            category: DomainCategory::Unknown,
        }
    }
}
