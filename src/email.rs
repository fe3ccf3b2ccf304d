//! Email scoring engine.
//!
//! Validates structure, classifies the domain, folds in the MX verdict and
//! produces a 0-100 security score with ordered recommendations. Every
//! failure path returns a well-formed result; the engine never errors out
//! to its caller.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dns::MxVerifier;
use crate::domain::{DomainCategory, DomainClassifier};
use crate::rules;

lazy_static! {
    static ref EMAIL_FORMAT: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

const BASE_SCORE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarEmail {
    pub email: String,
    pub domain: String,
}

/// Full analysis of a single address. Immutable once returned; the
/// `similar_emails` list is filled in by the transport layer from the
/// record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAnalysis {
    pub valid: bool,
    pub message: String,
    pub score: u8,
    pub is_phishing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<DomainCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mx_valid: Option<bool>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similar_emails: Vec<SimilarEmail>,
}

impl EmailAnalysis {
    /// Zero-score result for input that never reached scoring.
    pub fn rejected(message: impl Into<String>, recommendations: Vec<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            score: 0,
            is_phishing: false,
            domain: None,
            domain_type: None,
            mx_valid: None,
            recommendations,
            similar_emails: Vec::new(),
        }
    }

    fn invalid_format(message: &str) -> Self {
        Self::rejected(
            message,
            vec!["Please enter a valid email address format".to_string()],
        )
    }
}

pub struct EmailAnalyzer {
    mx: MxVerifier,
}

impl EmailAnalyzer {
    pub fn new(mx: MxVerifier) -> Self {
        Self { mx }
    }

    /// Analyze one address. Format failures, phishing domains and
    /// disposable domains short-circuit before any DNS traffic.
    pub async fn analyze(&self, email: &str) -> EmailAnalysis {
        log::debug!("Validating email: {email}");

        if email.is_empty() || !email.contains('@') {
            return EmailAnalysis::invalid_format("Invalid email format - missing @ symbol");
        }
        if !EMAIL_FORMAT.is_match(email) {
            return EmailAnalysis::invalid_format("Invalid email format - incorrect structure");
        }

        let Some((local_part, domain)) = email.split_once('@') else {
            return EmailAnalysis::invalid_format("Invalid email format");
        };
        log::debug!("Local part: {local_part}, domain: {domain}");

        let verdict = DomainClassifier::classify(domain);
        log::debug!("Domain check: {} ({})", verdict.message, verdict.category);

        if verdict.category == DomainCategory::Phishing {
            log::warn!("Phishing domain in email address: {domain}");
            return EmailAnalysis {
                valid: false,
                message: "🚨 PHISHING EMAIL DETECTED".to_string(),
                score: 0,
                is_phishing: true,
                domain: Some(domain.to_string()),
                domain_type: Some(verdict.category),
                mx_valid: None,
                recommendations: vec![
                    "This email appears to be a phishing attempt".to_string(),
                    "Do not provide any personal information".to_string(),
                    "Report this email to your security team".to_string(),
                    "Delete this email immediately".to_string(),
                ],
                similar_emails: Vec::new(),
            };
        }

        if !verdict.acceptable {
            // Disposable providers are rejected outright, no MX lookup
            return EmailAnalysis {
                valid: false,
                message: format!("❌ {}", verdict.message),
                score: 0,
                is_phishing: false,
                domain: Some(domain.to_string()),
                domain_type: Some(verdict.category),
                mx_valid: None,
                recommendations: vec![
                    "Use a permanent email address from an established provider".to_string(),
                ],
                similar_emails: Vec::new(),
            };
        }

        let outcome = self.mx.verify(domain).await;
        let mx_valid = outcome.is_valid();
        log::debug!("MX check: {} (valid: {mx_valid})", outcome.message());

        let score = security_score(local_part, verdict.category, mx_valid);
        log::debug!("Security score for {email}: {score}");

        let recommendations = recommendations(score, verdict.category, mx_valid, local_part);

        let message = if mx_valid {
            format!("✅ {}. {}", verdict.message, outcome.message())
        } else {
            format!("⚠️ {}. {}", verdict.message, outcome.message())
        };

        EmailAnalysis {
            valid: true,
            message,
            score,
            is_phishing: false,
            domain: Some(domain.to_string()),
            domain_type: Some(verdict.category),
            mx_valid: Some(mx_valid),
            recommendations,
            similar_emails: Vec::new(),
        }
    }
}

fn has_special_char(local_part: &str) -> bool {
    local_part.chars().any(|c| rules::SPECIAL_CHARS.contains(c))
}

fn has_digit(local_part: &str) -> bool {
    local_part.chars().any(|c| c.is_ascii_digit())
}

/// Additive security score, base 50. Contributions are applied
/// independently and the total is clamped to 100 only at the end, so a
/// trusted domain plus a strong local part can overshoot before the clamp.
fn security_score(local_part: &str, category: DomainCategory, mx_valid: bool) -> u8 {
    let mut score = BASE_SCORE;

    if local_part.len() >= 8 {
        score += 10;
    }
    if has_special_char(local_part) {
        score += 10;
    }
    if has_digit(local_part) {
        score += 5;
    }

    score += match category {
        DomainCategory::Trusted => 25,
        DomainCategory::Unknown => 10,
        _ => 0,
    };

    if mx_valid {
        score += 15;
    }

    score.min(100) as u8
}

/// Ordered recommendation list. Conditions are independent, not mutually
/// exclusive; exactly one score-tier message closes the list.
fn recommendations(
    score: u8,
    category: DomainCategory,
    mx_valid: bool,
    local_part: &str,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if score < 60 {
        recommendations.push("Consider using a more secure email provider".to_string());
    }
    if local_part.len() < 8 {
        recommendations.push("Use a longer username for better security".to_string());
    }
    if !has_special_char(local_part) {
        recommendations.push("Include special characters in your email username".to_string());
    }
    if category == DomainCategory::Unknown {
        recommendations
            .push("Consider using established email providers like Gmail or Outlook".to_string());
    }
    if !mx_valid {
        recommendations.push("Email service configuration may need improvement".to_string());
    }

    let tier = if score >= 80 {
        "Your email security is excellent"
    } else if score >= 60 {
        "Your email security is good"
    } else {
        "Your email security needs improvement"
    };
    recommendations.push(tier.to_string());

    recommendations
}
