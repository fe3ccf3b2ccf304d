pub mod api;
pub mod config;
pub mod dns;
pub mod domain;
pub mod email;
pub mod rules;
pub mod statistics;
pub mod storage;
pub mod url_analyzer;

pub use config::Config;
pub use dns::{MxOutcome, MxVerifier};
pub use domain::{DomainCategory, DomainClassifier, DomainVerdict};
pub use email::{EmailAnalysis, EmailAnalyzer, SimilarEmail};
pub use statistics::StatsSummary;
pub use storage::RecordStore;
pub use url_analyzer::{UrlAnalysis, UrlAnalyzer};
