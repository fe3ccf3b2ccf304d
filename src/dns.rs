use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;

pub const DEFAULT_MX_TIMEOUT_SECONDS: u64 = 3;

/// Outcome of an MX lookup. The email engine only consumes `is_valid()`;
/// the distinguishing message still surfaces in the analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MxOutcome {
    Active,
    NoRecords,
    NxDomain,
    Timeout,
    Failed,
}

impl MxOutcome {
    pub fn is_valid(self) -> bool {
        matches!(self, MxOutcome::Active)
    }

    pub fn message(self) -> &'static str {
        match self {
            MxOutcome::Active => "MX records found - email service active",
            MxOutcome::NoRecords => "No MX records found for domain",
            MxOutcome::NxDomain => "Domain does not exist",
            MxOutcome::Timeout => "DNS query timeout",
            MxOutcome::Failed => "DNS lookup failed",
        }
    }
}

/// Bounded MX verification. Lookup failures never propagate; every path
/// degrades to an `MxOutcome`.
pub struct MxVerifier {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl MxVerifier {
    pub fn new(timeout_seconds: u64) -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                log::warn!("Failed to read system resolver configuration, using defaults: {e}");
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };

        Self {
            resolver,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    pub async fn verify(&self, domain: &str) -> MxOutcome {
        log::debug!(
            "Checking MX records for {domain} (timeout: {}s)",
            self.timeout.as_secs()
        );

        let lookup = self.resolver.mx_lookup(domain);
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(response)) => {
                let mx_count = response.iter().count();
                if mx_count > 0 {
                    log::debug!("{domain} has {mx_count} MX record(s)");
                    MxOutcome::Active
                } else {
                    log::debug!("MX lookup returned an empty answer for {domain}");
                    MxOutcome::NoRecords
                }
            }
            Ok(Err(e)) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { response_code, .. } => {
                    if *response_code == ResponseCode::NXDomain {
                        log::debug!("Domain does not exist: {domain}");
                        MxOutcome::NxDomain
                    } else {
                        log::debug!("No MX records found for {domain}");
                        MxOutcome::NoRecords
                    }
                }
                ResolveErrorKind::Timeout => {
                    log::debug!("MX lookup timed out for {domain}");
                    MxOutcome::Timeout
                }
                _ => {
                    log::debug!("MX lookup failed for {domain}: {e}");
                    MxOutcome::Failed
                }
            },
            Err(_) => {
                log::debug!(
                    "MX lookup timed out for {domain} after {}s",
                    self.timeout.as_secs()
                );
                MxOutcome::Timeout
            }
        }
    }
}
