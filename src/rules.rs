//! Static rule tables shared by the email and URL engines.
//!
//! Loaded nowhere, mutated never: these are compile-time constants, and the
//! ordered lists are iterated in declaration order so first-match-wins rules
//! stay deterministic.

/// Providers considered established and trustworthy.
pub const TRUSTED_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "icloud.com",
    "outlook.com",
    "hotmail.com",
    "atria.edu.com",
    "company.com",
    "protonmail.com",
    "aol.com",
    "zoho.com",
    "mail.com",
    "live.com",
    "msn.com",
    "rediffmail.com",
    "ymail.com",
];

/// Known phishing domains. Matched by exact equality only, never by
/// substring or suffix.
pub const PHISHING_DOMAINS: &[&str] = &[
    "gmail-security-verify.com",
    "apple-support-update.com",
    "microsoft-account-confirm.net",
    "paypal-security-login.org",
    "amazon-verification-service.com",
    "facebook-security-alert.com",
    "login-verify-security.com",
    "account-confirmation-update.com",
];

/// Throwaway mailbox providers.
pub const DISPOSABLE_DOMAINS: &[&str] = &[
    "tempmail.com",
    "10minutemail.com",
    "mailinator.com",
    "yopmail.com",
    "throwawaymail.com",
];

/// TLDs with high abuse rates, matched as host suffixes.
pub const SUSPICIOUS_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf", ".xyz", ".top", ".loan"];

/// Keywords commonly seen in credential-harvesting hosts and paths.
pub const PHISHING_KEYWORDS: &[&str] = &[
    "login", "verify", "security", "account", "password", "reset", "confirm", "update",
];

/// Brands frequently impersonated by lookalike domains.
pub const BRAND_NAMES: &[&str] = &[
    "google",
    "facebook",
    "amazon",
    "microsoft",
    "apple",
    "paypal",
];

/// Fragments appended to a brand name by typosquatted hosts,
/// e.g. `paypal-security` or `amazon1`.
pub const TYPOSQUAT_VARIANTS: &[&str] =
    &["-security", "-verify", "-login", "-account", "-update", "1", "0"];

/// Characters that count toward local-part complexity.
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";
