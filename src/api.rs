//! HTTP transport for the two analyzers.
//!
//! The transport stays thin: empty or missing input maps to the documented
//! zero-score defaults, never to an HTTP error, and every analysis is
//! appended to the record store on the way out.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::domain::DomainCategory;
use crate::email::{EmailAnalysis, EmailAnalyzer};
use crate::statistics::StatsSummary;
use crate::storage::{RecordStore, EMAIL_ANALYSES, PHISHING_URLS};
use crate::url_analyzer::UrlAnalyzer;

pub struct AppState {
    pub analyzer: EmailAnalyzer,
    pub store: RecordStore,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/validate-email", post(validate_email))
        .route("/api/detect-phishing", post(detect_phishing))
        .route("/api/security-score/:email", get(security_score))
        .route("/api/similar-emails/:email", get(similar_emails))
        .route("/api/stats", get(stats))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct EmailRequest {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Default, Deserialize)]
struct UrlRequest {
    #[serde(default)]
    url: String,
}

async fn validate_email(
    State(state): State<Arc<AppState>>,
    request: Option<Json<EmailRequest>>,
) -> Json<EmailAnalysis> {
    let email = request
        .map(|Json(request)| request.email)
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if email.is_empty() {
        return Json(EmailAnalysis::rejected("No email provided", Vec::new()));
    }

    let mut result = state.analyzer.analyze(&email).await;
    result.similar_emails = state.store.similar_emails(&email);

    let record = json!({
        "email": email,
        "domain": email.split_once('@').map(|(_, domain)| domain).unwrap_or_default(),
        "result": result,
        "timestamp": Utc::now(),
    });
    if let Err(e) = state.store.append(EMAIL_ANALYSES, record) {
        log::warn!("Failed to persist email analysis: {e}");
    }

    Json(result)
}

async fn detect_phishing(
    State(state): State<Arc<AppState>>,
    request: Option<Json<UrlRequest>>,
) -> Json<Value> {
    let url = request
        .map(|Json(request)| request.url)
        .unwrap_or_default()
        .trim()
        .to_string();

    if url.is_empty() {
        return Json(json!({
            "is_phishing": false,
            "risk_score": 0,
            "warnings": ["No URL provided"],
            "domain": "unknown",
        }));
    }

    // Exact-URL hit in the store short-circuits the engine entirely
    if let Some(known) = state
        .store
        .query_by_field(PHISHING_URLS, "url", &url)
        .into_iter()
        .next()
    {
        let domain = known
            .get("domain")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Json(json!({
            "is_phishing": true,
            "risk_score": 100,
            "warnings": ["Known phishing URL from database"],
            "domain": domain,
            "source": "database",
        }));
    }

    let result = UrlAnalyzer::analyze(&url);

    if result.is_phishing || result.risk_score > 60 {
        let record = json!({
            "url": url,
            "domain": result.domain,
            "risk_score": result.risk_score,
            "timestamp": result.timestamp,
        });
        if let Err(e) = state.store.append(PHISHING_URLS, record) {
            log::warn!("Failed to persist phishing URL: {e}");
        }
    }

    Json(json!(result))
}

async fn security_score(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Json<Value> {
    let email = email.trim().to_lowercase();
    let result = state.analyzer.analyze(&email).await;

    let detailed_analysis = json!({
        "format_score": if result.valid { 20 } else { 0 },
        "domain_score": if result.domain_type == Some(DomainCategory::Trusted) { 25 } else { 10 },
        "mx_score": if result.mx_valid.unwrap_or(false) { 15 } else { 0 },
        "phishing_protection_score": if result.is_phishing { 0 } else { 30 },
    });
    let suggestions = improvement_suggestions(&result);

    let mut response = json!(result);
    if let Value::Object(map) = &mut response {
        map.insert("detailed_analysis".to_string(), detailed_analysis);
        map.insert("improvement_suggestions".to_string(), json!(suggestions));
    }
    Json(response)
}

fn improvement_suggestions(result: &EmailAnalysis) -> Vec<String> {
    let mut suggestions = Vec::new();

    if result.score < 70 {
        suggestions.push("Use a more complex email address with mixed characters".to_string());
    }
    if result.domain_type == Some(DomainCategory::Unknown) {
        suggestions
            .push("Consider using established email providers like Gmail or Outlook".to_string());
    }
    if !result.mx_valid.unwrap_or(false) {
        suggestions.push("Ensure your domain has proper MX records configured".to_string());
    }

    if result.score >= 80 {
        suggestions
            .push("Your email security is excellent - maintain current practices".to_string());
    } else if result.score >= 60 {
        suggestions.push("Your email security is good".to_string());
    } else {
        suggestions.push("Your email security needs improvement".to_string());
    }

    suggestions
}

async fn similar_emails(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Json<Value> {
    let email = email.trim().to_lowercase();
    Json(json!({ "similar_emails": state.store.similar_emails(&email) }))
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsSummary> {
    Json(StatsSummary::collect(&state.store))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "message": "phishguard API is running",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::MxVerifier;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> (Arc<AppState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path()).unwrap();
        let analyzer = EmailAnalyzer::new(MxVerifier::new(1));
        (Arc::new(AppState { analyzer, store }), dir)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> Value {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get_json(app: Router, uri: &str) -> Value {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_empty_email_gets_default_response() {
        let (state, _dir) = test_state();
        let value = post_json(router(state), "/api/validate-email", r#"{"email":"  "}"#).await;
        assert_eq!(value["valid"], json!(false));
        assert_eq!(value["message"], json!("No email provided"));
        assert_eq!(value["score"], json!(0));
        assert_eq!(value["is_phishing"], json!(false));
    }

    #[tokio::test]
    async fn test_phishing_email_is_flagged_and_persisted() {
        let (state, _dir) = test_state();
        let app = router(state.clone());

        let value = post_json(
            app,
            "/api/validate-email",
            r#"{"email":"victim@gmail-security-verify.com"}"#,
        )
        .await;
        assert_eq!(value["is_phishing"], json!(true));
        assert_eq!(value["score"], json!(0));
        assert_eq!(value["domain_type"], json!("phishing"));

        let records = state.store.load(EMAIL_ANALYSES);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["domain"], json!("gmail-security-verify.com"));
    }

    #[tokio::test]
    async fn test_email_input_is_normalized() {
        let (state, _dir) = test_state();
        let value = post_json(
            router(state.clone()),
            "/api/validate-email",
            r#"{"email":"  AB@TempMail.COM "}"#,
        )
        .await;
        assert_eq!(value["domain_type"], json!("disposable"));

        let records = state.store.load(EMAIL_ANALYSES);
        assert_eq!(records[0]["email"], json!("ab@tempmail.com"));
    }

    #[tokio::test]
    async fn test_empty_url_gets_default_response() {
        let (state, _dir) = test_state();
        let value = post_json(router(state), "/api/detect-phishing", r#"{"url":""}"#).await;
        assert_eq!(value["is_phishing"], json!(false));
        assert_eq!(value["risk_score"], json!(0));
        assert_eq!(value["warnings"], json!(["No URL provided"]));
        assert_eq!(value["domain"], json!("unknown"));
    }

    #[tokio::test]
    async fn test_detected_url_is_persisted_then_served_from_database() {
        let (state, _dir) = test_state();
        let url = "http://192.168.1.1/login-verify";

        let first = post_json(
            router(state.clone()),
            "/api/detect-phishing",
            &format!(r#"{{"url":"{url}"}}"#),
        )
        .await;
        assert_eq!(first["is_phishing"], json!(true));
        assert_eq!(first["source"], json!(null));

        // Second lookup of the same URL short-circuits via the store
        let second = post_json(
            router(state.clone()),
            "/api/detect-phishing",
            &format!(r#"{{"url":"{url}"}}"#),
        )
        .await;
        assert_eq!(second["source"], json!("database"));
        assert_eq!(second["risk_score"], json!(100));
        assert_eq!(second["warnings"], json!(["Known phishing URL from database"]));
        assert_eq!(second["domain"], json!("192.168.1.1"));

        // The database hit must not append a second record
        assert_eq!(state.store.load(PHISHING_URLS).len(), 1);
    }

    #[tokio::test]
    async fn test_clean_url_is_not_persisted() {
        let (state, _dir) = test_state();
        let value = post_json(
            router(state.clone()),
            "/api/detect-phishing",
            r#"{"url":"https://example-benign-site.com/welcome"}"#,
        )
        .await;
        assert_eq!(value["is_phishing"], json!(false));
        assert!(state.store.load(PHISHING_URLS).is_empty());
    }

    #[tokio::test]
    async fn test_similar_emails_route() {
        let (state, _dir) = test_state();
        state
            .store
            .append(
                EMAIL_ANALYSES,
                json!({ "email": "other@tempmail.com", "domain": "tempmail.com" }),
            )
            .unwrap();

        let value = get_json(router(state), "/api/similar-emails/me@tempmail.com").await;
        assert_eq!(
            value["similar_emails"],
            json!([{ "email": "other@tempmail.com", "domain": "tempmail.com" }])
        );
    }

    #[tokio::test]
    async fn test_stats_route() {
        let (state, _dir) = test_state();
        let value = get_json(router(state), "/api/stats").await;
        assert_eq!(value["total_emails_analyzed"], json!(0));
        assert_eq!(value["total_phishing_urls"], json!(0));
        assert_eq!(value["phishing_emails_detected"], json!(0));
    }

    #[tokio::test]
    async fn test_health_route() {
        let (state, _dir) = test_state();
        let value = get_json(router(state), "/api/health").await;
        assert_eq!(value["status"], json!("healthy"));
    }

    #[tokio::test]
    async fn test_security_score_for_phishing_address() {
        let (state, _dir) = test_state();
        let value = get_json(
            router(state),
            "/api/security-score/victim@gmail-security-verify.com",
        )
        .await;
        assert_eq!(value["is_phishing"], json!(true));
        assert_eq!(value["detailed_analysis"]["phishing_protection_score"], json!(0));
        assert_eq!(value["detailed_analysis"]["format_score"], json!(0));
        let suggestions = value["improvement_suggestions"].as_array().unwrap();
        assert!(!suggestions.is_empty());
    }
}
