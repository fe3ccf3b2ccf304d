use clap::{Arg, Command};
use log::LevelFilter;
use std::process;
use std::sync::Arc;

use phishguard::api::{self, AppState};
use phishguard::config::Config;
use phishguard::dns::MxVerifier;
use phishguard::email::EmailAnalyzer;
use phishguard::statistics::StatsSummary;
use phishguard::storage::{RecordStore, EMAIL_ANALYSES, PHISHING_URLS};
use phishguard::url_analyzer::UrlAnalyzer;

#[tokio::main]
async fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic risk scoring for email addresses and URLs")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("phishguard.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check-email")
                .long("check-email")
                .value_name("ADDRESS")
                .help("Analyze a single email address and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check-url")
                .long("check-url")
                .value_name("URL")
                .help("Analyze a single URL and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show stored analysis statistics")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats-reset")
                .long("stats-reset")
                .help("Reset stored analyses and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        match Config::generate_default(path) {
            Ok(()) => println!("✅ Default configuration written to {path}"),
            Err(e) => {
                eprintln!("❌ Failed to generate configuration: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if let Some(email) = matches.get_one::<String>("check-email") {
        check_email(&config, email).await;
        return;
    }

    if let Some(url) = matches.get_one::<String>("check-url") {
        check_url(url);
        return;
    }

    let store = match RecordStore::new(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Failed to open record store: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("stats-reset") {
        let result = store
            .clear(EMAIL_ANALYSES)
            .and_then(|()| store.clear(PHISHING_URLS));
        match result {
            Ok(()) => println!("✅ Statistics reset successfully"),
            Err(e) => {
                eprintln!("❌ Failed to reset statistics: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if matches.get_flag("stats") {
        print_stats(&store);
        return;
    }

    serve(config, store).await;
}

async fn check_email(config: &Config, email: &str) {
    println!("🔍 Analyzing email: {email}");

    let analyzer = EmailAnalyzer::new(MxVerifier::new(config.mx_timeout_seconds));
    let result = analyzer.analyze(&email.trim().to_lowercase()).await;

    println!();
    println!("  Message:     {}", result.message);
    println!("  Score:       {}/100", result.score);
    println!("  Valid:       {}", result.valid);
    println!("  Phishing:    {}", result.is_phishing);
    if let Some(domain_type) = result.domain_type {
        println!("  Domain type: {domain_type}");
    }
    if let Some(mx_valid) = result.mx_valid {
        println!("  MX valid:    {mx_valid}");
    }
    if !result.recommendations.is_empty() {
        println!();
        println!("  Recommendations:");
        for recommendation in &result.recommendations {
            println!("    • {recommendation}");
        }
    }
}

fn check_url(url: &str) {
    println!("🔍 Analyzing URL: {url}");

    let result = UrlAnalyzer::analyze(url.trim());

    println!();
    println!("  Risk score: {}/100", result.risk_score);
    println!("  Phishing:   {}", result.is_phishing);
    println!("  Domain:     {}", result.domain);
    if !result.warnings.is_empty() {
        println!();
        println!("  Warnings:");
        for warning in &result.warnings {
            println!("    • {warning}");
        }
    }
}

fn print_stats(store: &RecordStore) {
    let summary = StatsSummary::collect(store);

    println!("📊 Phishguard Statistics");
    println!("═══════════════════════════════════════");
    println!("  Emails analyzed:           {}", summary.total_emails_analyzed);
    println!("  Phishing emails detected:  {}", summary.phishing_emails_detected);
    println!("  Phishing URLs recorded:    {}", summary.total_phishing_urls);

    if summary.total_emails_analyzed > 0 {
        let phishing_pct = (summary.phishing_emails_detected as f64
            / summary.total_emails_analyzed as f64)
            * 100.0;
        println!("  Phishing rate:             {phishing_pct:.1}%");
    }
}

async fn serve(config: Config, store: RecordStore) {
    let analyzer = EmailAnalyzer::new(MxVerifier::new(config.mx_timeout_seconds));
    let state = Arc::new(AppState { analyzer, store });
    let app = api::router(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("❌ Failed to bind {}: {e}", config.listen);
            process::exit(1);
        }
    };

    println!("🚀 phishguard API listening on {}", config.listen);
    log::info!("Record store at {}", config.data_dir);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("❌ Server error: {e}");
        process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {e}");
        return;
    }
    log::info!("Shutdown signal received, stopping");
}
