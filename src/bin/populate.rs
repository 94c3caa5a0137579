// src/bin/populate.rs
// DOCUMENTATION: Store seeding tool
// PURPOSE: Run the search pipeline for a list of place names and print a summary table
//
// Usage: populate [TERM]...
// Without arguments the default tour is searched.

use anyhow::Context;
use places_explorer::config::{self, Config};
use places_explorer::services::{
    ProviderClients, ReqwestTransport, RequestCache, SearchService, SearchStats,
};
use std::env;
use std::time::{Duration, Instant};

// --- ANSI colors ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";

const DEFAULT_TERMS: &[&str] = &[
    "Yosemite National Park",
    "Lake Tahoe",
    "Michigan League",
    "New Orleans City Park",
];

struct TermResult {
    term: String,
    stats: Option<SearchStats>,
    duration_secs: f64,
}

fn print_header(total: usize) {
    println!("{}╔══════════════════════════════════════════════════════════════╗{}", CYAN, RESET);
    println!("{}║   Places Explorer - store populator                          ║{}", CYAN, RESET);
    println!("{}╚══════════════════════════════════════════════════════════════╝{}", CYAN, RESET);
    println!("\n{}Terms to search: {}{}", BOLD, total, RESET);
}

fn print_summary(results: &[TermResult]) {
    let rule = "─".repeat(90);
    println!("\n\n{}Search Summary{}", BOLD, RESET);
    println!("{}", rule);
    println!(
        "{:<32} {:<8} {:>8} {:>8} {:>8} {:>10} {:>10}",
        "Term", "Status", "Places", "Reviews", "Photos", "Requests", "Duration"
    );
    println!("{}", rule);

    let mut total_places = 0;
    let mut total_reviews = 0;
    let mut total_photos = 0;
    let mut total_requests = 0;

    for res in results {
        match &res.stats {
            Some(stats) => {
                let status = if stats.from_store { "stored" } else { "ok" };
                println!(
                    "{:<32} {:<8} {:>8} {:>8} {:>8} {:>10} {:>9.1}s",
                    res.term,
                    status,
                    stats.places.inserted,
                    stats.reviews.inserted,
                    stats.photos.inserted,
                    stats.cache_misses,
                    res.duration_secs
                );
                total_places += stats.places.inserted;
                total_reviews += stats.reviews.inserted;
                total_photos += stats.photos.inserted;
                total_requests += stats.cache_misses;
            }
            None => println!(
                "{:<32} {}{:<8}{} {:>8} {:>8} {:>8} {:>10} {:>9.1}s",
                res.term, RED, "failed", RESET, "-", "-", "-", "-", res.duration_secs
            ),
        }
    }

    println!("{}", rule);
    println!("{}Totals:{}", BOLD, RESET);
    println!("  • New places: {}{}{}", GREEN, total_places, RESET);
    println!("  • New nearby businesses: {}{}{}", GREEN, total_reviews, RESET);
    println!("  • New photos: {}{}{}", GREEN, total_photos, RESET);
    println!("  • Network requests: {}{}{}", BLUE, total_requests, RESET);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    let args: Vec<String> = env::args().skip(1).collect();
    let terms: Vec<String> = if args.is_empty() {
        DEFAULT_TERMS.iter().map(|t| t.to_string()).collect()
    } else {
        args
    };

    let pool = config::init_db_pool(&config)
        .await
        .with_context(|| format!("Failed to open store {}", config.database_url))?;
    let transport = ReqwestTransport::new(Duration::from_secs(config.http_timeout))?;
    let mut cache = RequestCache::load(&config.cache_path, transport);
    let clients = ProviderClients::from_config(&config);

    print_header(terms.len());

    let mut results = Vec::with_capacity(terms.len());
    for (i, term) in terms.iter().enumerate() {
        println!("{}[{}/{}] Searching {}...{}", CYAN, i + 1, terms.len(), term, RESET);
        let start = Instant::now();

        let outcome = SearchService::search(
            &pool,
            &mut cache,
            &clients,
            term,
            config.fetch_review_photos,
        )
        .await;
        let duration_secs = start.elapsed().as_secs_f64();

        match outcome {
            Ok(result) => {
                for warning in &result.stats.errors {
                    println!("{}  warning: {}{}", YELLOW, warning, RESET);
                }
                results.push(TermResult {
                    term: term.clone(),
                    stats: Some(result.stats),
                    duration_secs,
                });
            }
            Err(e) => {
                println!("{}  Error searching {}: {}{}", RED, term, e, RESET);
                results.push(TermResult {
                    term: term.clone(),
                    stats: None,
                    duration_secs,
                });
            }
        }
    }

    print_summary(&results);
    Ok(())
}
