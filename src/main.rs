use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use wedding_crawler::app::ports::{DatasetSink, PageFetcher};
use wedding_crawler::config::CrawlerConfig;
use wedding_crawler::infra::{BrowserSessionFetcher, HttpFetcher};
use wedding_crawler::pipeline::{CrawlSummary, Crawler};
use wedding_crawler::storage::{JsonFileSink, SqliteSink};
use wedding_crawler::{logging, metrics};

#[derive(Parser)]
#[command(name = "wedding_crawler")]
#[command(about = "Seoul public wedding-hall availability crawler")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file (defaults to ./crawler.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Page transport
    #[arg(long, value_enum, global = true, default_value_t = FetcherKind::Browser)]
    fetcher: FetcherKind,

    /// Calendar year to crawl
    #[arg(long, global = true)]
    year: Option<i32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FetcherKind {
    /// Plain HTTP client
    Http,
    /// Browser-like session with cookies and DOM anchor checks
    Browser,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl listings and all venue calendars, then save the dataset
    Crawl {
        /// JSON output file (replaced as a whole)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also upsert into this SQLite database
        #[arg(long)]
        sqlite: Option<PathBuf>,
        /// Last listing page to visit
        #[arg(long)]
        max_pages: Option<u32>,
        /// Write a Prometheus metrics snapshot here after the run
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },
    /// List venues only
    Facilities {
        #[arg(long)]
        max_pages: Option<u32>,
    },
    /// Fetch one venue-month calendar
    Calendar {
        #[arg(long)]
        facility: String,
        #[arg(long)]
        month: u32,
        /// Upsert the records into this SQLite database
        #[arg(long)]
        sqlite: Option<PathBuf>,
    },
}

fn build_fetcher(kind: FetcherKind, config: &CrawlerConfig) -> anyhow::Result<Arc<dyn PageFetcher>> {
    let fetcher: Arc<dyn PageFetcher> = match kind {
        FetcherKind::Http => Arc::new(HttpFetcher::new(config)?),
        FetcherKind::Browser => Arc::new(BrowserSessionFetcher::new(config)?),
    };
    Ok(fetcher)
}

fn print_summary(summary: &CrawlSummary) {
    println!("\n📊 Crawl results for {}:", summary.year);
    println!("   Listing pages fetched: {} ({} failed)", summary.pages_fetched, summary.pages_failed);
    println!("   Venues: {} ({} skipped without nonce)", summary.venues, summary.venues_skipped);
    println!("   Months fetched: {} ({} failed)", summary.months_fetched, summary.months_failed);
    println!("   Reservations: {}", summary.reservations);
    if summary.orphan_reservations > 0 {
        println!("   ⚠️  Reservations without a listed venue: {}", summary.orphan_reservations);
    }
    println!("   Saved: {}", if summary.persisted { "yes" } else { "no" });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = CrawlerConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(year) = cli.year {
        config.year = Some(year);
    }
    match &cli.command {
        Commands::Crawl { output, sqlite, max_pages, .. } => {
            if let Some(output) = output {
                config.output_path = output.clone();
            }
            if let Some(sqlite) = sqlite {
                config.sqlite_path = Some(sqlite.clone());
            }
            if let Some(max_pages) = max_pages {
                config.max_pages = *max_pages;
            }
        }
        Commands::Facilities { max_pages: Some(max_pages) } => config.max_pages = *max_pages,
        _ => {}
    }
    config.validate()?;

    let _logging = logging::init_logging(config.log_dir.as_deref());
    metrics::init_metrics();

    let fetcher = build_fetcher(cli.fetcher, &config)?;
    info!("Using {} fetcher against {}", fetcher.name(), config.base_url);
    let crawler = Crawler::from_config(fetcher, &config);

    match cli.command {
        Commands::Crawl { metrics_out, .. } => {
            println!("🚀 Crawling wedding-hall availability for {}...", config.year());

            let mut sinks: Vec<Box<dyn DatasetSink>> =
                vec![Box::new(JsonFileSink::new(config.output_path.clone()))];
            if let Some(path) = &config.sqlite_path {
                sinks.push(Box::new(SqliteSink::open(path.clone())?));
            }

            let outcome = match crawler.run_and_persist(&sinks).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Crawl aborted: {}", e);
                    return Err(e).context("persisting crawl dataset");
                }
            };
            print_summary(&outcome.summary);

            if let Some(path) = metrics_out {
                match metrics::render() {
                    Some(snapshot) => std::fs::write(&path, snapshot)
                        .with_context(|| format!("writing metrics to {}", path.display()))?,
                    None => info!("Metrics recorder not in-process; nothing written"),
                }
            }
        }
        Commands::Facilities { .. } => {
            let listing = crawler.listing().collect().await;
            for v in &listing.venues {
                println!(
                    "ID: {}, 지역: {}, 이름: {}, 타입: {}, 인원: {}, 가격: {}",
                    v.facility_number, v.district, v.name, v.location_type, v.capacity, v.price
                );
            }
            println!("\n✅ {} venues", listing.venues.len());
        }
        Commands::Calendar { facility, month, sqlite } => {
            let year = config.year();
            let reservations = crawler.reservations();
            let nonce = reservations
                .nonce_resolver()
                .resolve(&facility)
                .await
                .with_context(|| format!("no nonce found for venue {}", facility))?;
            let records = reservations.crawl_month(&facility, year, month, &nonce).await?;

            println!("Found {} records for {} in {}-{:02}", records.len(), facility, year, month);
            for r in &records {
                println!("{} {}: {}", r.date, r.time_slot, r.status.as_str());
            }
            if let Some(path) = sqlite {
                SqliteSink::open(path)?.upsert(&[], &records)?;
                println!("💾 Saved to database");
            }
        }
    }
    Ok(())
}
