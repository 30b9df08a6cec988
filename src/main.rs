use clap::{Parser, Subcommand};
use spindex::core::config::{CrawlerConfig, RetrieverConfig};
use spindex::core::error::Result;
use spindex::crawler::crawler::Crawler;
use spindex::report;
use spindex::search::results::SearchHit;
use spindex::search::retriever::Retriever;
use spindex::storage::snapshot::SnapshotStore;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "spindex",
    version,
    about = "Bounded web crawler with an on-disk inverted index and phrase search"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl from a seed url and persist the index snapshot
    Crawl {
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 300)]
        max_pages: usize,
        #[arg(long, default_value_t = 40)]
        workers: usize,
        #[arg(long, default_value_t = 10)]
        batch_size: usize,
        #[arg(long, default_value = "./data")]
        db: PathBuf,
    },
    /// Run a query against a persisted snapshot
    Search {
        query: String,
        #[arg(long, default_value_t = 50)]
        max_results: usize,
        #[arg(long, default_value = "./data")]
        db: PathBuf,
        /// Emit results as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the crawl summary file
    Report {
        #[arg(long, default_value = "./data")]
        db: PathBuf,
        #[arg(long, default_value = "spider_result.txt")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Crawl {
            seed,
            max_pages,
            workers,
            batch_size,
            db,
        } => {
            let config = CrawlerConfig {
                seed,
                max_pages,
                workers,
                batch_size,
                storage_path: db,
                ..CrawlerConfig::default()
            };
            let summary = Crawler::new(config)?.crawl().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Search {
            query,
            max_results,
            db,
            json,
        } => {
            let retriever = Retriever::open(RetrieverConfig {
                db_path: db,
                max_results,
            })?;
            let hits = retriever.retrieve(&query);
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                print_hits(&hits);
            }
        }
        Command::Report { db, output } => {
            let store = SnapshotStore::open(db)?;
            report::write_crawl_report(&store, &output)?;
            println!("report written to {}", output.display());
        }
    }
    Ok(())
}

fn print_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("no results");
        return;
    }
    for hit in hits {
        println!("{:8.3}  {}", hit.score, hit.title);
        println!("          {}", hit.url);
        println!("          {}, {}", hit.last_modified, hit.size);
        if !hit.keywords.is_empty() {
            let keywords: Vec<String> = hit
                .keywords
                .iter()
                .map(|k| format!("{} {}", k.word, k.frequency))
                .collect();
            println!("          {}", keywords.join("; "));
        }
        println!();
    }
}
