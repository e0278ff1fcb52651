use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use medterm_core::store::{DEFAULT_CATEGORY, DEFAULT_SOURCE, IMPORT_SOURCE};
use medterm_core::{LoadStatus, TermStore};
use medterm_retrieval::{CrossrefClient, MetadataCache, PaperRetrieval, WorkSummary};
use medterm_validate::Validator;

#[derive(Parser)]
#[command(name = "medterm", version, about = "Bilingual medical terminology store")]
struct Cli {
    /// Path to the term store file
    #[arg(long, global = true, default_value = "medical_dictionary.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add or overwrite a term (an existing record loses its history)
    Add {
        english: String,
        vietnamese: String,
        #[arg(long, default_value = DEFAULT_CATEGORY)]
        category: String,
        #[arg(long, default_value = DEFAULT_SOURCE)]
        source: String,
        #[arg(long, default_value_t = 1.0)]
        confidence: f64,
    },
    /// Append a new translation version to an existing term
    Update {
        english: String,
        vietnamese: String,
        #[arg(long, default_value = DEFAULT_SOURCE)]
        source: String,
        #[arg(long, default_value_t = 1.0)]
        confidence: f64,
    },
    /// Look up a term and its version history
    Lookup { english: String },
    /// Rank stored terms by similarity to a query
    Similar {
        term: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Validate a proposed translation pair
    Validate { english: String, vietnamese: String },
    /// Print improvement suggestions for a translation pair
    Suggest { english: String, vietnamese: String },
    /// Export the store to a CSV file
    Export { path: PathBuf },
    /// Import terms from a CSV file (each row overwrites its term)
    Import {
        path: PathBuf,
        #[arg(long, default_value = IMPORT_SOURCE)]
        source: String,
    },
    /// Fetch bibliographic metadata for a DOI from CrossRef
    Fetch {
        doi: String,
        /// Contact address for CrossRef's polite pool
        #[arg(long)]
        mailto: String,
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
        /// Skip the on-disk cache
        #[arg(long)]
        no_cache: bool,
        /// Also fetch the reference list
        #[arg(long)]
        references: bool,
    },
    /// Search CrossRef for works matching a query
    Search {
        query: String,
        /// Contact address for CrossRef's polite pool
        #[arg(long)]
        mailto: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Fetch { doi, mailto, cache_dir, no_cache, references } => {
            fetch(&doi, &mailto, cache_dir, !no_cache, references).await
        }
        Command::Search { query, mailto, limit } => search(&query, &mailto, limit).await,
        command => run_store_command(open_store(cli.store), command),
    }
}

fn open_store(path: PathBuf) -> TermStore {
    let store = TermStore::open(path);
    if store.load_status() == LoadStatus::Corrupt {
        tracing::warn!("Store file was corrupt; starting from an empty store");
    }
    store
}

fn run_store_command(mut store: TermStore, command: Command) -> Result<()> {
    match command {
        Command::Add { english, vietnamese, category, source, confidence } => {
            store.upsert(&english, &vietnamese, &category, &source, confidence)?;
            println!("Added: {english} -> {vietnamese}");
        }
        Command::Update { english, vietnamese, source, confidence } => {
            if store.append_version(&english, &vietnamese, &source, confidence)? {
                println!("Updated: {english} -> {vietnamese}");
            } else {
                anyhow::bail!("term not found: {english}");
            }
        }
        Command::Lookup { english } => match store.get(&english) {
            Some(record) => {
                println!("{english}: {}", record.vietnamese);
                println!("  category:   {}", record.category);
                println!("  confidence: {}", record.confidence);
                println!("  updated:    {}", record.last_updated.to_rfc3339());
                println!("  history:");
                for version in &record.versions {
                    println!(
                        "    {} ({}, {}, {})",
                        version.vietnamese,
                        version.confidence,
                        version.source,
                        version.date.to_rfc3339()
                    );
                }
            }
            None => println!("No translation stored for '{english}'"),
        },
        Command::Similar { term, limit } => {
            let ranked = store.similar_terms(&term, limit);
            if ranked.is_empty() {
                println!("No similar terms for '{term}'");
            }
            for (key, score) in ranked {
                println!("{key} ({score:.3})");
            }
        }
        Command::Validate { english, vietnamese } => {
            let report = Validator::new(&store).validate(&english, &vietnamese);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Suggest { english, vietnamese } => {
            let lines = Validator::new(&store).suggest_improvements(&english, &vietnamese);
            if lines.is_empty() {
                println!("No suggestions; translation looks fine");
            }
            for line in lines {
                println!("{line}");
            }
        }
        Command::Export { path } => {
            store.export_csv(&path)?;
            println!("Exported {} terms to {}", store.len(), path.display());
        }
        Command::Import { path, source } => {
            let summary = store.import_csv(&path, &source)?;
            println!("Imported {} terms ({} skipped)", summary.imported, summary.skipped);
        }
        Command::Fetch { .. } | Command::Search { .. } => unreachable!("handled in main"),
    }
    Ok(())
}

async fn fetch(
    doi: &str,
    mailto: &str,
    cache_dir: PathBuf,
    use_cache: bool,
    references: bool,
) -> Result<()> {
    let papers = PaperRetrieval::new(CrossrefClient::new(mailto), MetadataCache::new(cache_dir)?);
    let work = if references {
        papers.get_paper_with_references(doi, use_cache).await?
    } else {
        papers.get_paper(doi, use_cache).await?
    };
    match work {
        Some(work) => {
            let summary = WorkSummary::from_work(&work);
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if let Some(refs) = &work.references {
                println!("references: {}", serde_json::to_string_pretty(refs)?);
            }
        }
        None => println!("DOI not found: {doi}"),
    }
    Ok(())
}

async fn search(query: &str, mailto: &str, limit: usize) -> Result<()> {
    let client = CrossrefClient::new(mailto);
    let works = client.search_works(query, limit, 0).await?;
    if works.is_empty() {
        println!("No works matched '{query}'");
    }
    for work in &works {
        let summary = WorkSummary::from_work(work);
        println!(
            "{}  {}  ({})",
            summary.doi.as_deref().unwrap_or("-"),
            summary.title.as_deref().unwrap_or("(untitled)"),
            summary.published.map_or("n.d.".to_string(), |y| y.to_string())
        );
    }
    Ok(())
}
