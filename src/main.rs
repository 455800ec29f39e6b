//! # DBP Harvest CLI (`dbph`)
//!
//! The `dbph` binary drives the catalog pipeline: it pulls the paginated
//! DBP v4 catalog, reconciles products against the rights-holder
//! organization registry, classifies scripture coverage, and writes the
//! warehouse CSV tables.
//!
//! ## Usage
//!
//! ```bash
//! dbph --config ./config/dbph.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dbph run <out_dir>` | Full pipeline: fetch, reconcile, classify, write CSVs |
//! | `dbph sources` | Probe catalog API endpoints and print health status |
//!
//! ## Examples
//!
//! ```bash
//! # Probe the API before a long run
//! dbph sources --config ./config/dbph.toml
//!
//! # Count rows without calling the per-row endpoints or writing files
//! dbph run ./out --dry-run
//!
//! # Partial run for testing: two catalog pages, first 50 products
//! dbph run ./out --pages 2 --limit 50
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dbp_harvest::client::HttpCatalogClient;
use dbp_harvest::{config, dedupe, enrich, export, ingest, sources};

/// DBP Harvest — a catalog ingestion and record-linkage pipeline for
/// scripture media products.
#[derive(Parser)]
#[command(
    name = "dbph",
    about = "DBP Harvest — catalog ingestion and record-linkage pipeline",
    version,
    long_about = "DBP Harvest pulls the paginated DBP v4 catalog, reconciles each product \
    against a rights-holder organization registry with fuzzy name matching, deduplicates \
    fileset variants, classifies scripture coverage, and writes a normalized product \
    catalog CSV plus a supporting organization CSV."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/dbph.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the warehouse CSV tables.
    ///
    /// Fetches every catalog page, flattens fileset combinations, gathers
    /// the per-abbreviation collaborator tables, enriches and classifies
    /// each product, and writes CompletedProductFCBH.csv plus
    /// OrganizationFCBH.csv into the output directory.
    Run {
        /// Output directory for the processed tables.
        out_dir: PathBuf,

        /// Cap the number of catalog pages fetched.
        #[arg(long)]
        pages: Option<u32>,

        /// Maximum number of raw rows to process.
        #[arg(long)]
        limit: Option<usize>,

        /// Fetch the catalog and show row counts without touching the
        /// per-row endpoints or writing any file.
        #[arg(long)]
        dry_run: bool,
    },

    /// Probe the catalog API endpoints and print their health status.
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let client = HttpCatalogClient::new(&cfg.api)?;

    match cli.command {
        Commands::Run {
            out_dir,
            pages,
            limit,
            dry_run,
        } => {
            run(&client, &cfg, &out_dir, pages, limit, dry_run).await?;
        }
        Commands::Sources => {
            sources::list_sources(&client).await?;
        }
    }

    Ok(())
}

async fn run(
    client: &HttpCatalogClient,
    cfg: &config::Config,
    out_dir: &PathBuf,
    pages: Option<u32>,
    limit: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    let mut rows = ingest::fetch_catalog(client, pages).await?;
    if let Some(lim) = limit {
        rows.truncate(lim);
    }
    let abbrs = ingest::unique_abbrs(&rows);

    if dry_run {
        let deduped = dedupe::dedupe(rows.clone());
        println!("run catalog (dry-run)");
        println!("  raw fileset rows: {}", rows.len());
        println!("  bible editions:   {}", abbrs.len());
        println!("  deduped products: {}", deduped.len());
        return Ok(());
    }

    let tables = ingest::fetch_collaborators(client, &abbrs).await;
    let enrichment = enrich::enrich(client, rows, &tables, cfg.matching.threshold).await?;

    std::fs::create_dir_all(out_dir)?;
    let source_date = chrono::Utc::now()
        .format(export::SOURCE_DATE_FORMAT)
        .to_string();
    export::write_products(
        &out_dir.join(export::PRODUCTS_FILE),
        &enrichment.products,
        &source_date,
    )?;
    export::write_organizations(&out_dir.join(export::ORGANIZATIONS_FILE), &tables.registry)?;

    let stats = &enrichment.stats;
    println!("run catalog");
    println!("  canonical products:      {}", stats.products);
    println!("  video products:          {}", stats.video_products);
    println!("  rights fuzzy-matched:    {}", stats.fuzzy_matched);
    println!("  rights via fallback:     {}", stats.fallback_matched);
    println!("  rights unresolved:       {}", stats.unmatched);
    println!("  chapter lookup failures: {}", stats.chapter_failures);
    println!("  collaborator skips:      {}", tables.lookup_failures);
    println!("  organizations:           {}", tables.registry.len());
    println!("ok");

    Ok(())
}
