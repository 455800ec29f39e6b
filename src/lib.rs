//! # DBP Harvest
//!
//! A catalog ingestion and record-linkage pipeline for scripture media
//! products.
//!
//! DBP Harvest pulls the paginated Digital Bible Platform (DBP) v4 catalog,
//! reconciles each product against a rights-holder organization registry
//! using fuzzy name matching, collapses overlapping fileset variants into one
//! canonical row per product type, classifies each product's scripture
//! coverage from its available chapters, and writes a normalized product
//! catalog CSV plus a supporting organization CSV.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────┐
//! │ Catalog API │──▶│   Ingest     │──▶│   Enrich     │──▶│ Export  │
//! │ paged JSON  │   │ flatten rows │   │ match+dedupe │   │  CSV    │
//! └─────────────┘   └──────────────┘   │  +classify   │   └─────────┘
//!                                      └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dbph sources                  # probe catalog API health
//! dbph run ./out --dry-run      # fetch + count without writing
//! dbph run ./out                # full pipeline, writes two CSV files
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Typed catalog records and the output schema |
//! | [`client`] | DBP v4 API client and collaborator contracts |
//! | [`ingest`] | Page walking and fileset fan-out into raw rows |
//! | [`normalize`] | Name canonicalization for fuzzy comparison |
//! | [`matcher`] | Organization entity resolution |
//! | [`dedupe`] | Product variant collapse rules |
//! | [`chapters`] | Chapter coverage classification |
//! | [`enrich`] | Join, resolve, classify orchestration |
//! | [`export`] | CSV emission with schema check |

pub mod chapters;
pub mod client;
pub mod config;
pub mod dedupe;
pub mod enrich;
pub mod error;
pub mod export;
pub mod ingest;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod sources;
