//! Error taxonomy for the enrichment pipeline.
//!
//! Two classes of failure exist and they never mix:
//!
//! * [`StructuralError`] — fatal, crosses the core boundary. A run aborts
//!   entirely: unreachable catalog during the initial page retrieval, or an
//!   output table whose column set drifted from the published schema.
//! * [`RecordError`] — recovered locally. A single product failing to match
//!   an organization, resolve its chapters, or fetch its copyright data is
//!   logged, counted, and skipped; the affected fields stay unset and the
//!   run continues with the next row.

use thiserror::Error;

/// Fatal pipeline failures. These propagate to the caller and abort the run.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("output schema mismatch: expected {expected} columns, found {found} ({detail})")]
    SchemaMismatch {
        expected: usize,
        found: usize,
        detail: String,
    },

    #[error("catalog endpoint unreachable: {0}")]
    CatalogUnreachable(String),
}

/// Per-row failures, absorbed by the orchestrator.
///
/// Carried as `Result<_, RecordError>` at the row boundary rather than
/// caught exceptions; the orchestrator logs and counts them.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("chapter lookup failed for {key}: {reason}")]
    ChapterLookup { key: String, reason: String },

    #[error("copyright lookup failed for {abbr}: {reason}")]
    CopyrightLookup { abbr: String, reason: String },

    #[error("publisher lookup failed for {abbr}: {reason}")]
    PublisherLookup { abbr: String, reason: String },
}
