//! Enrichment orchestration.
//!
//! Takes the raw fan-out rows and the collaborator tables and produces the
//! canonical product table: deduplicate, left-join organization/copyright/
//! publisher data, resolve the rights holder (fuzzy match with raw-id
//! fallback), resolve chapters and classify coverage per row, fan video
//! filesets out into their own derived rows, then union, sort, and run the
//! final keep-first pass.
//!
//! Per-row chapter and lookup failures are absorbed here: the affected
//! fields stay unset, the failure is logged and counted, and the run
//! continues. Only structural failures escape this module.

use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::chapters;
use crate::client::CatalogApi;
use crate::dedupe;
use crate::error::RecordError;
use crate::ingest::CollaboratorTables;
use crate::matcher;
use crate::models::{CanonicalProduct, RawFilesetRecord};

/// Counters accumulated over one enrichment run.
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub products: usize,
    pub video_products: usize,
    pub fuzzy_matched: u64,
    pub fallback_matched: u64,
    pub unmatched: u64,
    pub chapter_failures: u64,
}

/// Output of [`enrich`]: the canonical table plus run counters.
#[derive(Debug)]
pub struct Enrichment {
    pub products: Vec<CanonicalProduct>,
    pub stats: RunStats,
}

/// Run the full enrichment pass over raw catalog rows.
pub async fn enrich(
    api: &dyn CatalogApi,
    rows: Vec<RawFilesetRecord>,
    tables: &CollaboratorTables,
    threshold: f64,
) -> Result<Enrichment> {
    let mut stats = RunStats::default();

    // Stage 1: collapse fileset variants (keep-last).
    let rows = dedupe::dedupe(rows);

    // Stage 2: join collaborator tables and resolve the rights holder.
    let mut work: Vec<Work> = rows
        .into_iter()
        .map(|raw| join_row(raw, tables, threshold, &mut stats))
        .collect();

    // Second dedupe pass after join enrichment: keep-first preserves the
    // earliest-assigned rights-holder and copyright values.
    work = keep_first_by(work, |w| (w.raw.abbr.clone(), w.raw.type_prod.clone()));

    // Stage 3: chapters, coverage, medium/mode, canonical URL.
    for row in &mut work {
        resolve_row(api, row, &mut stats).await;
    }

    // Stage 4: video fan-out.
    let mut videos: Vec<Work> = Vec::new();
    for row in &work {
        if let Some(video) = derive_video_row(api, row, &mut stats).await {
            videos.push(video);
        }
    }
    videos = keep_first_by(videos, |w| (w.raw.abbr.clone(), w.raw.id_prod.clone()));

    // Video-typed rows exist only as the fan-out source, never as direct
    // output.
    work.retain(|w| !is_video_type(w.raw.type_prod.as_deref()));
    work.extend(videos);

    // Stage 5: union, discard rows without a production id, sort, final
    // keep-first pass.
    work.retain(|w| w.raw.id_prod.as_deref().map_or(false, |id| !id.is_empty()));
    work.sort_by(|a, b| a.raw.abbr.cmp(&b.raw.abbr));
    work = keep_first_by(work, |w| (w.raw.abbr.clone(), w.raw.type_prod.clone()));

    stats.products = work.len();
    stats.video_products = work.iter().filter(|w| w.mode.as_deref() == Some("VI")).count();

    let products = work.into_iter().map(Work::into_product).collect();
    Ok(Enrichment { products, stats })
}

/// One product row mid-enrichment.
#[derive(Debug, Clone)]
struct Work {
    raw: RawFilesetRecord,
    rights_holder_id: Option<String>,
    copyright_statement: Option<String>,
    publisher_id: Option<String>,
    chapter_ids: Option<String>,
    chapter_count: Option<u32>,
    coverage: Option<String>,
    medium: Option<String>,
    mode: Option<String>,
    url: Option<String>,
}

impl Work {
    fn into_product(self) -> CanonicalProduct {
        CanonicalProduct {
            abbr: self.raw.abbr,
            name: self.raw.name,
            vname: self.raw.vname,
            language: self.raw.language,
            autonym: self.raw.autonym,
            language_id: self.raw.language_id,
            iso: self.raw.iso,
            publication_year: self.raw.date,
            fcbh_id: self.raw.id_prod,
            type_prod: self.raw.type_prod,
            size_prod: self.raw.size_prod,
            volume_prod: self.raw.volume_prod,
            rights_holder_id: self.rights_holder_id,
            copyright_statement: self.copyright_statement,
            publisher_id: self.publisher_id,
            chapter_ids: self.chapter_ids,
            chapter_count: self.chapter_count,
            scripture_set_code: self.coverage,
            medium: self.medium,
            mode: self.mode,
            url: self.url,
        }
    }
}

fn is_video_type(type_prod: Option<&str>) -> bool {
    type_prod.map_or(false, |t| t.starts_with("video"))
}

/// Left-join collaborator tables onto one row and resolve its rights
/// holder: fuzzy match first, raw ownership list as fallback, `None` when
/// both fail.
fn join_row(
    raw: RawFilesetRecord,
    tables: &CollaboratorTables,
    threshold: f64,
    stats: &mut RunStats,
) -> Work {
    let fuzzy = raw
        .name
        .as_deref()
        .and_then(|name| matcher::resolve_organization(name, &tables.registry, threshold))
        .map(str::to_string);

    let rights_holder_id = match fuzzy {
        Some(id) => {
            stats.fuzzy_matched += 1;
            Some(id)
        }
        None => {
            let fallback = tables
                .org_ownership
                .get(&raw.abbr)
                .and_then(|owners| matcher::fallback_rights_holder(owners));
            match fallback {
                Some(id) => {
                    stats.fallback_matched += 1;
                    Some(id)
                }
                None => {
                    stats.unmatched += 1;
                    debug!(abbr = %raw.abbr, "no rights holder resolved");
                    None
                }
            }
        }
    };

    Work {
        copyright_statement: tables.copyrights.get(&raw.abbr).cloned(),
        publisher_id: tables.publishers.get(&raw.abbr).cloned(),
        rights_holder_id,
        chapter_ids: None,
        chapter_count: None,
        coverage: None,
        medium: None,
        mode: None,
        url: None,
        raw,
    }
}

/// Resolve chapters and stamp coverage, medium/mode, and the canonical URL
/// for one row. Chapter lookup failures leave the chapter and coverage
/// fields unset.
async fn resolve_row(api: &dyn CatalogApi, row: &mut Work, stats: &mut RunStats) {
    if let Some((medium, mode)) =
        row.raw.type_prod.as_deref().and_then(chapters::medium_mode)
    {
        row.medium = Some(medium.to_string());
        row.mode = Some(mode.to_string());
    }
    row.url = Some(format!("https://live.bible.is/bible/{}", row.raw.abbr));

    let Some(id_prod) = row.raw.id_prod.clone() else {
        // No production id: nothing to resolve, and the row is discarded
        // before output anyway.
        return;
    };

    match resolve_chapters(api, &row.raw.abbr, &id_prod).await {
        Ok(ids) => {
            let count = ids.len() as u32;
            row.chapter_ids = Some(ids.join(", "));
            row.chapter_count = Some(count);
            row.coverage = Some(
                chapters::classify(Some(count), row.raw.size_prod.as_deref()).to_string(),
            );
        }
        Err(e) => {
            stats.chapter_failures += 1;
            warn!(error = %e, "chapter resolution failed; leaving row unclassified");
        }
    }
}

/// Resolve the chapter identifier set for a product. Fileset ids are longer
/// than a bare abbreviation (6 chars); the former get the fileset listing,
/// the latter the bible's table of contents.
async fn resolve_chapters(
    api: &dyn CatalogApi,
    abbr: &str,
    id_prod: &str,
) -> Result<Vec<String>, RecordError> {
    if id_prod.chars().count() > 6 {
        let listing = api
            .fetch_fileset_chapters(id_prod)
            .await
            .map_err(|e| RecordError::ChapterLookup {
                key: id_prod.to_string(),
                reason: e.to_string(),
            })?;
        Ok(chapters::chapter_set_from_fileset(&listing))
    } else {
        let detail = api
            .fetch_bible(abbr)
            .await
            .map_err(|e| RecordError::ChapterLookup {
                key: abbr.to_string(),
                reason: e.to_string(),
            })?;
        Ok(chapters::chapter_set_from_books(&detail.books))
    }
}

/// Build the video-derived row for a product carrying a video fileset.
///
/// The video fileset's own id/size/type/volume become the row's production
/// fields, the video id's first six characters become its abbreviation, and
/// medium/mode are fixed to DIGITAL/VI. Chapter data comes from the video
/// fileset's own listing; on failure the parent's chapter fields carry
/// over.
async fn derive_video_row(
    api: &dyn CatalogApi,
    parent: &Work,
    stats: &mut RunStats,
) -> Option<Work> {
    let id_vid = parent.raw.id_vid.clone().filter(|id| !id.is_empty())?;

    let mut row = parent.clone();
    row.raw.abbr = id_vid.chars().take(6).collect();
    row.raw.id_prod = Some(id_vid.clone());
    row.raw.size_prod = parent.raw.size_vid.clone();
    row.raw.volume_prod = parent.raw.volume_vid.clone();
    row.raw.stock_no_prod = parent.raw.stock_no_vid.clone();
    row.raw.type_prod = parent
        .raw
        .type_vid
        .as_deref()
        .map(|t| t.chars().take(5).collect());
    row.raw.id_vid = None;
    row.raw.type_vid = None;
    row.raw.size_vid = None;
    row.raw.stock_no_vid = None;
    row.raw.volume_vid = None;
    row.medium = Some("DIGITAL".to_string());
    row.mode = Some("VI".to_string());
    row.url = None;

    match api.fetch_fileset_chapters(&id_vid).await {
        Ok(listing) => {
            let ids = chapters::chapter_set_from_fileset(&listing);
            row.chapter_count = Some(ids.len() as u32);
            row.chapter_ids = Some(ids.join(", "));
        }
        Err(e) => {
            stats.chapter_failures += 1;
            warn!(fileset = %id_vid, error = %e, "video chapter lookup failed; inheriting parent chapters");
        }
    }
    row.coverage = Some(
        chapters::classify(row.chapter_count, row.raw.size_prod.as_deref()).to_string(),
    );

    Some(row)
}

/// Deduplicate keeping the first occurrence of each key, in order.
fn keep_first_by<K, F>(rows: Vec<Work>, key: F) -> Vec<Work>
where
    K: std::hash::Hash + Eq,
    F: Fn(&Work) -> K,
{
    let mut seen = HashSet::new();
    rows.into_iter().filter(|r| seen.insert(key(r))).collect()
}
