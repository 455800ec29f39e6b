//! Catalog materialization.
//!
//! Walks the paginated catalog, fans each bible edition out into one raw row
//! per (production fileset × video fileset) combination, and gathers the
//! per-abbreviation collaborator tables the enrichment stage joins against:
//! copyright statements, publisher ids, raw organization ownership, and the
//! organization candidate registry used as the fuzzy-match target.
//!
//! A failure to retrieve the catalog itself is structural and aborts the
//! run. A failure against a single abbreviation's copyright or detail
//! endpoint is record-level: logged, counted, skipped.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::client::{BibleRecord, CatalogApi, Fileset};
use crate::error::{RecordError, StructuralError};
use crate::models::{OrganizationCandidate, RawFilesetRecord};

/// Collaborator tables keyed by abbreviation, plus the organization
/// registry.
#[derive(Debug, Default)]
pub struct CollaboratorTables {
    /// abbreviation → copyright statement.
    pub copyrights: HashMap<String, String>,
    /// abbreviation → publisher organization id.
    pub publishers: HashMap<String, String>,
    /// abbreviation → brace-delimited owning organization id list,
    /// e.g. `"{12,34}"`.
    pub org_ownership: HashMap<String, String>,
    /// Fuzzy-match candidates, in registry order.
    pub registry: Vec<OrganizationCandidate>,
    /// Lookups that failed and were skipped.
    pub lookup_failures: u64,
}

/// Fetch every catalog page and flatten into raw fileset rows.
///
/// `max_pages` caps the walk for partial runs. The first page also supplies
/// the total page count; any page failure is structural.
pub async fn fetch_catalog(
    api: &dyn CatalogApi,
    max_pages: Option<u32>,
) -> Result<Vec<RawFilesetRecord>> {
    let first = api
        .fetch_catalog_page(1)
        .await
        .map_err(|e| StructuralError::CatalogUnreachable(e.to_string()))?;

    let mut last_page = first.last_page.max(1);
    if let Some(cap) = max_pages {
        last_page = last_page.min(cap.max(1));
    }

    let mut rows = Vec::new();
    let mut bibles = 0usize;
    for record in &first.records {
        bibles += 1;
        rows.extend(flatten_record(record));
    }

    for page in 2..=last_page {
        let page_data = api
            .fetch_catalog_page(page)
            .await
            .map_err(|e| StructuralError::CatalogUnreachable(e.to_string()))?;
        for record in &page_data.records {
            bibles += 1;
            rows.extend(flatten_record(record));
        }
    }

    info!(pages = last_page, bibles, rows = rows.len(), "catalog fetched");
    Ok(rows)
}

/// Explode one bible edition into the cartesian product of its production
/// and video filesets. A missing bucket contributes a single empty slot so
/// the edition is never dropped here.
pub fn flatten_record(record: &BibleRecord) -> Vec<RawFilesetRecord> {
    let none = [Fileset::default()];
    let prods: &[Fileset] = match record.filesets.get("dbp-prod") {
        Some(list) if !list.is_empty() => list,
        _ => &none,
    };
    let vids: &[Fileset] = match record.filesets.get("dbp-vid") {
        Some(list) if !list.is_empty() => list,
        _ => &none,
    };

    let mut rows = Vec::with_capacity(prods.len() * vids.len());
    for prod in prods {
        for vid in vids {
            rows.push(RawFilesetRecord {
                abbr: record.abbr.clone(),
                name: record.name.clone(),
                vname: record.vname.clone(),
                language: record.language.clone(),
                autonym: record.autonym.clone(),
                language_id: record.language_id,
                iso: record.iso.clone(),
                date: record.date.clone(),
                id_prod: prod.id.clone(),
                type_prod: prod.fileset_type.clone(),
                size_prod: prod.size.clone(),
                stock_no_prod: prod.stock_no.clone(),
                volume_prod: prod.volume.clone(),
                bitrate: prod.bitrate.clone(),
                codec: prod.codec.clone(),
                container: prod.container.clone(),
                id_vid: vid.id.clone(),
                type_vid: vid.fileset_type.clone(),
                size_vid: vid.size.clone(),
                stock_no_vid: vid.stock_no.clone(),
                volume_vid: vid.volume.clone(),
            });
        }
    }
    rows
}

/// Unique abbreviations in first-encounter order.
pub fn unique_abbrs(rows: &[RawFilesetRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| seen.insert(r.abbr.clone()))
        .map(|r| r.abbr.clone())
        .collect()
}

/// Gather copyright, publisher, and ownership tables plus the organization
/// registry for the given abbreviations. Individual lookup failures are
/// absorbed: the abbreviation simply has no entry in the affected table.
pub async fn fetch_collaborators(
    api: &dyn CatalogApi,
    abbrs: &[String],
) -> CollaboratorTables {
    let mut tables = CollaboratorTables::default();
    let mut registry: Vec<OrganizationCandidate> = Vec::new();

    for abbr in abbrs {
        match api.fetch_copyright(abbr).await {
            Ok(entries) => {
                let mut owner_ids: Vec<String> = Vec::new();
                for entry in &entries {
                    let Some(block) = &entry.copyright else { continue };
                    if tables.copyrights.get(abbr).is_none() {
                        if let Some(statement) = &block.copyright {
                            tables.copyrights.insert(abbr.clone(), statement.clone());
                        }
                    }
                    for org in &block.organizations {
                        if !owner_ids.contains(&org.id) {
                            owner_ids.push(org.id.clone());
                        }
                    }
                    // The registry takes the first organization of each
                    // copyright entry.
                    if let Some(first) = block.organizations.first() {
                        registry.push(OrganizationCandidate {
                            id: first.id.clone(),
                            slug: prettify_slug(first.slug.as_deref().unwrap_or_default()),
                        });
                    }
                }
                if !owner_ids.is_empty() {
                    tables
                        .org_ownership
                        .insert(abbr.clone(), format!("{{{}}}", owner_ids.join(",")));
                }
            }
            Err(e) => {
                tables.lookup_failures += 1;
                let skip = RecordError::CopyrightLookup {
                    abbr: abbr.clone(),
                    reason: e.to_string(),
                };
                warn!(error = %skip, "skipping");
            }
        }

        match api.fetch_bible(abbr).await {
            Ok(detail) => {
                if let Some(publisher) = detail.publishers.first() {
                    tables.publishers.insert(abbr.clone(), publisher.id.clone());
                    registry.push(OrganizationCandidate {
                        id: publisher.id.clone(),
                        slug: prettify_slug(publisher.slug.as_deref().unwrap_or_default()),
                    });
                }
            }
            Err(e) => {
                tables.lookup_failures += 1;
                let skip = RecordError::PublisherLookup {
                    abbr: abbr.clone(),
                    reason: e.to_string(),
                };
                warn!(error = %skip, "skipping");
            }
        }
    }

    tables.registry = dedupe_registry_keep_last(registry);
    info!(
        copyrights = tables.copyrights.len(),
        publishers = tables.publishers.len(),
        candidates = tables.registry.len(),
        failures = tables.lookup_failures,
        "collaborator tables gathered"
    );
    tables
}

/// Registry slugs are dash-separated; prettify to spaced title case so they
/// normalize the same way display names do.
pub fn prettify_slug(slug: &str) -> String {
    slug.replace('-', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deduplicate candidates by id, keeping each id's last occurrence at the
/// position it last appeared.
fn dedupe_registry_keep_last(registry: Vec<OrganizationCandidate>) -> Vec<OrganizationCandidate> {
    let mut seen = HashSet::new();
    let mut kept: Vec<OrganizationCandidate> = registry
        .into_iter()
        .rev()
        .filter(|c| seen.insert(c.id.clone()))
        .collect();
    kept.reverse();
    kept
}
