//! Product variant collapse rules.
//!
//! The catalog fan-out produces one row per fileset, so a single bible
//! edition shows up many times: one row per text encoding, per audio
//! bitrate, per stream variant. This module collapses those down to one row
//! per (abbreviation, coalesced product type).
//!
//! Rules, applied in order:
//!
//! 1. `text_format` filesets are layout artifacts, not readable text — drop.
//! 2. `16kbps` rows duplicate the standard-bitrate audio — drop.
//! 3. Where an abbreviation carries both `text_plain` and `text_usx`, the
//!    plain representation is canonical — drop the `text_usx` row.
//! 4. Coalesce subtypes: `text_plain`/`text_usx` → `text`, `audio_stream` →
//!    `audio`, `audio_drama_stream` → `audio_drama`.
//! 5. Deduplicate on (abbreviation, coalesced type), keeping the last
//!    occurrence. A second keep-first pass runs later, after join
//!    enrichment.

use std::collections::HashSet;

use crate::models::RawFilesetRecord;

/// Map a raw production type onto its coalesced product type.
pub fn coalesce_type(raw: &str) -> &str {
    match raw {
        "text_plain" | "text_usx" => "text",
        "audio_stream" => "audio",
        "audio_drama_stream" => "audio_drama",
        other => other,
    }
}

/// Collapse raw fan-out rows into one row per (abbreviation, coalesced
/// type). Output preserves the original encounter order.
pub fn dedupe(rows: Vec<RawFilesetRecord>) -> Vec<RawFilesetRecord> {
    let mut rows: Vec<RawFilesetRecord> = rows
        .into_iter()
        .filter(|r| r.type_prod.as_deref() != Some("text_format"))
        .filter(|r| r.bitrate.as_deref() != Some("16kbps"))
        .collect();

    // Abbreviations that have both a plain and a USX text fileset: the USX
    // row loses.
    let plain: HashSet<&str> = rows
        .iter()
        .filter(|r| r.type_prod.as_deref() == Some("text_plain"))
        .map(|r| r.abbr.as_str())
        .collect();
    let usx: HashSet<String> = rows
        .iter()
        .filter(|r| r.type_prod.as_deref() == Some("text_usx"))
        .filter(|r| plain.contains(r.abbr.as_str()))
        .map(|r| r.abbr.clone())
        .collect();
    rows.retain(|r| {
        !(r.type_prod.as_deref() == Some("text_usx") && usx.contains(r.abbr.as_str()))
    });

    for row in &mut rows {
        if let Some(t) = row.type_prod.take() {
            row.type_prod = Some(coalesce_type(&t).to_string());
        }
    }

    keep_last_by(rows, |r| (r.abbr.clone(), r.type_prod.clone()))
}

/// Deduplicate keeping the last occurrence of each key, preserving the
/// position each surviving row last appeared at.
fn keep_last_by<K, F>(rows: Vec<RawFilesetRecord>, key: F) -> Vec<RawFilesetRecord>
where
    K: std::hash::Hash + Eq,
    F: Fn(&RawFilesetRecord) -> K,
{
    let mut seen = HashSet::new();
    let mut kept: Vec<RawFilesetRecord> = rows
        .into_iter()
        .rev()
        .filter(|r| seen.insert(key(r)))
        .collect();
    kept.reverse();
    kept
}
