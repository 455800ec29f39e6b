//! Core data models for the catalog pipeline.
//!
//! These types carry catalog rows through the typed transformation stages:
//! raw fan-out rows from ingestion, canonical products out of enrichment,
//! and the organization registry entries used as fuzzy-match targets.

/// One row per (bible abbreviation × production fileset × video fileset)
/// combination as returned by the catalog API. Exists only during ingestion.
#[derive(Debug, Clone, Default)]
pub struct RawFilesetRecord {
    pub abbr: String,
    pub name: Option<String>,
    pub vname: Option<String>,
    pub language: Option<String>,
    pub autonym: Option<String>,
    pub language_id: Option<i64>,
    pub iso: Option<String>,
    pub date: Option<String>,
    // production fileset
    pub id_prod: Option<String>,
    pub type_prod: Option<String>,
    pub size_prod: Option<String>,
    pub stock_no_prod: Option<String>,
    pub volume_prod: Option<String>,
    pub bitrate: Option<String>,
    pub codec: Option<String>,
    pub container: Option<String>,
    // video fileset
    pub id_vid: Option<String>,
    pub type_vid: Option<String>,
    pub size_vid: Option<String>,
    pub stock_no_vid: Option<String>,
    pub volume_vid: Option<String>,
}

/// Registry entry used as a fuzzy-match target. Never mutated by the
/// pipeline.
#[derive(Debug, Clone)]
pub struct OrganizationCandidate {
    pub id: String,
    pub slug: String,
}

/// One row per (abbreviation, coalesced product type) after enrichment.
///
/// `abbr` is the business key used for sorting and deduplication; it is an
/// internal column and does not appear in the output schema. The public
/// `FCBHId` column carries the production fileset id.
#[derive(Debug, Clone, Default)]
pub struct CanonicalProduct {
    pub abbr: String,
    pub name: Option<String>,
    pub vname: Option<String>,
    pub language: Option<String>,
    pub autonym: Option<String>,
    pub language_id: Option<i64>,
    pub iso: Option<String>,
    pub publication_year: Option<String>,
    pub fcbh_id: Option<String>,
    pub type_prod: Option<String>,
    pub size_prod: Option<String>,
    pub volume_prod: Option<String>,
    pub rights_holder_id: Option<String>,
    pub copyright_statement: Option<String>,
    pub publisher_id: Option<String>,
    pub chapter_ids: Option<String>,
    pub chapter_count: Option<u32>,
    pub scripture_set_code: Option<String>,
    pub medium: Option<String>,
    pub mode: Option<String>,
    pub url: Option<String>,
}

/// Published column order for the product catalog table. A `SourceDate`
/// column is stamped after these at write time.
pub const OUTPUT_COLUMNS: [&str; 20] = [
    "FCBHId",
    "name",
    "vname",
    "language",
    "autonym",
    "language_id",
    "ISO",
    "PublicationYear",
    "type_prod",
    "size_prod",
    "volume_prod",
    "RightsholderOrganizationId",
    "copyright_statement",
    "PublisherOrganizationId",
    "Chapter_Ids",
    "chapter_count",
    "ScriptureSetCode",
    "Medium",
    "Mode",
    "URL",
];

impl CanonicalProduct {
    /// Column names in the same order as [`CanonicalProduct::to_fields`].
    pub fn columns() -> Vec<&'static str> {
        OUTPUT_COLUMNS.to_vec()
    }

    /// Serialize to the public schema. Unset fields become empty cells.
    pub fn to_fields(&self) -> Vec<String> {
        fn cell(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }
        vec![
            cell(&self.fcbh_id),
            cell(&self.name),
            cell(&self.vname),
            cell(&self.language),
            cell(&self.autonym),
            self.language_id.map(|v| v.to_string()).unwrap_or_default(),
            cell(&self.iso),
            cell(&self.publication_year),
            cell(&self.type_prod),
            cell(&self.size_prod),
            cell(&self.volume_prod),
            cell(&self.rights_holder_id),
            cell(&self.copyright_statement),
            cell(&self.publisher_id),
            cell(&self.chapter_ids),
            self.chapter_count.map(|v| v.to_string()).unwrap_or_default(),
            cell(&self.scripture_set_code),
            cell(&self.medium),
            cell(&self.mode),
            cell(&self.url),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_align_with_columns() {
        let product = CanonicalProduct::default();
        assert_eq!(product.to_fields().len(), OUTPUT_COLUMNS.len());
    }
}
