//! CSV emission for the warehouse tables.
//!
//! Writes the product catalog (`CompletedProductFCBH.csv`) and the
//! organization registry (`OrganizationFCBH.csv`) with CRLF line endings.
//! The product table carries the fixed 20-column public schema plus a
//! `SourceDate` column stamped at write time; a structural check rejects
//! any run whose column set or count drifted from the published schema.

use anyhow::{Context, Result};
use std::path::Path;

use crate::error::StructuralError;
use crate::models::{CanonicalProduct, OrganizationCandidate, OUTPUT_COLUMNS};

pub const PRODUCTS_FILE: &str = "CompletedProductFCBH.csv";
pub const ORGANIZATIONS_FILE: &str = "OrganizationFCBH.csv";

/// SourceDate format, e.g. `08-25-2026`.
pub const SOURCE_DATE_FORMAT: &str = "%m-%d-%Y";

/// Verify the outgoing column set against the published schema.
///
/// Both the count and the (order-insensitive) column set must match;
/// anything else means an upstream field change leaked through and the run
/// must abort rather than ship a malformed table.
pub fn verify_schema(columns: &[&str]) -> Result<(), StructuralError> {
    if columns.len() != OUTPUT_COLUMNS.len() {
        return Err(StructuralError::SchemaMismatch {
            expected: OUTPUT_COLUMNS.len(),
            found: columns.len(),
            detail: "column count changed".to_string(),
        });
    }
    let mut expected: Vec<&str> = OUTPUT_COLUMNS.to_vec();
    let mut found: Vec<&str> = columns.to_vec();
    expected.sort_unstable();
    found.sort_unstable();
    if expected != found {
        return Err(StructuralError::SchemaMismatch {
            expected: OUTPUT_COLUMNS.len(),
            found: columns.len(),
            detail: format!(
                "column headers changed: expected {:?}, found {:?}",
                expected, found
            ),
        });
    }
    Ok(())
}

/// Write the canonical product table, stamping `source_date` onto every
/// row.
pub fn write_products(
    path: &Path,
    products: &[CanonicalProduct],
    source_date: &str,
) -> Result<()> {
    let columns = CanonicalProduct::columns();
    verify_schema(&columns)?;

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut header: Vec<&str> = columns;
    header.push("SourceDate");
    writer.write_record(&header)?;

    for product in products {
        let mut fields = product.to_fields();
        fields.push(source_date.to_string());
        writer.write_record(&fields)?;
    }

    writer.flush().context("Failed to flush product CSV")?;
    Ok(())
}

/// Write the organization registry table.
pub fn write_organizations(path: &Path, registry: &[OrganizationCandidate]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(["id", "slug"])?;
    for org in registry {
        writer.write_record([org.id.as_str(), org.slug.as_str()])?;
    }

    writer.flush().context("Failed to flush organization CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_check_accepts_published_columns() {
        assert!(verify_schema(&CanonicalProduct::columns()).is_ok());
    }

    #[test]
    fn schema_check_rejects_missing_column() {
        let mut columns = CanonicalProduct::columns();
        columns.pop();
        assert!(matches!(
            verify_schema(&columns),
            Err(StructuralError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn schema_check_rejects_renamed_column() {
        let mut columns = CanonicalProduct::columns();
        columns[0] = "RenamedId";
        assert!(matches!(
            verify_schema(&columns),
            Err(StructuralError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn products_csv_written_with_source_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PRODUCTS_FILE);

        let product = CanonicalProduct {
            abbr: "ABC".to_string(),
            fcbh_id: Some("ABCNT2DA".to_string()),
            scripture_set_code: Some("NEW COMPLETE".to_string()),
            ..Default::default()
        };
        write_products(&path, &[product], "08-25-2026").unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let mut lines = body.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("FCBHId,"));
        assert!(header.ends_with(",SourceDate"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("ABCNT2DA,"));
        assert!(row.ends_with(",08-25-2026"));
        assert!(body.contains("\r\n"));
    }

    #[test]
    fn organizations_csv_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ORGANIZATIONS_FILE);

        let registry = vec![OrganizationCandidate {
            id: "12".to_string(),
            slug: "Wycliffe Bible Translators".to_string(),
        }];
        write_organizations(&path, &registry).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("id,slug"));
        assert!(body.contains("12,Wycliffe Bible Translators"));
    }
}
