use anyhow::Result;

use crate::client::CatalogApi;

/// Probe the catalog endpoints and print a health table. The catalog
/// listing is the only endpoint a run cannot start without; the copyright
/// probe uses a well-known abbreviation and failure there is advisory.
pub async fn list_sources(api: &dyn CatalogApi) -> Result<()> {
    let catalog = match api.fetch_catalog_page(1).await {
        Ok(page) => (format!("OK ({} pages)", page.last_page), true),
        Err(e) => (format!("UNREACHABLE ({})", e), false),
    };

    let copyright = match api.fetch_copyright("ENGESV").await {
        Ok(_) => ("OK".to_string(), true),
        Err(e) => (format!("UNREACHABLE ({})", e), false),
    };

    println!("{:<24} {:<32} HEALTHY", "ENDPOINT", "STATUS");
    println!("{:<24} {:<32} {}", "catalog", catalog.0, catalog.1);
    println!("{:<24} {:<32} {}", "copyright", copyright.0, copyright.1);

    Ok(())
}
