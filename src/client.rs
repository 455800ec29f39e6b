//! Digital Bible Platform v4 API client.
//!
//! The pipeline consumes four read-only endpoints:
//!
//! | Endpoint | Purpose |
//! |----------|---------|
//! | `GET /bibles?page=N` | Paginated catalog of bible editions |
//! | `GET /bibles/{abbr}/copyright` | Copyright statement + owning organizations |
//! | `GET /bibles/{abbr}` | Bible detail: publishers and table of contents |
//! | `GET /bibles/filesets/{id}` | Per-fileset book/chapter listing |
//!
//! Every request carries `v=4` and the API key from the configuration; the
//! key is threaded in explicitly — nothing here reads the process
//! environment. All calls are sequential blocking lookups from the
//! pipeline's point of view: one request per page or per row, no batching,
//! no retry.
//!
//! [`CatalogApi`] is the seam for tests: the enrichment orchestrator only
//! sees the trait, so integration tests drive the full pipeline against an
//! in-memory fake.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::ApiConfig;

/// One bible edition as returned by the catalog listing.
#[derive(Debug, Clone, Deserialize)]
pub struct BibleRecord {
    pub abbr: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vname: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub autonym: Option<String>,
    #[serde(default)]
    pub language_id: Option<i64>,
    #[serde(default)]
    pub iso: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub date: Option<String>,
    /// Fileset buckets keyed by asset store, e.g. `dbp-prod` and `dbp-vid`.
    #[serde(default)]
    pub filesets: HashMap<String, Vec<Fileset>>,
}

/// A single downloadable production asset belonging to a bible edition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fileset {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub fileset_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub stock_no: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub volume: Option<String>,
    #[serde(default)]
    pub bitrate: Option<String>,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
}

/// One page of the catalog listing.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub records: Vec<BibleRecord>,
    pub last_page: u32,
}

/// An organization reference (copyright owner or publisher).
#[derive(Debug, Clone, Deserialize)]
pub struct OrgRecord {
    #[serde(deserialize_with = "de_string")]
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// One copyright entry for a bible edition.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyrightEntry {
    #[serde(default)]
    pub copyright: Option<CopyrightBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopyrightBlock {
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub organizations: Vec<OrgRecord>,
}

/// Bible detail: publishers and the nested table of contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BibleDetail {
    #[serde(default)]
    pub publishers: Vec<OrgRecord>,
    #[serde(default)]
    pub books: Vec<Book>,
}

/// One book of a bible's table of contents.
#[derive(Debug, Clone, Deserialize)]
pub struct Book {
    pub book_id: String,
    #[serde(default)]
    pub chapters: Vec<u32>,
}

/// One entry of a fileset's book/chapter listing.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesetChapter {
    pub book_id: String,
    #[serde(default)]
    pub chapter_start: Option<u32>,
}

/// Read-only catalog API contract consumed by the pipeline.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of the bible catalog (1-based).
    async fn fetch_catalog_page(&self, page: u32) -> Result<CatalogPage>;

    /// Copyright entries (statement + organizations) for an abbreviation.
    async fn fetch_copyright(&self, abbr: &str) -> Result<Vec<CopyrightEntry>>;

    /// Bible detail (publishers, table of contents) for an abbreviation.
    async fn fetch_bible(&self, abbr: &str) -> Result<BibleDetail>;

    /// Book/chapter listing for a fileset id.
    async fn fetch_fileset_chapters(&self, fileset_id: &str) -> Result<Vec<FilesetChapter>>;
}

/// HTTP implementation of [`CatalogApi`] against the DBP v4 API.
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

impl HttpCatalogClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key: config.key().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}?v=4&key={}", self.base_url, path, self.key)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("request failed: {}", redact_key(url)))?;
        let response = response
            .error_for_status()
            .with_context(|| format!("request rejected: {}", redact_key(url)))?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("malformed response body: {}", redact_key(url)))
    }
}

/// Strip the API key query parameter from a URL before it reaches logs or
/// error messages.
fn redact_key(url: &str) -> String {
    match url.split_once("key=") {
        Some((head, _)) => format!("{}key=***", head),
        None => url.to_string(),
    }
}

#[derive(Deserialize)]
struct PageEnvelope {
    #[serde(default)]
    data: Vec<BibleRecord>,
    meta: PageMeta,
}

#[derive(Deserialize)]
struct PageMeta {
    pagination: Pagination,
}

#[derive(Deserialize)]
struct Pagination {
    last_page: u32,
}

#[derive(Deserialize)]
struct DetailEnvelope {
    #[serde(default)]
    data: BibleDetail,
}

#[derive(Deserialize)]
struct FilesetEnvelope {
    #[serde(default)]
    data: Vec<FilesetChapter>,
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn fetch_catalog_page(&self, page: u32) -> Result<CatalogPage> {
        let url = format!("{}&page={}", self.url("/bibles"), page);
        let envelope: PageEnvelope = self.get_json(&url).await?;
        Ok(CatalogPage {
            records: envelope.data,
            last_page: envelope.meta.pagination.last_page,
        })
    }

    async fn fetch_copyright(&self, abbr: &str) -> Result<Vec<CopyrightEntry>> {
        let url = self.url(&format!("/bibles/{}/copyright", abbr));
        self.get_json(&url).await
    }

    async fn fetch_bible(&self, abbr: &str) -> Result<BibleDetail> {
        let url = self.url(&format!("/bibles/{}", abbr));
        let envelope: DetailEnvelope = self.get_json(&url).await?;
        Ok(envelope.data)
    }

    async fn fetch_fileset_chapters(&self, fileset_id: &str) -> Result<Vec<FilesetChapter>> {
        let url = self.url(&format!("/bibles/filesets/{}", fileset_id));
        let envelope: FilesetEnvelope = self.get_json(&url).await?;
        Ok(envelope.data)
    }
}

/// Accept string or numeric JSON values as an optional string. The API is
/// inconsistent about publication dates and volume fields.
fn de_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Accept string or numeric JSON values as a string (organization ids are
/// numeric in some payloads).
fn de_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bible_record_parses_numeric_date() {
        let record: BibleRecord = serde_json::from_str(
            r#"{"abbr":"ENGESV","name":"English Standard Version","date":2001,
                "filesets":{"dbp-prod":[{"id":"ENGESVN2DA","type":"audio","size":"NT"}]}}"#,
        )
        .unwrap();
        assert_eq!(record.date.as_deref(), Some("2001"));
        assert_eq!(record.filesets["dbp-prod"].len(), 1);
    }

    #[test]
    fn org_record_parses_numeric_id() {
        let org: OrgRecord = serde_json::from_str(r#"{"id":12,"slug":"crossway"}"#).unwrap();
        assert_eq!(org.id, "12");
    }

    #[test]
    fn page_envelope_parses() {
        let envelope: PageEnvelope = serde_json::from_str(
            r#"{"data":[{"abbr":"ENGESV"}],"meta":{"pagination":{"last_page":7}}}"#,
        )
        .unwrap();
        assert_eq!(envelope.meta.pagination.last_page, 7);
        assert_eq!(envelope.data.len(), 1);
    }

    #[test]
    fn key_redacted_from_errors() {
        assert_eq!(
            redact_key("https://4.dbt.io/api/bibles?v=4&key=secret"),
            "https://4.dbt.io/api/bibles?v=4&key=***"
        );
    }
}
