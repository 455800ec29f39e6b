//! End-to-end pipeline tests against an in-memory catalog API.
//!
//! Drives the full flow — catalog fetch, fileset fan-out, collaborator
//! gathering, enrichment, CSV export — with a fake [`CatalogApi`] so every
//! stage runs exactly as in production, minus the network.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use dbp_harvest::client::{
    BibleDetail, BibleRecord, CatalogApi, CatalogPage, CopyrightEntry, FilesetChapter,
};
use dbp_harvest::{enrich, export, ingest};

struct FakeApi {
    records: Vec<BibleRecord>,
    copyrights: HashMap<String, Vec<CopyrightEntry>>,
    bibles: HashMap<String, BibleDetail>,
    fileset_chapters: HashMap<String, Vec<FilesetChapter>>,
}

#[async_trait]
impl CatalogApi for FakeApi {
    async fn fetch_catalog_page(&self, page: u32) -> Result<CatalogPage> {
        if page != 1 {
            bail!("only one page in the fake catalog");
        }
        Ok(CatalogPage {
            records: self.records.clone(),
            last_page: 1,
        })
    }

    async fn fetch_copyright(&self, abbr: &str) -> Result<Vec<CopyrightEntry>> {
        match self.copyrights.get(abbr) {
            Some(entries) => Ok(entries.clone()),
            None => bail!("no copyright data for {}", abbr),
        }
    }

    async fn fetch_bible(&self, abbr: &str) -> Result<BibleDetail> {
        match self.bibles.get(abbr) {
            Some(detail) => Ok(detail.clone()),
            None => bail!("no bible detail for {}", abbr),
        }
    }

    async fn fetch_fileset_chapters(&self, fileset_id: &str) -> Result<Vec<FilesetChapter>> {
        match self.fileset_chapters.get(fileset_id) {
            Some(listing) => Ok(listing.clone()),
            None => bail!("chapter listing unavailable for {}", fileset_id),
        }
    }
}

fn nt_listing() -> Vec<FilesetChapter> {
    (1..=260)
        .map(|i| FilesetChapter {
            book_id: "MAT".to_string(),
            chapter_start: Some(i),
        })
        .collect()
}

fn fake_api() -> FakeApi {
    let alpha: BibleRecord = serde_json::from_str(
        r#"{
            "abbr": "ABCDEF",
            "name": "Alpha Bible 2001",
            "vname": "Alpha",
            "language": "English",
            "language_id": 17,
            "iso": "eng",
            "date": 2001,
            "filesets": {
                "dbp-prod": [
                    {"id": "ABCDEF", "type": "text_plain", "size": "C"},
                    {"id": "ABCDEFUSX", "type": "text_usx", "size": "C"},
                    {"id": "ABCDEFN2DA", "type": "audio_stream", "size": "NT", "bitrate": "64kbps"}
                ],
                "dbp-vid": [
                    {"id": "VABCDE12SE", "type": "video_stream", "size": "NTP"}
                ]
            }
        }"#,
    )
    .unwrap();

    let beta: BibleRecord = serde_json::from_str(
        r#"{
            "abbr": "GHIJKL",
            "name": "Beta Society",
            "iso": "deu",
            "date": "1999",
            "filesets": {
                "dbp-prod": [
                    {"id": "GHIJKLN1DA", "type": "audio_drama_stream", "size": "NT"}
                ]
            }
        }"#,
    )
    .unwrap();

    let mut copyrights = HashMap::new();
    copyrights.insert(
        "ABCDEF".to_string(),
        serde_json::from_str::<Vec<CopyrightEntry>>(
            r#"[{"copyright": {
                "copyright": "© 2001 Alpha Org",
                "organizations": [
                    {"id": 12, "slug": "alpha-org"},
                    {"id": 34, "slug": "delta-press"}
                ]}}]"#,
        )
        .unwrap(),
    );
    copyrights.insert(
        "GHIJKL".to_string(),
        serde_json::from_str::<Vec<CopyrightEntry>>(
            r#"[{"copyright": {
                "copyright": "© 1999 Beta Society",
                "organizations": [{"id": 55, "slug": "beta-society"}]}}]"#,
        )
        .unwrap(),
    );

    let mut bibles = HashMap::new();
    bibles.insert(
        "ABCDEF".to_string(),
        serde_json::from_str::<BibleDetail>(
            r#"{
                "publishers": [{"id": 90, "slug": "gamma-publishing"}],
                "books": [{"book_id": "GEN", "chapters": [0, 1, 2]}]
            }"#,
        )
        .unwrap(),
    );
    // GHIJKL bible detail is absent: its publisher lookup fails and is
    // skipped.

    let mut fileset_chapters = HashMap::new();
    fileset_chapters.insert("ABCDEFN2DA".to_string(), nt_listing());
    fileset_chapters.insert(
        "VABCDE12SE".to_string(),
        vec![FilesetChapter {
            book_id: "MRK".to_string(),
            chapter_start: Some(1),
        }],
    );
    // GHIJKLN1DA chapter listing is absent: that row stays unclassified.

    FakeApi {
        records: vec![alpha, beta],
        copyrights,
        bibles,
        fileset_chapters,
    }
}

async fn run_pipeline(api: &FakeApi) -> (enrich::Enrichment, ingest::CollaboratorTables) {
    let rows = ingest::fetch_catalog(api, None).await.unwrap();
    let abbrs = ingest::unique_abbrs(&rows);
    let tables = ingest::fetch_collaborators(api, &abbrs).await;
    let enrichment = enrich::enrich(api, rows, &tables, 0.9).await.unwrap();
    (enrichment, tables)
}

#[tokio::test]
async fn full_pipeline_produces_expected_table() {
    let api = fake_api();
    let (enrichment, tables) = run_pipeline(&api).await;

    // ABCDEF text + ABCDEF audio + GHIJKL audio_drama + VABCDE video.
    // The text_usx variant lost to text_plain; video-typed source rows
    // never appear directly.
    assert_eq!(enrichment.products.len(), 4);
    let abbrs: Vec<_> = enrichment.products.iter().map(|p| p.abbr.as_str()).collect();
    assert_eq!(abbrs, vec!["ABCDEF", "ABCDEF", "GHIJKL", "VABCDE"]);

    let text = enrichment
        .products
        .iter()
        .find(|p| p.type_prod.as_deref() == Some("text"))
        .unwrap();
    // Table-of-contents path: 2 chapters, size code C decides coverage.
    assert_eq!(text.chapter_ids.as_deref(), Some("GEN001, GEN002"));
    assert_eq!(text.chapter_count, Some(2));
    assert_eq!(text.scripture_set_code.as_deref(), Some("BIB COMPLETE"));
    assert_eq!(text.medium.as_deref(), Some("DIGITAL"));
    assert_eq!(text.mode.as_deref(), Some("TE"));
    assert_eq!(text.publication_year.as_deref(), Some("2001"));
    assert_eq!(text.url.as_deref(), Some("https://live.bible.is/bible/ABCDEF"));
    // Fuzzy match fails for "Alpha Bible 2001"; fallback takes the last
    // listed owner.
    assert_eq!(text.rights_holder_id.as_deref(), Some("34"));
    assert_eq!(text.copyright_statement.as_deref(), Some("© 2001 Alpha Org"));
    assert_eq!(text.publisher_id.as_deref(), Some("90"));

    let audio = enrichment
        .products
        .iter()
        .find(|p| p.type_prod.as_deref() == Some("audio"))
        .unwrap();
    assert_eq!(audio.chapter_count, Some(260));
    assert_eq!(audio.scripture_set_code.as_deref(), Some("NEW COMPLETE"));
    assert_eq!(audio.mode.as_deref(), Some("AU"));

    // "Beta Society" matches the beta-society registry slug directly.
    let drama = enrichment
        .products
        .iter()
        .find(|p| p.abbr == "GHIJKL")
        .unwrap();
    assert_eq!(drama.rights_holder_id.as_deref(), Some("55"));
    assert_eq!(drama.type_prod.as_deref(), Some("audio_drama"));
    // Its chapter lookup failed: chapter and coverage fields stay unset,
    // everything else is populated.
    assert!(drama.chapter_count.is_none());
    assert!(drama.scripture_set_code.is_none());
    assert_eq!(drama.copyright_statement.as_deref(), Some("© 1999 Beta Society"));

    let video = enrichment
        .products
        .iter()
        .find(|p| p.abbr == "VABCDE")
        .unwrap();
    assert_eq!(video.fcbh_id.as_deref(), Some("VABCDE12SE"));
    assert_eq!(video.type_prod.as_deref(), Some("video"));
    assert_eq!(video.medium.as_deref(), Some("DIGITAL"));
    assert_eq!(video.mode.as_deref(), Some("VI"));
    assert_eq!(video.chapter_count, Some(1));
    assert_eq!(video.scripture_set_code.as_deref(), Some("NT SELECT"));

    assert_eq!(enrichment.stats.chapter_failures, 1);
    assert_eq!(enrichment.stats.video_products, 1);
    // GHIJKL's missing bible detail is a collaborator skip, not a failure.
    assert_eq!(tables.lookup_failures, 1);

    // Registry: first copyright org per bible plus publishers, slugs
    // prettified.
    let slugs: Vec<_> = tables.registry.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, vec!["Alpha Org", "Gamma Publishing", "Beta Society"]);
}

#[tokio::test]
async fn pipeline_is_deterministic() {
    let api = fake_api();
    let dir = tempfile::tempdir().unwrap();

    let mut outputs = Vec::new();
    for run in 0..2 {
        let (enrichment, tables) = run_pipeline(&api).await;
        let products = dir.path().join(format!("products-{}.csv", run));
        let orgs = dir.path().join(format!("orgs-{}.csv", run));
        export::write_products(&products, &enrichment.products, "08-25-2026").unwrap();
        export::write_organizations(&orgs, &tables.registry).unwrap();
        outputs.push((
            std::fs::read(&products).unwrap(),
            std::fs::read(&orgs).unwrap(),
        ));
    }

    assert_eq!(outputs[0].0, outputs[1].0);
    assert_eq!(outputs[0].1, outputs[1].1);
}
