//! Chapter coverage classification.
//!
//! A product's coverage code summarizes how much of the scripture canon it
//! contains. The classifier works from the resolved chapter count when that
//! count pins the product to a known canon size, and otherwise falls back to
//! the raw size code supplied by the catalog.
//!
//! Chapter identifiers are `<3-char book code><zero-padded 3-digit chapter>`,
//! e.g. `MAT001`. A chapter-start of 0 is the front-matter sentinel and is
//! never counted.

use crate::client::{Book, FilesetChapter};

/// Canon sizes recognized by the count-based rule.
const NT_CHAPTERS: u32 = 260;
const BIBLE_CHAPTERS: u32 = 1189;

/// Classify a product's scripture coverage.
///
/// The chapter count wins when it matches a known canon size; otherwise the
/// raw size code decides. Unknown codes yield the literal `"NULL"`.
pub fn classify(chapter_count: Option<u32>, size_code: Option<&str>) -> &'static str {
    match chapter_count {
        Some(NT_CHAPTERS) => return "NEW COMPLETE",
        Some(BIBLE_CHAPTERS) => return "BIB COMPLETE",
        Some(c) if c > BIBLE_CHAPTERS => return "BIB COMPLETE, DEC SELECT",
        _ => {}
    }
    match size_code.unwrap_or("") {
        "NTP" => "NT SELECT",
        "NT" => "NEW COMPLETE",
        "C" => "BIB COMPLETE",
        "NTPOTP" => "OT SELECT, NT SELECT",
        "NTOTP" => "OLD SELECT, NEW COMPLETE",
        "OTNTP" => "OLD COMPLETE, NEW COMPLETE",
        "OTP" => "OT SELECT",
        "OT" => "OLD COMPLETE",
        "P" => "SELECT",
        "S" => "BIB STORY",
        _ => "NULL",
    }
}

/// Medium and mode for a coalesced product type. Video-derived rows are
/// fixed to `(DIGITAL, VI)` at construction and never pass through here.
pub fn medium_mode(coalesced_type: &str) -> Option<(&'static str, &'static str)> {
    match coalesced_type {
        "text" => Some(("DIGITAL", "TE")),
        "audio" | "audio_drama" => Some(("DIGITAL", "AU")),
        _ => None,
    }
}

/// Format a canonical chapter identifier, e.g. `("MAT", 1)` → `MAT001`.
pub fn format_chapter_id(book_id: &str, chapter: u32) -> String {
    format!("{}{:03}", book_id, chapter)
}

/// Chapter identifiers from a fileset's book/chapter listing. The
/// chapter-start 0 sentinel is excluded.
pub fn chapter_set_from_fileset(listing: &[FilesetChapter]) -> Vec<String> {
    listing
        .iter()
        .filter_map(|c| match c.chapter_start {
            Some(0) | None => None,
            Some(start) => Some(format_chapter_id(&c.book_id, start)),
        })
        .collect()
}

/// Chapter identifiers from a bible's table of contents, flattening the
/// nested per-book chapter arrays. Chapter 0 entries are excluded.
pub fn chapter_set_from_books(books: &[Book]) -> Vec<String> {
    books
        .iter()
        .flat_map(|book| {
            book.chapters
                .iter()
                .filter(|&&ch| ch != 0)
                .map(|&ch| format_chapter_id(&book.book_id, ch))
        })
        .collect()
}
