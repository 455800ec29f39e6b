//! Organization entity resolution.
//!
//! Maps a free-text product name to a canonical organization id by comparing
//! the normalized name against every registry candidate with a
//! Ratcliff/Obershelp similarity ratio (2·matched / total length over
//! longest matching blocks).
//!
//! Matching policy: candidates are iterated in their supplied order and the
//! match is overwritten on every candidate exceeding the threshold, so the
//! **last** candidate above the threshold wins — not the best-scoring one.
//! Downstream consumers depend on this tie-break; do not "fix" it to
//! best-match without a schema migration.

use crate::models::OrganizationCandidate;
use crate::normalize::normalize;

/// Ratcliff/Obershelp similarity between two strings, in `[0, 1]`.
///
/// Finds the longest common block, recurses on the pieces to its left and
/// right, and returns `2 * matched / (len(a) + len(b))`. Two empty strings
/// are considered identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_len(&a, &b) as f64 / total as f64
}

/// Total length of all matching blocks between `a` and `b`.
fn matched_len(a: &[char], b: &[char]) -> usize {
    let (ai, bi, size) = longest_common_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matched_len(&a[..ai], &b[..bi]) + matched_len(&a[ai + size..], &b[bi + size..])
}

/// Longest common contiguous block, preferring the earliest start in `a`,
/// then the earliest start in `b`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0usize, 0usize, 0usize);
    let mut prev = vec![0usize; b.len() + 1];
    for (i, &ac) in a.iter().enumerate() {
        let mut cur = vec![0usize; b.len() + 1];
        for (j, &bc) in b.iter().enumerate() {
            if ac == bc {
                let len = prev[j] + 1;
                cur[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        prev = cur;
    }
    best
}

/// Resolve a product name against the organization registry.
///
/// Returns the id of the last candidate whose normalized slug scores above
/// `threshold` against the normalized product name, or `None` when no
/// candidate qualifies. Candidates with an empty normalized slug are
/// skipped.
pub fn resolve_organization<'a>(
    product_name: &str,
    candidates: &'a [OrganizationCandidate],
    threshold: f64,
) -> Option<&'a str> {
    let name = normalize(product_name);
    if name.is_empty() {
        return None;
    }

    let mut matched = None;
    for candidate in candidates {
        let slug = normalize(&candidate.slug);
        if slug.is_empty() {
            continue;
        }
        if similarity(&name, &slug) > threshold {
            // Last match above threshold wins; keep overwriting.
            matched = Some(candidate.id.as_str());
        }
    }
    matched
}

/// Parse a raw rights-holder field into its id list.
///
/// The API encodes multi-owner products as a brace-delimited list, e.g.
/// `"{12,34}"`. Empty segments are dropped.
pub fn parse_owner_ids(raw: &str) -> Vec<String> {
    raw.replace(['{', '}'], "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fallback rights-holder resolution for products the fuzzy matcher could
/// not place: a single listed owner is used directly, a multi-owner list
/// resolves to its last entry.
pub fn fallback_rights_holder(raw: &str) -> Option<String> {
    parse_owner_ids(raw).pop()
}
