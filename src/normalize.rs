//! Name canonicalization for fuzzy comparison.
//!
//! Product display names carry publication years, punctuation, and filler
//! words that organization slugs do not. [`normalize`] strips all of that so
//! the matcher compares only the distinctive remainder. "Wycliffe Bible
//! Translators, Inc. 1998" and "wycliffe-bible-translators" normalize to the
//! same string.

/// ASCII punctuation stripped from names before comparison.
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// English stop-word tokens removed after lowercasing. Sorted for binary
/// search.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "couldn", "d", "did", "didn", "do", "does", "doesn", "doing",
    "don", "down", "during", "each", "few", "for", "from", "further", "had", "hadn", "has",
    "hasn", "have", "haven", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "i", "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "ll", "m",
    "ma", "me", "mightn", "more", "most", "mustn", "my", "myself", "needn", "no", "nor", "not",
    "now", "o", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves",
    "out", "over", "own", "re", "s", "same", "shan", "she", "should", "shouldn", "so", "some",
    "such", "t", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "ve",
    "very", "was", "wasn", "we", "were", "weren", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "won", "wouldn", "y", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Canonicalize a free-text name for comparison.
///
/// Removes digits and punctuation, lowercases, drops stop-word tokens, and
/// concatenates what remains. Deterministic and idempotent; an empty input
/// yields an empty output.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_numeric() && !PUNCTUATION.contains(*c))
        .collect();
    let lowered = stripped.to_lowercase();

    lowered
        .split_whitespace()
        .filter(|word| STOP_WORDS.binary_search(word).is_err())
        .collect::<Vec<_>>()
        .concat()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_sorted_for_binary_search() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
    }

    #[test]
    fn strips_digits_punctuation_and_case() {
        assert_eq!(
            normalize("Wycliffe Bible Translators, Inc. 1998"),
            "wycliffebibletranslatorsinc"
        );
    }

    #[test]
    fn slug_and_display_name_converge() {
        // Slugs are prettified to spaced title case before matching.
        assert_eq!(
            normalize("Wycliffe Bible Translators"),
            normalize("Wycliffe Bible Translators 2004"),
        );
    }

    #[test]
    fn removes_stop_words() {
        assert_eq!(normalize("The Bible of America"), "bibleamerica");
    }

    #[test]
    fn idempotent() {
        for input in ["", "The Word 2001", "faith & HOPE", "word-for-word"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("1984 ..."), "");
    }
}
