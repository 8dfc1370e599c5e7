//! Text normalization for bilingual keyword matching.
//!
//! ## Summary
//! Produces comparable forms of English and Arabic free text: lowercase,
//! Arabic diacritics removed, alef/yeh/teh-marbuta variants folded, and
//! punctuation collapsed to single spaces.

use std::collections::BTreeSet;

/// Arabic harakat and tatweel, dropped before matching.
fn is_arabic_mark(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{0652}' | '\u{0670}' | '\u{0640}')
}

fn fold_arabic_letter(c: char) -> char {
    match c {
        'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
        'ى' => 'ي',
        'ة' => 'ه',
        other => other,
    }
}

/// Normalize text for substring matching.
///
/// Examples:
/// - "Urgent: MOU Signing!" -> "urgent mou signing"
/// - "مذكرة  التفاهم" -> "مذكره التفاهم"
#[must_use]
pub fn normalize_for_matching(text: &str) -> String {
    text.chars()
        .filter(|c| !is_arabic_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_alphanumeric() {
                fold_arabic_letter(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if the normalized form of `needle` occurs in `haystack`,
/// which must already be normalized.
#[must_use]
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    let needle = normalize_for_matching(needle);
    !needle.is_empty() && haystack.contains(&needle)
}

/// Split text into its set of normalized words.
#[must_use]
pub fn word_set(text: &str) -> BTreeSet<String> {
    normalize_for_matching(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of two word sets; 0.0 when both are empty.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}
