//! Text-to-filename normalization for pronunciation lookup.
//!
//! Audio assets and cache entries are addressed by the normalized form of an
//! item's canonical text: lowercase, Kurmanji diacritics folded to their
//! plain-ASCII base letter, punctuation stripped, whitespace collapsed to
//! single hyphens. The transform is deliberately lossy and idempotent.

/// Normalize canonical text into a lookup key.
///
/// `normalize("Sêv")` and `normalize("sêv")` both yield `"sev"`;
/// `normalize("Ez têm malê")` yields `"ez-tem-male"`.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        let folded = fold_diacritic(c);
        if folded.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(folded);
        } else if folded.is_whitespace() || folded == '-' {
            pending_separator = true;
        }
        // Anything else (punctuation, unfoldable symbols) is dropped.
    }

    out
}

/// Fold a single character to its base Latin letter.
///
/// Covers the Kurmanji long vowels and cedilla consonants first, then the
/// common Latin-1 accents so mixed or borrowed spellings degrade sanely.
fn fold_diacritic(c: char) -> char {
    match c {
        'ê' => 'e',
        'î' => 'i',
        'û' => 'u',
        'ç' => 'c',
        'ş' | 'ș' => 's',
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' => 'e',
        'í' | 'ì' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' => 'u',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
