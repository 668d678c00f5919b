//! Text normalization applied before any pattern matching.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercase, collapse every run of `\r`/`\n` into one space, and trim.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;

    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
            continue;
        }
        in_break = false;
        out.extend(ch.to_lowercase());
    }

    let trimmed = out.trim();
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_string()
    }
}

/// Strip diacritics so accented and plain spellings compare equal (`blé` -> `ble`).
#[must_use]
pub fn fold_accents(text: &str) -> String {
    text.nfd().filter(|ch| !is_combining_mark(*ch)).collect()
}

/// Full matching form: [`normalize`] then [`fold_accents`].
#[must_use]
pub fn matching_form(text: &str) -> String {
    fold_accents(&normalize(text))
}
