// crates/geoimport-core/src/text.rs
//! Derived text fields computed during PARSE (slug, ASCII name) and
//! accent-insensitive name comparison.

/// Convert a string into a folded key suitable for comparison.
///
/// Transliterates Unicode to ASCII with `deunicode`, then lowercases.
///
/// ```rust
/// use geoimport_core::text::fold_key;
///
/// assert_eq!(fold_key("Łódź"), "lodz");
/// assert_eq!(fold_key("Straße"), "strasse");
/// ```
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Equality on the folded form of both strings.
pub fn equals_folded(a: &str, b: &str) -> bool {
    fold_key(a) == fold_key(b)
}

/// ASCII rendition of a name. Keeps an existing ASCII name from the
/// source when there is one.
pub fn ascii_name(source_ascii: &str, name: &str) -> String {
    if !source_ascii.is_empty() {
        source_ascii.to_owned()
    } else {
        deunicode::deunicode(name)
    }
}

/// URL-safe slug: folded, alphanumeric runs joined by `-`.
///
/// ```rust
/// use geoimport_core::text::slugify;
///
/// assert_eq!(slugify("Île-de-France"), "ile-de-france");
/// assert_eq!(slugify("  Saint   Étienne "), "saint-etienne");
/// ```
pub fn slugify(s: &str) -> String {
    let folded = fold_key(s);
    let mut out = String::with_capacity(folded.len());
    let mut pending_dash = false;
    for ch in folded.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// True for names made only of ASCII digits (e.g. "75001").
pub fn is_numeric_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slugify("Provence-Alpes-Côte d'Azur"), "provence-alpes-cote-d-azur");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn ascii_name_prefers_source_column() {
        assert_eq!(ascii_name("Zurich", "Zürich"), "Zurich");
        assert_eq!(ascii_name("", "Zürich"), "Zurich");
    }

    #[test]
    fn folded_equality() {
        assert!(equals_folded("MÜNCHEN", "munchen"));
        assert!(!equals_folded("Berlin", "Paris"));
    }

    #[test]
    fn numeric_names() {
        assert!(is_numeric_name("75001"));
        assert!(!is_numeric_name("7500A"));
        assert!(!is_numeric_name(""));
    }
}
