//! URL slugs for study sessions.

/// Used when a name has no ASCII letters or digits left after cleaning.
pub const FALLBACK_SLUG: &str = "session";

/// Turns a session name into a lowercase, dash-separated slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let c = match c {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'à' | 'â' | 'ä' => 'a',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'û' | 'ü' | 'ù' => 'u',
            'ç' => 'c',
            other => other,
        };

        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Returns `base` when free, otherwise `base-1`, `base-2`, ... whichever is
/// the first one not in `taken`.
pub fn unique_slug<S: AsRef<str>>(base: &str, taken: &[S]) -> String {
    let is_taken = |candidate: &str| taken.iter().any(|t| t.as_ref() == candidate);

    if !is_taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_dashes_words() {
        assert_eq!(slugify("Hiloula Rabbi Shimon"), "hiloula-rabbi-shimon");
    }

    #[test]
    fn transliterates_french_accents() {
        assert_eq!(slugify("Léilouï Nichmat Françoise"), "leiloui-nichmat-francoise");
    }

    #[test]
    fn drops_punctuation_and_collapses_separators() {
        assert_eq!(slugify("  Siyoum -- Shas! (5785)  "), "siyoum-shas-5785");
        assert_eq!(slugify("Re'eh"), "reeh");
        assert_eq!(slugify("a_b"), "a-b");
    }

    #[test]
    fn falls_back_when_nothing_survives() {
        assert_eq!(slugify("תהילים"), FALLBACK_SLUG);
        assert_eq!(slugify("!!!"), FALLBACK_SLUG);
    }

    #[test]
    fn keeps_free_base() {
        let taken: [&str; 0] = [];
        assert_eq!(unique_slug("shas", &taken), "shas");
        assert_eq!(unique_slug("shas", &["shas-1"]), "shas");
    }

    #[test]
    fn suffixes_on_collision() {
        assert_eq!(unique_slug("shas", &["shas"]), "shas-1");
        assert_eq!(unique_slug("shas", &["shas", "shas-1", "shas-3"]), "shas-2");
    }
}
