//! Slug derivation: lowercase, diacritics folded to ASCII, punctuation
//! collapsed to single hyphens. Idempotent on already-slug-shaped input.

/// Fold the common Latin diacritics to their ASCII base letter.
/// Anything outside the table (and outside ASCII) is dropped by `slugify`.
fn fold_diacritic(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ñ' | 'ń' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => "o",
        'œ' => "oe",
        'ß' => "ss",
        'ś' | 'š' => "s",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Derive a URL-safe slug from a title.
///
/// Runs of non-alphanumeric characters become a single hyphen; leading and
/// trailing hyphens are trimmed. Matches the pattern `[a-z0-9]+(-[a-z0-9]+)*`
/// for any non-empty result.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        let lower = c.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(lower);
        } else if let Some(folded) = fold_diacritic(c.to_lowercase().next().unwrap_or(c)) {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push_str(folded);
        } else {
            pending_hyphen = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_idempotent_on_slug_shaped_input() {
        assert_eq!(slugify("hello-world"), "hello-world");
        assert_eq!(slugify(&slugify("My First Post!")), slugify("My First Post!"));
    }

    #[test]
    fn test_punctuation_collapses_to_single_hyphen() {
        assert_eq!(slugify("Rust: async & await, part 2"), "rust-async-await-part-2");
    }

    #[test]
    fn test_diacritics_folded() {
        assert_eq!(slugify("Café Déjà Vu"), "cafe-deja-vu");
        assert_eq!(slugify("Straße"), "strasse");
    }

    #[test]
    fn test_leading_trailing_punctuation_trimmed() {
        assert_eq!(slugify("  --Hello--  "), "hello");
    }

    #[test]
    fn test_non_latin_characters_dropped() {
        assert_eq!(slugify("日本語 post"), "post");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
