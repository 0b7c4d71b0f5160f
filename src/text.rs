//! Team and fixture name helpers.
//!
//! Canonicalization here is a heuristic for matching fixtures across
//! data sources; it has no bearing on the consensus numbers.

use unicode_normalization::UnicodeNormalization;

/// Canonical form for fuzzy equality: compatibility-decomposed, ASCII
/// only, lower-cased, punctuation turned into spaces, whitespace
/// collapsed. "Atlético Madrid" → "atletico madrid".
pub fn normalize_text(value: &str) -> String {
    let cleaned: String = value
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
        .map(|c| if c.is_ascii_alphanumeric() || c.is_ascii_whitespace() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Abbreviated team code, e.g. "Manchester United" → "MU".
///
/// Initials of every word except "and" (at most four); a single word
/// falls back to its first three letters.
pub fn short_team_code(value: &str) -> String {
    if value.is_empty() {
        return "?".to_string();
    }

    let normalized = normalize_text(value);
    if normalized.is_empty() {
        let cleaned: String = value.to_uppercase().chars().filter(|c| *c != ' ').collect();
        return first_chars(&cleaned, 3).unwrap_or_else(|| "?".to_string());
    }

    let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty() && *w != "and").collect();
    if words.is_empty() {
        let cleaned = normalized.replace(' ', "");
        return first_chars(&cleaned.to_uppercase(), 3).unwrap_or_else(|| "?".to_string());
    }

    let initials: String = words.iter().filter_map(|w| w.chars().next()).collect();
    if initials.chars().count() >= 2 {
        return initials.to_uppercase().chars().take(4).collect();
    }

    let joined = words.concat();
    first_chars(&joined.to_uppercase(), 3)
        .unwrap_or_else(|| value.chars().take(3).collect::<String>().to_uppercase())
}

fn first_chars(s: &str, n: usize) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.chars().take(n).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_diacritics_and_punctuation() {
        assert_eq!(normalize_text("Atlético Madrid"), "atletico madrid");
        assert_eq!(normalize_text("  Borussia   Mönchengladbach "), "borussia monchengladbach");
        assert_eq!(normalize_text("Brighton & Hove Albion"), "brighton hove albion");
        assert_eq!(normalize_text("Will Arsenal beat Chelsea?"), "will arsenal beat chelsea");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("!!!"), "");
    }

    #[test]
    fn test_short_code_initials() {
        assert_eq!(short_team_code("Manchester United"), "MU");
        assert_eq!(short_team_code("Brighton and Hove Albion"), "BHA");
        assert_eq!(short_team_code("Real Sociedad de Futbol SAD"), "RSDF");
    }

    #[test]
    fn test_short_code_single_word() {
        assert_eq!(short_team_code("Arsenal"), "ARS");
        assert_eq!(short_team_code("Çorum"), "COR");
    }

    #[test]
    fn test_short_code_fallbacks() {
        assert_eq!(short_team_code(""), "?");
        assert_eq!(short_team_code("???"), "???");
        assert_eq!(short_team_code("and"), "AND");
    }
}
