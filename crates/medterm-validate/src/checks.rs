//! The three translation checks shared by [`validate`](crate::Validator::validate)
//! and [`suggest_improvements`](crate::Validator::suggest_improvements).

use medterm_core::TermStore;

/// Base letters that exist in Vietnamese only as diacritic carriers.
const BASE_LETTERS: &str = "ăâđêôơư";

/// Vietnamese letters carrying a tone mark.
const TONE_MARKED: &str =
    "àáảãạắằẳẵặấầẩẫậèéẻẽẹếềểễệìíỉĩịòóỏõọốồổỗộớờởỡợùúủũụứừửữựỳýỷỹỵ";

/// Every Vietnamese diacritic letter, lower-case.
const VIETNAMESE_LETTERS: &str =
    "àáảãạăắằẳẵặâấầẩẫậèéẻẽẹêếềểễệìíỉĩịòóỏõọôốồổỗộơớờởỡợùúủũụưứừửữựỳýỷỹỵđ";

/// Returns the stored current translation when `english` is known and its
/// translation differs (case-insensitively) from the proposed one.
pub fn established_conflict(
    store: &TermStore,
    english: &str,
    vietnamese: &str,
) -> Option<String> {
    store
        .get(english)
        .filter(|record| record.vietnamese.to_lowercase() != vietnamese.to_lowercase())
        .map(|record| record.vietnamese.clone())
}

/// Heuristic: text looks Vietnamese (contains a bare base letter such as
/// ă or đ) but carries no tone-marked letter anywhere.
///
/// Known-imprecise by design: words legitimately spelled with only bare base
/// letters ("đau") false-positive, and ASCII-only text that should have had
/// diacritics is never caught.
pub fn missing_diacritics(text: &str) -> bool {
    let lower = text.to_lowercase();
    let has_base = lower.chars().any(|c| BASE_LETTERS.contains(c));
    let has_tone = lower.chars().any(|c| TONE_MARKED.contains(c));
    has_base && !has_tone
}

/// Formatting rules: non-empty, no surrounding whitespace, no double space,
/// and every character within the term whitelist (ASCII alphanumerics,
/// Vietnamese letters, whitespace, hyphen, period, comma, parentheses).
pub fn well_formatted(text: &str) -> bool {
    if text.is_empty() || text != text.trim() || text.contains("  ") {
        return false;
    }
    text.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || c.is_whitespace()
            || "-.,()".contains(c)
            || c.to_lowercase().all(|lc| VIETNAMESE_LETTERS.contains(lc))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_diacritics_flags_bare_base_letters() {
        assert!(missing_diacritics("đau bung"));
        assert!(missing_diacritics("căng thang"));
    }

    #[test]
    fn missing_diacritics_accepts_tone_marked_text() {
        assert!(!missing_diacritics("đau bụng"));
        assert!(!missing_diacritics("sốt"));
    }

    #[test]
    fn missing_diacritics_ignores_plain_ascii() {
        // the heuristic cannot catch stripped-to-ascii text
        assert!(!missing_diacritics("dau bung"));
        assert!(!missing_diacritics("normal text"));
    }

    #[test]
    fn formatting_rejects_whitespace_misuse() {
        assert!(!well_formatted(""));
        assert!(!well_formatted(" sốt"));
        assert!(!well_formatted("sốt "));
        assert!(!well_formatted("double  space"));
    }

    #[test]
    fn formatting_rejects_characters_outside_the_whitelist() {
        assert!(!well_formatted("sốt @ cao"));
        assert!(!well_formatted("sốt/cao"));
    }

    #[test]
    fn formatting_accepts_vietnamese_and_allowed_punctuation() {
        assert!(well_formatted("nhồi máu cơ tim"));
        assert!(well_formatted("sốt (cao), mạn tính - độ 2."));
        assert!(well_formatted("SỐT CAO"));
        assert!(well_formatted("normal text"));
    }
}
