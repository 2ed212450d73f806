//! Guess normalization and title matching.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonical comparison form of a title or guess.
///
/// Decomposes to NFD, drops combining marks, lower-cases and keeps only `[a-z0-9]`.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

pub fn is_match(guess: &str, target: &str) -> bool {
    normalize(guess) == normalize(target)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn ignores_case_and_diacritics() {
        assert!(is_match("Amélie", "amelie"));
        assert!(is_match("The Matrix", "thematrix"));
        assert!(is_match("  LÉON : the professional ", "Léon: The Professional"));
        assert!(!is_match("Up", "Down"));
    }

    #[test]
    fn strips_punctuation_and_whitespace() {
        assert_eq!(normalize("Spider-Man: No Way Home"), "spidermannowayhome");
        assert_eq!(normalize("2001 : l'Odyssée de l'espace"), "2001lodysseedelespace");
    }

    #[test]
    fn non_latin_titles_normalize_to_empty() {
        assert_eq!(normalize("千と千尋の神隠し"), "");
    }

    #[test]
    fn uppercase_accented_letters_lose_their_marks() {
        assert_eq!(normalize("ÉÀÜÇ"), "eauc");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn normalized_output_is_ascii_alphanumeric(s in "\\PC*") {
            prop_assert!(normalize(&s)
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }

        #[test]
        fn match_is_case_insensitive(s in "[a-zA-Z0-9 ]{0,24}") {
            prop_assert!(is_match(&s.to_uppercase(), &s.to_lowercase()));
        }
    }
}
