//! "Did you mean" suggestions for misspelled type names

use crate::frontend::ast::Type;

/// Suggestions are only offered below this edit distance.
const MAX_DISTANCE: usize = 3;

/// Levenshtein edit distance between two strings (by characters)
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len() < b.len() {
        return levenshtein_chars(&b, &a);
    }
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(long: &[char], short: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=short.len()).collect();
    for (i, &c1) in long.iter().enumerate() {
        let mut current = Vec::with_capacity(short.len() + 1);
        current.push(i + 1);
        for (j, &c2) in short.iter().enumerate() {
            let insertion = previous[j + 1] + 1;
            let deletion = current[j] + 1;
            let substitution = previous[j] + usize::from(c1 != c2);
            current.push(insertion.min(deletion).min(substitution));
        }
        previous = current;
    }
    previous[short.len()]
}

/// Closest known type name, compared case-insensitively.
///
/// Ties go to the earlier entry of [`Type::ALL`].
pub fn closest_type(word: &str) -> Option<Type> {
    let word = word.to_lowercase();
    let mut best = None;
    let mut best_distance = MAX_DISTANCE;
    for ty in Type::ALL {
        let distance = levenshtein(&word, ty.name());
        if distance < best_distance {
            best_distance = distance;
            best = Some(ty);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("floot", "float"), 1);
        assert_eq!(levenshtein("strng", "string"), 1);
    }

    #[test]
    fn test_closest_type() {
        assert_eq!(closest_type("floot"), Some(Type::Float));
        assert_eq!(closest_type("Strng"), Some(Type::Str));
        assert_eq!(closest_type("INTT"), Some(Type::Int));
        assert_eq!(closest_type("boool"), Some(Type::Bool));
    }

    #[test]
    fn test_no_suggestion_at_threshold() {
        // "integer" is 4 edits from "int"
        assert_eq!(closest_type("integer"), None);
        assert_eq!(closest_type("xyzzy"), None);
    }
}
