//! Edit distance between a displayed script and a recognizer transcript
//!
//! The distance is pure and has no opinion on pass/fail; see
//! [`crate::matcher`] for the acceptance policy.

/// Normalize text for comparison: lowercase, drop punctuation, collapse
/// whitespace runs to a single space, trim both ends.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Edit distance between `target` and `transcript` after [`normalize`].
pub fn edit_distance(target: &str, transcript: &str) -> usize {
    levenshtein(&normalize(target), &normalize(transcript))
}

/// Calculate Levenshtein distance between two strings
///
/// Works on `char`s, keeping a single row sized to the shorter input.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, lc) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = if lc == sc { 0 } else { 1 };
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("hello", "hello"), 0);
        assert_eq!(levenshtein("hello", "helo"), 1);
        assert_eq!(levenshtein("hello", "world"), 4);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("sitting", "kitten"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn test_empty() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(edit_distance("", "Good morning"), "good morning".len());
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
        assert_eq!(levenshtein("日本語", "日本"), 1);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Hello!"), "hello");
        assert_eq!(normalize("  Rise,   and SHINE. "), "rise and shine");
        assert_eq!(normalize("\tI'm up\n"), "im up");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_edit_distance_ignores_case_and_punctuation() {
        assert_eq!(edit_distance("Rise and shine!", "rise  and shine"), 0);
        assert_eq!(edit_distance("I embrace this hour", "I embrace this"), 5);
    }
}
