//! Answer matching
//!
//! Answers are compared after normalisation: case folded, surrounding and
//! repeated whitespace collapsed, typographic apostrophes unified, and
//! trailing sentence punctuation dropped.

use serde::{Deserialize, Serialize};

/// How a submitted answer is compared with the expected ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerRule {
    /// Normalised strings must be equal
    #[default]
    Exact,
    /// Normalised strings may differ by up to `max_distance` edits
    Fuzzy { max_distance: usize },
}

impl AnswerRule {
    /// Check `given` against any of the `expected` answers
    pub fn matches(&self, expected: &[String], given: &str) -> bool {
        let given = normalize(given);
        if given.is_empty() {
            return false;
        }

        expected.iter().map(|e| normalize(e)).any(|e| match self {
            AnswerRule::Exact => e == given,
            AnswerRule::Fuzzy { max_distance } => levenshtein(&e, &given) <= *max_distance,
        })
    }
}

/// Canonical form used for comparisons
pub fn normalize(text: &str) -> String {
    let unified: String = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '`' => '\'',
            other => other,
        })
        .collect();

    let collapsed = unified
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    collapsed
        .trim_end_matches(['.', '!', '?', ',', ';'])
        .trim_end()
        .to_string()
}

/// Edit distance between two strings, counted in chars
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  I   AM  here. "), "i am here");
        assert_eq!(normalize("I\u{2019}m fine!"), "i'm fine");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_exact_is_case_and_space_insensitive() {
        let rule = AnswerRule::Exact;
        let expected = answers(&["She goes to school"]);
        assert!(rule.matches(&expected, "she  goes to SCHOOL."));
        assert!(!rule.matches(&expected, "she go to school"));
    }

    #[test]
    fn test_any_expected_answer_matches() {
        let rule = AnswerRule::Exact;
        let expected = answers(&["don't", "do not"]);
        assert!(rule.matches(&expected, "Do not"));
        assert!(rule.matches(&expected, "DON\u{2019}T"));
    }

    #[test]
    fn test_fuzzy_tolerates_typos() {
        let rule = AnswerRule::Fuzzy { max_distance: 1 };
        let expected = answers(&["beautiful"]);
        assert!(rule.matches(&expected, "beautifull"));
        assert!(!rule.matches(&expected, "butiful"));
    }

    #[test]
    fn test_empty_answer_never_matches() {
        let rule = AnswerRule::Fuzzy { max_distance: 3 };
        assert!(!rule.matches(&answers(&["a"]), "  "));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_rule_serde_shape() {
        let rule: AnswerRule =
            serde_json::from_str(r#"{"kind": "fuzzy", "max_distance": 2}"#).unwrap();
        assert_eq!(rule, AnswerRule::Fuzzy { max_distance: 2 });
    }
}
