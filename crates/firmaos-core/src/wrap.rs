//! Attestation name wrapping under word and character constraints

use serde::{Deserialize, Serialize};

/// Limits driving the greedy wrap.
///
/// A line accepts the next word while it holds fewer than
/// `max_words_per_line` words and either the word fits within
/// `max_chars_per_line` or the line is still shorter than
/// `min_chars_per_line`. The min-chars override can therefore force a
/// line past the max-chars bound; that is intentional and keeps short
/// fragments from stranding on their own line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapLimits {
    pub max_words_per_line: usize,
    pub min_chars_per_line: usize,
    pub max_chars_per_line: usize,
}

impl Default for WrapLimits {
    fn default() -> Self {
        Self {
            max_words_per_line: 2,
            min_chars_per_line: 10,
            max_chars_per_line: 20,
        }
    }
}

/// Wrap a signer name into display lines.
///
/// Words are whitespace-delimited and kept in order; lengths are Unicode
/// scalar counts. A single word longer than `max_chars_per_line` is still
/// placed alone on its own line — words are never split mid-word.
pub fn wrap_name(name: &str, limits: WrapLimits) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_words = 0usize;

    for word in name.split_whitespace() {
        let current_len = current.chars().count();
        let word_len = word.chars().count();
        let accepts = current_words < limits.max_words_per_line
            && (current_len + word_len + 1 <= limits.max_chars_per_line
                || current_len < limits.min_chars_per_line);

        if accepts {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_words += 1;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_words = 1;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn name_strategy() -> impl Strategy<Value = String> {
        // Up to 8 words of 1..=25 letters, including accented characters
        prop::collection::vec("[a-zA-ZáéíóúñÁÉÍÓÚÑ]{1,25}", 1..8)
            .prop_map(|words| words.join(" "))
    }

    fn limits_strategy() -> impl Strategy<Value = WrapLimits> {
        (1usize..5, 1usize..15, 15usize..40).prop_map(|(w, min, max)| WrapLimits {
            max_words_per_line: w,
            min_chars_per_line: min,
            max_chars_per_line: max,
        })
    }

    proptest! {
        /// Property: concatenating the output lines reconstructs the input
        /// word sequence exactly — nothing lost, duplicated or reordered
        #[test]
        fn word_sequence_reconstructed(name in name_strategy(), limits in limits_strategy()) {
            let lines = wrap_name(&name, limits);
            let rebuilt: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
            let original: Vec<&str> = name.split_whitespace().collect();
            prop_assert_eq!(rebuilt, original);
        }

        /// Property: no line holds more than max_words_per_line words
        #[test]
        fn word_count_bounded(name in name_strategy(), limits in limits_strategy()) {
            for line in wrap_name(&name, limits) {
                let words = line.split(' ').count();
                prop_assert!(
                    words <= limits.max_words_per_line,
                    "line {:?} has {} words, limit {}",
                    line, words, limits.max_words_per_line
                );
            }
        }

        /// Property: lines are never empty for non-empty input
        #[test]
        fn no_empty_lines(name in name_strategy(), limits in limits_strategy()) {
            let lines = wrap_name(&name, limits);
            prop_assert!(!lines.is_empty());
            for line in &lines {
                prop_assert!(!line.is_empty());
            }
        }

        /// Property: a multi-word line over the max-chars bound was forced
        /// there by the min-chars override
        #[test]
        fn overflow_only_via_min_override(name in name_strategy(), limits in limits_strategy()) {
            for line in wrap_name(&name, limits) {
                let len = line.chars().count();
                if len > limits.max_chars_per_line && line.contains(' ') {
                    // Everything before the last word must have been short
                    // enough for the override to apply
                    let prefix = line.rsplit_once(' ').map(|(p, _)| p).unwrap_or("");
                    prop_assert!(
                        prefix.chars().count() < limits.min_chars_per_line,
                        "line {:?} overflows without the min-chars override",
                        line
                    );
                }
            }
        }
    }
}
