//! Response validation and repair
//!
//! Generated text can be cut off mid-sentence when the model hits its output
//! budget. [`repair`] trims it back to the last complete sentence when that
//! leaves enough text, and otherwise marks the cut with an ellipsis. The
//! result always ends in a terminator, so repairing twice changes nothing.

use regex::Regex;
use std::sync::OnceLock;

/// Sentence endings accepted for every persona
pub const SENTENCE_TERMINATORS: [&str; 4] = [".", "!", "?", "…"];

/// Suffix appended to text that could not be cut at a sentence boundary
pub const ELLIPSIS: &str = "...";

fn closed_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```.*?```").unwrap())
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

fn sentence_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?…]+").unwrap())
}

/// Remove fenced code blocks, collapse runs of blank lines and trim.
///
/// An unclosed fence swallows the rest of the text.
#[must_use]
pub fn strip_artifacts(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = closed_fence_re().replace_all(&current, "").into_owned();
        if let Some(pos) = next.find("```") {
            next.truncate(pos);
        }
        let next = blank_lines_re()
            .replace_all(&next, "\n\n")
            .trim()
            .to_string();

        if next == current {
            return next;
        }
        current = next;
    }
}

/// Whether `text` already ends with an accepted terminator.
#[must_use]
pub fn ends_with_terminator(text: &str, terminators: &[String]) -> bool {
    SENTENCE_TERMINATORS.iter().any(|t| text.ends_with(t))
        || terminators
            .iter()
            .filter(|t| !t.is_empty())
            .any(|t| text.ends_with(t.as_str()))
}

/// Longest prefix made only of complete sentences, trimmed.
fn complete_sentences(text: &str) -> Option<&str> {
    sentence_end_re()
        .find_iter(text)
        .last()
        .map(|m| text[..m.end()].trim())
}

/// Repair possibly truncated output.
///
/// `repair_threshold` is the number of characters a sentence-aligned prefix
/// must exceed to be used instead of appending an ellipsis.
#[must_use]
pub fn repair(text: &str, terminators: &[String], repair_threshold: usize) -> String {
    let stripped = strip_artifacts(text);
    if stripped.is_empty() || ends_with_terminator(&stripped, terminators) {
        return stripped;
    }

    if let Some(prefix) = complete_sentences(&stripped) {
        if prefix.chars().count() > repair_threshold {
            return prefix.to_string();
        }
    }

    format!("{}{}", stripped, ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emoji() -> Vec<String> {
        ["✨", "🔮", "⭐"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_text_gets_ellipsis() {
        assert_eq!(repair("Hello world", &[], 80), "Hello world...");
    }

    #[test]
    fn test_complete_text_untouched() {
        let text = "Your path is clear. Walk it with confidence!";
        assert_eq!(repair(text, &[], 80), text);
    }

    #[test]
    fn test_emoji_terminator_accepted() {
        let text = "The moon favors you tonight ✨";
        assert_eq!(repair(text, &emoji(), 80), text);
        // not configured for this persona
        assert_eq!(repair("Trust the cards 🌙", &emoji(), 80), "Trust the cards 🌙...");
    }

    #[test]
    fn test_truncated_long_text_cut_at_sentence() {
        let first = "Venus enters your sign this week and brings a calm that you have not felt in a long time.";
        let text = format!("{} Use it to reconnect with the peop", first);
        assert!(first.chars().count() > 80);
        assert_eq!(repair(&text, &[], 80), first);
    }

    #[test]
    fn test_short_prefix_falls_back_to_ellipsis() {
        let text = "Good news. The wheel turns in your fav";
        assert_eq!(
            repair(text, &[], 80),
            "Good news. The wheel turns in your fav..."
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        // prefix length exactly at the threshold is not enough
        let prefix = "a".repeat(9) + ".";
        let text = format!("{} trailing", prefix);
        assert_eq!(repair(&text, &[], 10), format!("{}...", text));
        assert_eq!(repair(&text, &[], 9), prefix);
    }

    #[test]
    fn test_code_fences_removed() {
        let text = "Your number is 7.\n```json\n{\"n\": 7}\n```\nIt speaks of wisdom.";
        let repaired = repair(text, &[], 80);
        assert!(!repaired.contains("```"));
        assert!(!repaired.contains("\"n\""));
        assert!(repaired.ends_with("wisdom."));
    }

    #[test]
    fn test_dangling_fence_removed() {
        assert_eq!(strip_artifacts("Seven is your number.\n```\nlet x"), "Seven is your number.");
    }

    #[test]
    fn test_blank_lines_collapsed() {
        assert_eq!(strip_artifacts("  one\n\n\n\ntwo  "), "one\n\ntwo");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(repair("   ", &[], 80), "");
        assert_eq!(repair("```only code```", &[], 80), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Hello world",
            "Good news. The wheel turns in your fav",
            "Complete sentence here!",
            "Wait for it ✨",
            "Ends mid ```code",
            "Line one.\n\n\n\nLine two without end",
            "¿Qué dicen las cartas? Dicen que el camino se abre ante ti y que",
            "",
        ];
        for input in inputs {
            for threshold in [0, 5, 50, 80, 100] {
                let once = repair(input, &emoji(), threshold);
                let twice = repair(&once, &emoji(), threshold);
                assert_eq!(once, twice, "not idempotent for {input:?} @ {threshold}");
            }
        }
    }
}
