//! Teaser synthesis for partial-tier replies

use regex::Regex;
use std::sync::OnceLock;

/// Maximum sentences kept before the hook
pub const MAX_TEASER_SENTENCES: usize = 3;

fn sentence_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").unwrap())
}

/// Build a teaser from validated text: at most three sentences, an ellipsis
/// when the excerpt lacks closing punctuation, then the hook verbatim.
#[must_use]
pub fn synthesize(text: &str, hook: &str) -> String {
    let sentences: Vec<&str> = sentence_split_re()
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_TEASER_SENTENCES)
        .collect();

    let mut teaser = sentences.join(". ");
    if !teaser.ends_with(['.', '!', '?']) {
        teaser.push_str("...");
    }
    teaser.push_str(hook);
    teaser
}
