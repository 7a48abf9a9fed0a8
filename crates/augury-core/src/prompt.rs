//! Prompt assembly

use crate::chat::ConversationTurn;
use crate::gate::Tier;
use crate::persona::PersonaConfig;
use std::fmt::Write as _;

/// Default number of history turns kept in the prompt
pub const DEFAULT_HISTORY_TURNS: usize = 10;

/// Build the prompt for one request.
///
/// Layout: instruction block, tier guidance (if configured), the most recent
/// `history_turns` turns, then the current message addressed to the advisor.
#[must_use]
pub fn build_prompt(
    persona: &PersonaConfig,
    tier: Tier,
    history: &[ConversationTurn],
    history_turns: usize,
    user_message: &str,
) -> String {
    let advisor = persona.name();
    let mut prompt = String::with_capacity(persona.persona.instructions.len() + 512);

    prompt.push_str(persona.persona.instructions.trim());

    if let Some(guidance) = persona
        .profile(tier)
        .guidance
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
    {
        prompt.push_str("\n\n");
        prompt.push_str(guidance);
    }

    let recent = &history[history.len().saturating_sub(history_turns)..];
    let recent: Vec<_> = recent
        .iter()
        .filter(|turn| !turn.message.trim().is_empty())
        .collect();
    if !recent.is_empty() {
        prompt.push_str("\n\nConversation so far:");
        for turn in recent {
            let role = if turn.is_user() { "User" } else { advisor };
            let _ = write!(prompt, "\n{}: {}", role, turn.message.trim());
        }
    }

    let _ = write!(prompt, "\n\nUser: {}\n{}:", user_message, advisor);
    prompt
}
