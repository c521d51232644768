//! Rendering and parsing of the yes/no confirmation dialog.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::PendingConfirmation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
}

impl Decision {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "yes" | "y" => Some(Decision::Yes),
            "no" | "n" => Some(Decision::No),
            _ => None,
        }
    }
}

/// One "Did you mean …?" line per pending item, blank-line separated, with a
/// reply hint matching the list length.
pub fn render_confirmation_text(pending: &[PendingConfirmation]) -> String {
    let lines = pending
        .iter()
        .map(|p| format!("Did you mean {}?", p.suggested_name))
        .collect::<Vec<_>>()
        .join("\n\n");
    let tail = if pending.len() > 1 {
        "\n\nReply like: 'yes, no' (in order)."
    } else {
        "\n\nReply like: 'yes' or 'no'."
    };
    format!("{lines}{tail}")
}

fn positioned_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s+(yes|y|no|n)$").unwrap())
}

/// Parse a reply into per-position decisions (0-based).
///
/// The text is split on commas/newlines into trimmed lowercase tokens. A
/// token is either `"<1-based position> <yes|y|no|n>"` or a bare decision,
/// which applies at the token's own index. Unrecognized tokens record
/// nothing at their position.
pub fn parse_decisions(text: &str) -> HashMap<usize, Decision> {
    let mut decisions = HashMap::new();
    let parts = text
        .split(['\n', ','])
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty());

    for (idx, part) in parts.enumerate() {
        if let Some(caps) = positioned_re().captures(&part) {
            let pos: usize = match caps[1].parse() {
                Ok(p) => p,
                Err(_) => continue,
            };
            if pos == 0 {
                continue;
            }
            if let Some(d) = Decision::from_token(&caps[2]) {
                decisions.insert(pos - 1, d);
            }
        } else if let Some(d) = Decision::from_token(&part) {
            decisions.insert(idx, d);
        }
    }

    decisions
}
