//! Message rendering with resolved names.

use std::collections::HashMap;
use std::sync::LazyLock;

use huddle_core::{Message, UserId};
use regex::{Captures, Regex};

use crate::resolver::IdentityResolver;

static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<@([UB]\w+)>").unwrap());

/// How lines are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prefix each line with the author's name and resolve mentions. When
    /// off, lines are the bare text with mentions removed.
    pub with_names: bool,
    /// Annotate the author with `[internal]` or `[external]`.
    pub with_affiliation: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            with_names: true,
            with_affiliation: false,
        }
    }
}

/// Render messages as `"<name>: <text>"` lines, preserving order.
pub async fn render_lines(
    resolver: &IdentityResolver,
    messages: &[Message],
    options: RenderOptions,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(messages.len());
    for message in messages {
        if !options.with_names {
            lines.push(MENTION.replace_all(&message.text, "").into_owned());
            continue;
        }

        let author = resolver.resolve(&message.author_id).await;
        let text = substitute_mentions(resolver, &message.text).await;
        let line = if options.with_affiliation {
            let status = if author.is_internal {
                "[internal]"
            } else {
                "[external]"
            };
            format!("{} {status}: {text}", author.display_name)
        } else {
            format!("{}: {text}", author.display_name)
        };
        lines.push(line);
    }
    lines
}

async fn substitute_mentions(resolver: &IdentityResolver, text: &str) -> String {
    let ids: Vec<String> = MENTION
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect();
    let mut names: HashMap<String, String> = HashMap::new();
    for id in ids {
        if !names.contains_key(&id) {
            let resolved = resolver.resolve(&UserId::from(id.as_str())).await;
            let _ = names.insert(id, resolved.display_name);
        }
    }
    if names.is_empty() {
        return text.to_string();
    }
    MENTION
        .replace_all(text, |caps: &Captures<'_>| {
            names.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
