//! Greedy, order-preserving partition of lines under a token budget.

use serde::{Deserialize, Serialize};

use crate::tokens::estimate;

/// A group of consecutive lines summarized by one generation call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Lines in input order.
    pub lines: Vec<String>,
    /// Sum of the lines' estimated token costs.
    pub tokens: usize,
}

impl Chunk {
    /// Lines joined with `\n`, the form sent to the model.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn push(&mut self, line: String, cost: usize) {
        self.lines.push(line);
        self.tokens += cost;
    }
}

/// Partition `lines` into chunks whose estimated cost stays within
/// `max_tokens`.
///
/// Lines are never split: a line costing more than the budget gets a chunk
/// of its own. The last open chunk is always emitted, so empty input gives
/// one empty chunk.
pub fn chunk<I, S>(lines: I, max_tokens: usize) -> Vec<Chunk>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut chunks = Vec::new();
    let mut current = Chunk::default();

    for line in lines {
        let line = line.into();
        let cost = estimate(&line);
        if !current.lines.is_empty() && current.tokens + cost > max_tokens {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(line, cost);
    }

    chunks.push(current);
    chunks
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
