//! Offline token cost estimate.
//!
//! Text is split into maximal runs of ASCII digits, ASCII letters and
//! whitespace. Whitespace is free, a digit or letter run of length `L` costs
//! `ceil((L + 3) / 4)`, and every other character costs 1.

#[derive(Clone, Copy, PartialEq, Eq)]
enum Class {
    Digit,
    Alpha,
    Space,
    Other,
}

fn classify(c: char) -> Class {
    if c.is_ascii_digit() {
        Class::Digit
    } else if c.is_ascii_alphabetic() {
        Class::Alpha
    } else if c.is_whitespace() {
        Class::Space
    } else {
        Class::Other
    }
}

fn run_cost(class: Class, len: usize) -> usize {
    match class {
        Class::Digit | Class::Alpha => (len + 6) / 4,
        Class::Space => 0,
        Class::Other => len,
    }
}

/// Estimated token cost of `text`.
pub fn estimate(text: &str) -> usize {
    let mut total = 0;
    let mut current: Option<(Class, usize)> = None;

    for c in text.chars() {
        let class = classify(c);
        current = match current {
            Some((prev, len)) if prev == class => Some((prev, len + 1)),
            Some((prev, len)) => {
                total += run_cost(prev, len);
                Some((class, 1))
            }
            None => Some((class, 1)),
        };
    }
    if let Some((class, len)) = current {
        total += run_cost(class, len);
    }
    total
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
