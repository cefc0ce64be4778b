//! Mapping an utterance to a registered command.
//!
//! A pattern contained in the utterance wins outright. Otherwise every
//! pattern is scored with the Ratcliff/Obershelp similarity ratio and the
//! best score at or above [`FUZZY_THRESHOLD`] wins.

use crate::command::Command;

/// Minimum similarity for a fuzzy match.
pub const FUZZY_THRESHOLD: f64 = 0.6;

/// How a command was matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    Fuzzy(f64),
}

/// A command matched against an utterance.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub command: &'a Command,
    /// The pattern that produced the match.
    pub pattern: &'static str,
    pub kind: MatchKind,
}

/// Find the command for `text`, which should already be lowercased.
pub fn match_command<'a>(commands: &'a [Command], text: &str) -> Option<Match<'a>> {
    let mut best: Option<Match<'a>> = None;
    let mut best_score = 0.0;

    for command in commands {
        for &pattern in command.patterns {
            if text.contains(pattern) {
                return Some(Match {
                    command,
                    pattern,
                    kind: MatchKind::Exact,
                });
            }

            let score = similarity(text, pattern);
            if score > best_score && score >= FUZZY_THRESHOLD {
                best_score = score;
                best = Some(Match {
                    command,
                    pattern,
                    kind: MatchKind::Fuzzy(score),
                });
            }
        }
    }

    if let Some(found) = &best {
        tracing::debug!(
            "Fuzzy matched with score {:.2}: {}",
            best_score,
            found.command.description
        );
    }

    best
}

/// Ratcliff/Obershelp similarity: `2 * M / T`, where `M` counts characters
/// in matching blocks and `T` is the combined length. Two empty strings
/// are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// Longest common substring as `(start_in_a, start_in_b, len)`; the
/// earliest block in `a` wins ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let len = cur[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}
