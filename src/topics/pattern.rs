//! # Topic normalization and wildcard pattern matching.
//!
//! A topic is addressed as the sequence of its non-empty segments, obtained
//! by splitting on [`SEPARATOR`] and discarding empty parts. Equality and
//! matching are defined over segment sequences, never raw strings.
//!
//! ## Matching rules
//! ```text
//! literal   must equal the topic segment at the same position
//! *         consumes exactly one topic segment, any value
//! **        terminal only; consumes all remaining segments (including zero)
//! ```
//! Pattern and topic must both be fully consumed, except in the `**` case.
//!
//! A `**` that is *not* the last pattern segment is matched as an ordinary
//! literal segment; no nested-wildcard semantics are inferred.
//!
//! ## Edge cases
//! - A topic of pure separators (`"///"`) normalizes to zero segments.
//! - A zero-segment pattern matches only a zero-segment topic.
//! - A sole-`**` pattern matches every topic, including the empty one.

use std::sync::Arc;

/// Separator between topic segments.
pub const SEPARATOR: char = '/';

/// Splits a topic into its non-empty segments.
pub fn split_topic(topic: &str) -> Vec<&str> {
    topic.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// One segment of a parsed subscription pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Matches a topic segment with exactly this text.
    Literal(Box<str>),
    /// `*` — matches exactly one topic segment, any value.
    Single,
    /// `**` — matches zero or more trailing topic segments.
    Tail,
}

/// A parsed, normalized subscription pattern.
///
/// Keeps both the segment sequence used for matching and the canonical
/// string form (`a/*/c`) that is reported in `sub_events`.
#[derive(Clone, Debug)]
pub struct Pattern {
    segments: Vec<Segment>,
    canonical: Arc<str>,
}

impl Pattern {
    /// Parses a raw pattern string, discarding empty segments.
    ///
    /// `**` becomes [`Segment::Tail`] only in terminal position; anywhere
    /// else it is kept as a literal.
    pub fn parse(raw: &str) -> Self {
        let parts = split_topic(raw);
        let last = parts.len().saturating_sub(1);
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, part)| match *part {
                "*" => Segment::Single,
                "**" if i == last => Segment::Tail,
                other => Segment::Literal(other.into()),
            })
            .collect();
        let canonical: Arc<str> = parts.join("/").into();
        Self { segments, canonical }
    }

    /// Canonical form of the pattern (normalized segments joined by `/`).
    pub fn canonical(&self) -> &Arc<str> {
        &self.canonical
    }

    /// Tests this pattern against an already-split topic.
    pub fn matches(&self, topic: &[&str]) -> bool {
        let mut i = 0;
        for segment in &self.segments {
            match segment {
                // Tail is terminal by construction; it consumes the rest.
                Segment::Tail => return true,
                Segment::Single => {
                    if i >= topic.len() {
                        return false;
                    }
                    i += 1;
                }
                Segment::Literal(lit) => match topic.get(i) {
                    Some(part) if *part == lit.as_ref() => i += 1,
                    _ => return false,
                },
            }
        }
        i == topic.len()
    }
}
