//! Binding pattern parsing and segment matching
//!
//! A binding pattern is a `.`-separated sequence of segments where each
//! segment is a literal, `*` (matches exactly one segment) or `#` (matches
//! zero or more segments). Matching runs over segment lists, not raw
//! strings, so `*` can never match across a `.` boundary.

use std::fmt;

use super::error::PatternError;

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*` - exactly one arbitrary segment
    Single,
    /// `#` - zero or more arbitrary segments
    Rest,
}

/// A parsed, validated binding pattern.
///
/// Parsing rejects empty patterns and patterns with empty segments
/// (`"a..b"`). Any number of `#` segments is accepted; matching resolves
/// them with a bounded backtracking walk.
///
/// # Example
///
/// ```rust
/// use relaymq::routing::BindingPattern;
///
/// let pattern = BindingPattern::parse("orders.*.paid").unwrap();
/// assert!(pattern.matches("orders.123.paid"));
/// assert!(!pattern.matches("orders.123.cancelled"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPattern {
    text: String,
    segments: Vec<Segment>,
}

impl BindingPattern {
    /// Parse a pattern from its textual form.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        if text.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut segments = Vec::new();
        for part in text.split('.') {
            match part {
                "" => {
                    return Err(PatternError::EmptySegment {
                        pattern: text.to_string(),
                    })
                }
                "*" => segments.push(Segment::Single),
                "#" => segments.push(Segment::Rest),
                literal => segments.push(Segment::Literal(literal.to_string())),
            }
        }

        Ok(Self {
            text: text.to_string(),
            segments,
        })
    }

    /// The pattern exactly as supplied at bind time.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the pattern contains no wildcard segments.
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, Segment::Literal(_)))
    }

    /// Match a routing key against this pattern.
    pub fn matches(&self, routing_key: &str) -> bool {
        let key: Vec<&str> = routing_key.split('.').collect();
        matches_segments(&self.segments, &key)
    }
}

impl fmt::Display for BindingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Iterative backtracking walk over segment alignment.
///
/// The classic wildcard-matching algorithm applied to segment lists: on a
/// mismatch, back up to the most recent `#` and let it absorb one more key
/// segment. Worst case O(pattern segments * key segments), which satisfies
/// the required O(segments squared) bound.
fn matches_segments(pattern: &[Segment], key: &[&str]) -> bool {
    let mut p = 0;
    let mut k = 0;
    // (pattern index just past the last `#`, key index it restarted from)
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some(Segment::Literal(literal)) if literal == key[k] => {
                p += 1;
                k += 1;
            }
            Some(Segment::Single) => {
                p += 1;
                k += 1;
            }
            Some(Segment::Rest) => {
                backtrack = Some((p + 1, k));
                p += 1;
            }
            _ => match backtrack {
                Some((after_rest, restart)) => {
                    // Let the last `#` absorb one more segment and retry.
                    p = after_rest;
                    k = restart + 1;
                    backtrack = Some((after_rest, k));
                }
                None => return false,
            },
        }
    }

    // Key consumed; any trailing pattern segments must all be `#`.
    pattern[p..]
        .iter()
        .all(|segment| matches!(segment, Segment::Rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(text: &str) -> BindingPattern {
        BindingPattern::parse(text).expect("pattern should parse")
    }

    #[test]
    fn test_literal_pattern_matches_identical_key_only() {
        let p = pattern("orders.created");

        assert!(p.matches("orders.created"));
        assert!(!p.matches("orders.cancelled"));
        assert!(!p.matches("orders"));
        assert!(!p.matches("orders.created.eu"));
    }

    #[test]
    fn test_star_matches_exactly_one_segment() {
        let p = pattern("orders.*.paid");

        assert!(p.matches("orders.123.paid"));
        assert!(p.matches("orders.abc.paid"));
        assert!(!p.matches("orders.paid"));
        assert!(!p.matches("orders.123.456.paid"));
        assert!(!p.matches("orders.123.cancelled"));
    }

    #[test]
    fn test_star_does_not_cross_segment_boundaries() {
        let p = pattern("*");

        assert!(p.matches("anything"));
        assert!(!p.matches("two.segments"));
    }

    #[test]
    fn test_without_hash_segment_counts_must_agree() {
        // For patterns without `#`, a match requires equal segment counts
        // and agreement on every non-`*` position.
        let p = pattern("a.*.c.*");

        assert!(p.matches("a.b.c.d"));
        assert!(!p.matches("a.b.c"));
        assert!(!p.matches("a.b.c.d.e"));
        assert!(!p.matches("a.b.x.d"));
    }

    #[test]
    fn test_trailing_hash_matches_zero_or_more() {
        let p = pattern("foo.#");

        assert!(p.matches("foo"));
        assert!(p.matches("foo.bar"));
        assert!(p.matches("foo.bar.baz"));
        assert!(!p.matches("bar.foo"));
    }

    #[test]
    fn test_leading_hash() {
        let p = pattern("#.paid");

        assert!(p.matches("paid"));
        assert!(p.matches("orders.paid"));
        assert!(p.matches("orders.123.paid"));
        assert!(!p.matches("orders.paid.eu"));
    }

    #[test]
    fn test_embedded_hash() {
        let p = pattern("orders.#.paid");

        assert!(p.matches("orders.paid"));
        assert!(p.matches("orders.123.paid"));
        assert!(p.matches("orders.123.eu.paid"));
        assert!(!p.matches("orders.123.cancelled"));
    }

    #[test]
    fn test_hash_alone_matches_everything() {
        let p = pattern("#");

        assert!(p.matches("a"));
        assert!(p.matches("a.b.c"));
    }

    #[test]
    fn test_multiple_hash_wildcards_backtrack() {
        let p = pattern("a.#.b.#.c");

        assert!(p.matches("a.b.c"));
        assert!(p.matches("a.x.b.y.c"));
        assert!(p.matches("a.x.y.b.z.c"));
        assert!(!p.matches("a.x.y.z.c"));
    }

    #[test]
    fn test_hash_then_star_still_requires_a_segment() {
        let p = pattern("#.*");

        assert!(p.matches("a"));
        assert!(p.matches("a.b.c"));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        assert_eq!(BindingPattern::parse(""), Err(PatternError::Empty));
    }

    #[test]
    fn test_empty_segment_is_rejected() {
        match BindingPattern::parse("a..b") {
            Err(PatternError::EmptySegment { pattern }) => assert_eq!(pattern, "a..b"),
            other => panic!("Expected EmptySegment error, got: {:?}", other),
        }
        assert!(BindingPattern::parse(".a").is_err());
        assert!(BindingPattern::parse("a.").is_err());
    }

    #[test]
    fn test_is_literal() {
        assert!(pattern("orders.created").is_literal());
        assert!(!pattern("orders.*").is_literal());
        assert!(!pattern("orders.#").is_literal());
    }

    #[test]
    fn test_display_round_trips_text() {
        let p = pattern("orders.*.paid");
        assert_eq!(p.to_string(), "orders.*.paid");
        assert_eq!(p.text(), "orders.*.paid");
    }
}
