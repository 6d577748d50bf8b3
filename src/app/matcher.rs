//! Route pattern matching
//!
//! Matches request paths against manifest route patterns. Patterns are
//! segment lists: literal segments, `[param]` single-segment wildcards,
//! and a trailing `[...rest]` catch-all spanning zero or more segments.

/// One pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
    Rest,
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a pattern string. `[...rest]` anywhere but last is treated
    /// as a literal, since nothing could follow it.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let count = pattern.split('/').filter(|s| !s.is_empty()).count();
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(i, seg)| {
                if seg.starts_with("[...") && seg.ends_with(']') {
                    // Only valid in last position; elsewhere nothing could
                    // follow it, so it stays a literal (never a param).
                    if i == count - 1 {
                        Segment::Rest
                    } else {
                        Segment::Literal(seg.to_string())
                    }
                } else if seg.starts_with('[') && seg.ends_with(']') {
                    Segment::Param
                } else {
                    Segment::Literal(seg.to_string())
                }
            })
            .collect();
        Self { segments }
    }

    /// Test a request path (leading slash, no query) against the pattern.
    /// A trailing slash on the path is ignored.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let has_rest = self.segments.last() == Some(&Segment::Rest);
        let fixed = if has_rest {
            &self.segments[..self.segments.len() - 1]
        } else {
            &self.segments[..]
        };

        if has_rest {
            if parts.len() < fixed.len() {
                return false;
            }
        } else if parts.len() != fixed.len() {
            return false;
        }

        fixed.iter().zip(&parts).all(|(seg, part)| match seg {
            Segment::Literal(lit) => lit == part,
            Segment::Param => true,
            Segment::Rest => unreachable!("rest segment is never in the fixed prefix"),
        })
    }
}
