//! Byte-range request parsing
//!
//! Single-range `Range` header parsing per RFC 7233, used when serving
//! static assets. Multi-range requests are ignored (full content).

/// A parsed byte range within a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte position.
    pub start: usize,
    /// Last byte position; `None` means through end of file.
    pub end: Option<usize>,
}

impl ByteRange {
    /// Resolve the inclusive end position against the file size.
    #[inline]
    #[must_use]
    pub fn end_position(&self, file_size: usize) -> usize {
        self.end.unwrap_or_else(|| file_size.saturating_sub(1))
    }
}

/// Outcome of parsing a `Range` header.
#[derive(Debug)]
pub enum RangeOutcome {
    /// Satisfiable range, serve 206.
    Valid(ByteRange),
    /// Syntactically valid but unsatisfiable, serve 416.
    NotSatisfiable,
    /// Absent or malformed header; serve the full body.
    None,
}

/// Parse a `Range` header value against a known file size.
///
/// Handles `bytes=start-end`, `bytes=start-` and the suffix form
/// `bytes=-n`. Anything else (other units, multiple ranges, garbage)
/// is treated as absent.
pub fn parse_range_header(header: Option<&str>, file_size: usize) -> RangeOutcome {
    let Some(value) = header else {
        return RangeOutcome::None;
    };
    let Some(spec) = value.strip_prefix("bytes=") else {
        return RangeOutcome::None;
    };
    if spec.contains(',') {
        return RangeOutcome::None;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeOutcome::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        return parse_suffix(end_str, file_size);
    }
    parse_bounded(start_str, end_str, file_size)
}

/// `bytes=-n`: the final n bytes of the file.
fn parse_suffix(suffix_str: &str, file_size: usize) -> RangeOutcome {
    let Ok(suffix) = suffix_str.parse::<usize>() else {
        return RangeOutcome::None;
    };
    if suffix == 0 {
        return RangeOutcome::NotSatisfiable;
    }
    // An oversized suffix just covers the whole file.
    RangeOutcome::Valid(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: Some(file_size.saturating_sub(1)),
    })
}

/// `bytes=start-` and `bytes=start-end`.
fn parse_bounded(start_str: &str, end_str: &str, file_size: usize) -> RangeOutcome {
    let Ok(start) = start_str.parse::<usize>() else {
        return RangeOutcome::None;
    };
    if start >= file_size {
        return RangeOutcome::NotSatisfiable;
    }

    let end = if end_str.is_empty() {
        None
    } else {
        match end_str.parse::<usize>() {
            // Ends past EOF clamp to the last byte.
            Ok(e) => Some(e.min(file_size.saturating_sub(1))),
            Err(_) => return RangeOutcome::None,
        }
    };

    if end.is_some_and(|e| start > e) {
        return RangeOutcome::NotSatisfiable;
    }
    RangeOutcome::Valid(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_header() {
        assert!(matches!(parse_range_header(None, 100), RangeOutcome::None));
    }

    #[test]
    fn bounded_range() {
        match parse_range_header(Some("bytes=0-9"), 100) {
            RangeOutcome::Valid(r) => {
                assert_eq!(r.start, 0);
                assert_eq!(r.end, Some(9));
            }
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn open_ended_range() {
        match parse_range_header(Some("bytes=50-"), 100) {
            RangeOutcome::Valid(r) => {
                assert_eq!(r.start, 50);
                assert_eq!(r.end, None);
                assert_eq!(r.end_position(100), 99);
            }
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn suffix_range() {
        match parse_range_header(Some("bytes=-20"), 100) {
            RangeOutcome::Valid(r) => {
                assert_eq!(r.start, 80);
                assert_eq!(r.end, Some(99));
            }
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn end_clamped_to_file_size() {
        match parse_range_header(Some("bytes=10-5000"), 100) {
            RangeOutcome::Valid(r) => assert_eq!(r.end, Some(99)),
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn start_past_eof_not_satisfiable() {
        assert!(matches!(
            parse_range_header(Some("bytes=200-"), 100),
            RangeOutcome::NotSatisfiable
        ));
    }

    #[test]
    fn malformed_ranges_ignored() {
        assert!(matches!(
            parse_range_header(Some("bytes=a-b"), 100),
            RangeOutcome::None
        ));
        assert!(matches!(
            parse_range_header(Some("bytes=0-9,20-29"), 100),
            RangeOutcome::None
        ));
        assert!(matches!(
            parse_range_header(Some("lines=0-9"), 100),
            RangeOutcome::None
        ));
    }
}
