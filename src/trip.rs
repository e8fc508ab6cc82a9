//! Raw trip parsing.
//!
//! A trip file holds one `x,y` line per elapsed second. Lines that are not
//! exactly two numbers (headers, truncated writes) are skipped for the point
//! sequence but still count as elapsed seconds.

use crate::TripPoint;

/// Line delimiter inside a trip file.
const SEGMENT_DELIM: char = '\n';

/// Field delimiter inside a point line.
const FIELD_DELIM: char = ',';

/// A trip after parsing, ready for feature extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTrip {
    /// Every line that parsed as a point, in file order
    pub points: Vec<TripPoint>,
    /// Number of raw line segments, valid or not
    pub segment_count: usize,
    /// Point on the second-to-last segment, if that line parsed
    pub destination: Option<TripPoint>,
}

impl ParsedTrip {
    /// Elapsed seconds: one less than the raw segment count.
    ///
    /// Not clamped: a blob made only of newlines has no segments and yields -1.
    pub fn duration(&self) -> f64 {
        self.segment_count as f64 - 1.0
    }
}

/// Split a trip blob into line segments.
///
/// Trailing empty segments are dropped, so a final newline does not count as
/// a line. An empty blob is a single empty segment.
pub fn split_segments(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return vec![text];
    }

    let mut segments: Vec<&str> = text.split(SEGMENT_DELIM).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

/// Parse a single `x,y` line.
///
/// Returns `None` unless the line has exactly two fields that both parse as
/// finite real numbers. Surrounding whitespace (including `\r`) is ignored.
pub fn parse_point(line: &str) -> Option<TripPoint> {
    let mut fields = line.split(FIELD_DELIM);
    let x = fields.next()?.trim().parse::<f64>().ok()?;
    let y = fields.next()?.trim().parse::<f64>().ok()?;
    if fields.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(TripPoint::new(x, y))
}

/// Parse a raw trip blob.
pub fn parse_trip(text: &str) -> ParsedTrip {
    let segments = split_segments(text);

    let points: Vec<TripPoint> = segments.iter().filter_map(|s| parse_point(s)).collect();

    let destination = segments
        .len()
        .checked_sub(2)
        .and_then(|idx| parse_point(segments[idx]));

    ParsedTrip {
        points,
        segment_count: segments.len(),
        destination,
    }
}
