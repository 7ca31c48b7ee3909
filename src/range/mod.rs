//! Ordered disjoint-interval sets
//!
//! A [`Range`] is the value domain a formula variable is constrained to.
//! Intervals are kept sorted, disjoint and non-adjacent, so two ranges
//! covering the same integers always compare equal.
//!
//! ```text
//! [1, 3] U [5, 7]  ∩  [2, 6]   =  [2, 3] U [5, 6]
//! [1, 3]           ∪  [4, 9]   =  [1, 9]
//! ```

mod interval;

pub use interval::Interval;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors from parsing the textual range form (`1..10,20..30`)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeParseError {
    /// A bound was not an integer
    #[error("invalid bound '{0}'")]
    InvalidBound(String),

    /// `low > high`
    #[error("inverted interval {low}..{high}")]
    Inverted {
        /// Lower bound as written
        low: i64,
        /// Upper bound as written
        high: i64,
    },
}

/// Sorted set of disjoint integer intervals
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Range {
    intervals: Vec<Interval>,
}

impl Range {
    /// Empty range
    pub fn new() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Range holding a single interval
    pub fn from_interval(interval: Interval) -> Self {
        Self {
            intervals: vec![interval],
        }
    }

    /// Range `[low, high]`; empty when `low > high`
    pub fn bounded(low: i64, high: i64) -> Self {
        Interval::new(low, high)
            .map(Self::from_interval)
            .unwrap_or_default()
    }

    /// Every representable value
    pub fn full() -> Self {
        Self::bounded(i64::MIN, i64::MAX)
    }

    /// True when no value is covered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Sorted intervals
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Smallest and largest covered value
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match (self.intervals.first(), self.intervals.last()) {
            (Some(first), Some(last)) => Some((first.low, last.high)),
            _ => None,
        }
    }

    /// Number of integers covered
    pub fn cardinality(&self) -> u128 {
        self.intervals.iter().map(Interval::width).sum()
    }

    /// Check membership (binary search)
    pub fn contains(&self, value: i64) -> bool {
        let idx = self.intervals.partition_point(|iv| iv.high < value);
        self.intervals
            .get(idx)
            .map_or(false, |iv| iv.contains(value))
    }

    /// Add `[low, high]`, coalescing with overlapping or adjacent intervals
    pub fn insert(&mut self, low: i64, high: i64) {
        let Some(mut added) = Interval::new(low, high) else {
            return;
        };

        let start = self
            .intervals
            .partition_point(|iv| !iv.touches(&added) && iv.high < added.low);
        let mut end = start;
        while end < self.intervals.len() && self.intervals[end].touches(&added) {
            added.low = added.low.min(self.intervals[end].low);
            added.high = added.high.max(self.intervals[end].high);
            end += 1;
        }
        self.intervals.splice(start..end, std::iter::once(added));
    }

    /// Remove `[low, high]`, splitting intervals that straddle it
    pub fn remove(&mut self, low: i64, high: i64) {
        let Some(cut) = Interval::new(low, high) else {
            return;
        };

        let mut kept = Vec::with_capacity(self.intervals.len() + 1);
        for iv in self.intervals.drain(..) {
            if iv.intersect(&cut).is_none() {
                kept.push(iv);
                continue;
            }
            if iv.low < cut.low {
                kept.push(Interval {
                    low: iv.low,
                    high: cut.low - 1,
                });
            }
            if iv.high > cut.high {
                kept.push(Interval {
                    low: cut.high + 1,
                    high: iv.high,
                });
            }
        }
        self.intervals = kept;
    }

    /// Values covered by both ranges
    pub fn intersect(a: &Range, b: &Range) -> Range {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.intervals.len() && j < b.intervals.len() {
            let (x, y) = (&a.intervals[i], &b.intervals[j]);
            if let Some(overlap) = x.intersect(y) {
                out.push(overlap);
            }
            if x.high < y.high {
                i += 1;
            } else {
                j += 1;
            }
        }
        Range { intervals: out }
    }

    /// Values covered by either range
    pub fn union(a: &Range, b: &Range) -> Range {
        let mut merged = a.clone();
        for iv in &b.intervals {
            merged.insert(iv.low, iv.high);
        }
        merged
    }

    /// Replace `self` with `self ∩ other`
    pub fn intersect_in_place(&mut self, other: &Range) {
        *self = Range::intersect(self, other);
    }

    /// Replace `self` with `self ∪ other`
    pub fn union_in_place(&mut self, other: &Range) {
        *self = Range::union(self, other);
    }
}

impl From<Interval> for Range {
    fn from(interval: Interval) -> Self {
        Range::from_interval(interval)
    }
}

impl FromIterator<Interval> for Range {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        let mut range = Range::new();
        for iv in iter {
            range.insert(iv.low, iv.high);
        }
        range
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.intervals.is_empty() {
            return write!(f, "{{}}");
        }
        for (idx, iv) in self.intervals.iter().enumerate() {
            if idx > 0 {
                write!(f, " U ")?;
            }
            write!(f, "{}", iv)?;
        }
        Ok(())
    }
}

/// Parses `LO..HI` or `N` pieces separated by commas; `{}` is the empty range.
impl FromStr for Range {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut range = Range::new();
        if s.is_empty() || s == "{}" {
            return Ok(range);
        }

        for piece in s.split(',') {
            let piece = piece.trim();
            let (low, high) = match piece.split_once("..") {
                Some((lo, hi)) => (parse_bound(lo)?, parse_bound(hi)?),
                None => {
                    let v = parse_bound(piece)?;
                    (v, v)
                }
            };
            if low > high {
                return Err(RangeParseError::Inverted { low, high });
            }
            range.insert(low, high);
        }
        Ok(range)
    }
}

fn parse_bound(text: &str) -> Result<i64, RangeParseError> {
    let text = text.trim();
    text.parse()
        .map_err(|_| RangeParseError::InvalidBound(text.to_string()))
}
