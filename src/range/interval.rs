//! Closed integer interval `[low, high]`

use std::fmt;

/// Inclusive interval over `i64`
///
/// Invariant: `low <= high`. Empty intervals are not representable;
/// emptiness lives at the [`Range`](super::Range) level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Interval {
    /// Lower bound (inclusive)
    pub low: i64,

    /// Upper bound (inclusive)
    pub high: i64,
}

impl Interval {
    /// Create `[low, high]`, or `None` when `low > high`
    pub fn new(low: i64, high: i64) -> Option<Self> {
        (low <= high).then_some(Self { low, high })
    }

    /// Single value `[v, v]`
    pub fn point(value: i64) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    /// Check membership
    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.low <= value && value <= self.high
    }

    /// Overlap of two intervals
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        Interval::new(self.low.max(other.low), self.high.min(other.high))
    }

    /// True when the two intervals overlap or touch (`[1,3]` and `[4,6]`)
    pub fn touches(&self, other: &Interval) -> bool {
        self.low <= other.high.saturating_add(1) && other.low <= self.high.saturating_add(1)
    }

    /// Number of integers covered
    pub fn width(&self) -> u128 {
        (self.high as i128 - self.low as i128 + 1) as u128
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}
