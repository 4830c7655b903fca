use serde::{Deserialize, Serialize};

/// Closed numeric interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// True when `other` lies entirely within this range.
    pub fn encloses(&self, other: &Range) -> bool {
        self.min <= other.min && self.max >= other.max
    }

    pub fn union(&self, other: &Range) -> Range {
        Range::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Union of two optional ranges; `None` only when both are absent.
    pub fn combine(a: Option<Range>, b: Option<Range>) -> Option<Range> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (Some(r), None) | (None, Some(r)) => Some(r),
            (None, None) => None,
        }
    }
}

/// Running min/max over finite samples.
#[derive(Debug, Clone, Copy)]
pub struct RangeTracker {
    min: f64,
    max: f64,
}

impl Default for RangeTracker {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RangeTracker {
    pub fn add(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn add_range(&mut self, range: &Range) {
        self.add(range.min);
        self.add(range.max);
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn range(&self) -> Option<Range> {
        if self.is_empty() {
            None
        } else {
            Some(Range::new(self.min, self.max))
        }
    }
}
