use crate::range::{Range, RangeTracker};
use crate::table::ColumnMeta;

/// Observed data ranges of one logical axis over the tables scanned so far.
///
/// `data_err_range` always encloses `data_range`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisAccumulator {
    pub column: ColumnMeta,
    /// Unit of the converter applied to the column, if any.
    pub unit: Option<String>,
    pub use_log: bool,
    pub data_range: Option<Range>,
    pub data_err_range: Option<Range>,
    pub has_data_error: bool,
}

impl AxisAccumulator {
    /// Builds the accumulator of one table scan; `None` when no finite value was seen.
    pub fn from_scan(
        column: ColumnMeta,
        unit: Option<String>,
        use_log: bool,
        data: &RangeTracker,
        data_err: &RangeTracker,
        has_data_error: bool,
    ) -> Option<Self> {
        let data_range = data.range()?;
        let mut err = *data_err;
        err.add_range(&data_range);
        Some(Self {
            column,
            unit,
            use_log,
            data_range: Some(data_range),
            data_err_range: err.range(),
            has_data_error,
        })
    }

    /// Union of both accumulators' ranges; column, unit and scale come from `self`.
    pub fn merge(&self, other: &AxisAccumulator) -> AxisAccumulator {
        let data_range = Range::combine(self.data_range, other.data_range);
        let data_err_range = Range::combine(
            Range::combine(self.data_err_range, other.data_err_range),
            data_range,
        );
        AxisAccumulator {
            column: self.column.clone(),
            unit: self.unit.clone(),
            use_log: self.use_log,
            data_range,
            data_err_range,
            has_data_error: self.has_data_error || other.has_data_error,
        }
    }

    /// Merges `contribution` into an optional running accumulator.
    pub fn merge_into(
        current: Option<AxisAccumulator>,
        contribution: &AxisAccumulator,
    ) -> AxisAccumulator {
        match current {
            Some(current) => current.merge(contribution),
            None => contribution.clone(),
        }
    }

    /// Same column, scale and unit: the two can share one axis label.
    pub fn is_compatible(&self, other: &AxisAccumulator) -> bool {
        self.column.name == other.column.name
            && self.use_log == other.use_log
            && self.unit == other.unit
    }

    /// Axis label such as `log VIS2DATA` or `SPATIAL_FREQ (Mλ)`.
    pub fn label(&self) -> String {
        let mut label = String::new();
        if self.use_log {
            label.push_str("log ");
        }
        label.push_str(&self.column.name);
        if let Some(unit) = self.unit.as_ref().or(self.column.unit.as_ref()) {
            label.push_str(&format!(" ({unit})"));
        }
        label
    }
}
