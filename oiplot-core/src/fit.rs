//! Display range fitting for one axis.

use crate::accumulator::AxisAccumulator;
use crate::range::Range;
use log::debug;
use plotdef::{AxisDefinition, AxisRangeMode};
use serde::Serialize;

/// Fraction of the span added on each free edge.
pub const MARGIN_PERCENTS: f64 = 0.05;

/// Scrollable extent and initial visible window of an axis; `view_bounds` encloses `view_range`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewFit {
    pub view_bounds: Range,
    pub view_range: Range,
}

/// Edges pinned by the column domain, zero inclusion or a user range; they get no margin.
#[derive(Debug, Default, Clone, Copy)]
struct Pinned {
    min: bool,
    max: bool,
}

/// Computes the view fit of an axis from its accumulated ranges.
///
/// Returns `None` when the accumulator saw no data.
pub fn fit_axis(axis: &AxisDefinition, info: &AxisAccumulator) -> Option<ViewFit> {
    let data = info.data_range?;
    let data_err = info.data_err_range.unwrap_or(data);
    debug!(
        "axis {} data+err range: {} - {}, data range: {} - {}",
        axis.name, data_err.min, data_err.max, data.min, data.max
    );

    let fit = if info.use_log {
        ViewFit {
            view_bounds: log_range(data_err, 1.0),
            view_range: log_range(data, 2.0),
        }
    } else {
        fit_linear(axis, info, data_err, data)
    };

    debug!(
        "axis {} view bounds: {} - {}, view range: {} - {}",
        axis.name,
        fit.view_bounds.min,
        fit.view_bounds.max,
        fit.view_range.min,
        fit.view_range.max
    );
    Some(fit)
}

/// Snaps a positive range outwards to powers of ten at `1 / steps` decade resolution.
fn log_range(range: Range, steps: f64) -> Range {
    let mut min_ten = (range.min.log10() * steps).floor();
    let max_ten = (range.max.log10() * steps).ceil();
    if max_ten == min_ten {
        min_ten -= 1.0;
    }
    Range::new(10f64.powf(min_ten / steps), 10f64.powf(max_ten / steps))
}

fn fit_linear(axis: &AxisDefinition, info: &AxisAccumulator, data_err: Range, data: Range) -> ViewFit {
    let mode_auto = axis.range_mode == AxisRangeMode::Auto;

    let (mut bmin, mut bmax) = (data_err.min, data_err.max);
    let (mut vmin, mut vmax) = (data.min, data.max);
    let mut fix_b = Pinned::default();
    let mut fix_v = Pinned::default();

    if let Some(domain) = info.column.data_range {
        if let Some(v) = domain.min.filter(|v| !v.is_nan()) {
            if v < bmin {
                fix_b.min = true;
                bmin = v;
            }
            if !mode_auto || v < vmin {
                fix_v.min = true;
                vmin = v;
            }
        }
        if let Some(v) = domain.max.filter(|v| !v.is_nan()) {
            if v > bmax {
                fix_b.max = true;
                bmax = v;
            }
            if !mode_auto || v > vmax {
                fix_v.max = true;
                vmax = v;
            }
        }
    }

    if axis.include_zero {
        if bmin > 0.0 {
            fix_b.min = true;
            bmin = 0.0;
        }
        if vmin > 0.0 {
            fix_v.min = true;
            vmin = 0.0;
        }
        if bmax < 0.0 {
            fix_b.max = true;
            bmax = 0.0;
        }
        if vmax < 0.0 {
            fix_v.max = true;
            vmax = 0.0;
        }
    }

    if let Some(range) = axis.fixed_range() {
        if let Some(min) = range.min_value() {
            fix_v.min = true;
            vmin = min;
        }
        if let Some(max) = range.max_value() {
            fix_v.max = true;
            vmax = max;
        }
    }

    if vmin > vmax {
        if fix_v.min {
            vmax = bmax;
        }
        if fix_v.max {
            vmin = bmin;
        }
    }

    let (bmin, bmax) = add_margins(bmin, bmax, fix_b);
    let (vmin, vmax) = add_margins(vmin, vmax, fix_v);

    ViewFit {
        view_bounds: Range::new(bmin.min(vmin), bmax.max(vmax)),
        view_range: Range::new(vmin, vmax),
    }
}

/// Widens the free edges by a fraction of the span; a zero span widens both edges around `min`.
fn add_margins(mut min: f64, mut max: f64, pinned: Pinned) -> (f64, f64) {
    let margin = (max - min) * MARGIN_PERCENTS;
    if margin > 0.0 {
        if !pinned.min {
            min -= margin;
        }
        if !pinned.max {
            max += margin;
        }
    } else {
        let margin = min.abs() * MARGIN_PERCENTS;
        min -= margin;
        max += margin;
    }
    if max == min {
        max = min + 1.0;
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::RangeTracker;
    use crate::table::{ColumnMeta, DomainRange};

    const EPS: f64 = 1e-12;

    fn info(column: ColumnMeta, data: (f64, f64), err: Option<(f64, f64)>, use_log: bool) -> AxisAccumulator {
        let mut d = RangeTracker::default();
        d.add(data.0);
        d.add(data.1);
        let mut e = RangeTracker::default();
        if let Some((lo, hi)) = err {
            e.add(lo);
            e.add(hi);
        }
        AxisAccumulator::from_scan(column, None, use_log, &d, &e, err.is_some()).expect("info")
    }

    fn assert_range(actual: Range, min: f64, max: f64) {
        assert!(
            (actual.min - min).abs() < EPS && (actual.max - max).abs() < EPS,
            "expected [{min}, {max}], got [{}, {}]",
            actual.min,
            actual.max
        );
    }

    fn assert_view_within_bounds(fit: &ViewFit) {
        assert!(fit.view_bounds.encloses(&fit.view_range));
        assert!(fit.view_bounds.max > fit.view_bounds.min);
    }

    #[test]
    fn free_range_gets_margins() {
        let fit = fit_axis(&AxisDefinition::new("Y"), &info(ColumnMeta::scalar("Y"), (0.0, 10.0), None, false))
            .expect("fit");
        assert_range(fit.view_range, -0.5, 10.5);
        assert_range(fit.view_bounds, -0.5, 10.5);
    }

    #[test]
    fn include_zero_pins_lower_edge() {
        let axis = AxisDefinition::new("Y").with_include_zero(true);
        let fit = fit_axis(&axis, &info(ColumnMeta::scalar("Y"), (2.0, 9.0), None, false)).expect("fit");
        assert_eq!(fit.view_range.min, 0.0);
        assert_eq!(fit.view_bounds.min, 0.0);
        assert_range(fit.view_range, 0.0, 9.45);
        assert_view_within_bounds(&fit);
    }

    #[test]
    fn include_zero_pins_upper_edge_of_negative_data() {
        let axis = AxisDefinition::new("Y").with_include_zero(true);
        let fit = fit_axis(&axis, &info(ColumnMeta::scalar("Y"), (-8.0, -4.0), None, false)).expect("fit");
        assert_eq!(fit.view_range.max, 0.0);
        assert_eq!(fit.view_bounds.max, 0.0);
        assert_range(fit.view_range, -8.4, 0.0);
    }

    #[test]
    fn fixed_range_overrides_view() {
        let axis = AxisDefinition::new("Y").with_fixed_range(Some(1.0), Some(5.0));
        let fit = fit_axis(&axis, &info(ColumnMeta::scalar("Y"), (2.0, 9.0), None, false)).expect("fit");
        assert_range(fit.view_range, 1.0, 5.0);
        assert!(fit.view_bounds.min <= 1.0);
        assert!(fit.view_bounds.max >= 9.0);
        assert_range(fit.view_bounds, 1.0, 9.35);
        assert_view_within_bounds(&fit);
    }

    #[test]
    fn partial_fixed_range_keeps_other_edge() {
        let axis = AxisDefinition::new("Y").with_fixed_range(None, Some(5.0));
        let fit = fit_axis(&axis, &info(ColumnMeta::scalar("Y"), (2.0, 9.0), None, false)).expect("fit");
        // view [2, 5] gets a margin on the free lower edge only
        assert_range(fit.view_range, 1.85, 5.0);
    }

    #[test]
    fn inverted_fixed_range_is_repaired_from_bounds() {
        let axis = AxisDefinition::new("Y").with_fixed_range(Some(20.0), None);
        let acc = info(ColumnMeta::scalar("Y"), (2.0, 9.0), Some((1.0, 30.0)), false);
        let fit = fit_axis(&axis, &acc).expect("fit");
        // vmax falls back to the error bound, then gets its margin
        assert_range(fit.view_range, 20.0, 30.5);
        assert_range(fit.view_bounds, -0.45, 31.45);
        assert_view_within_bounds(&fit);
    }

    #[test]
    fn domain_pins_view_unless_auto() {
        let column = ColumnMeta::scalar("VIS2DATA").with_data_range(DomainRange::UNIT);
        let acc = info(column, (-0.1, 0.8), None, false);

        let fit = fit_axis(&AxisDefinition::new("VIS2DATA"), &acc).expect("fit");
        assert_range(fit.view_range, 0.0, 1.0);
        assert_range(fit.view_bounds, -0.155, 1.0);

        let auto = AxisDefinition::new("VIS2DATA").with_range_mode(AxisRangeMode::Auto);
        let fit = fit_axis(&auto, &acc).expect("fit");
        assert_range(fit.view_range, -0.155, 1.0);
        assert_view_within_bounds(&fit);
    }

    #[test]
    fn degenerate_ranges_are_widened() {
        let axis = AxisDefinition::new("Y");
        let fit = fit_axis(&axis, &info(ColumnMeta::scalar("Y"), (4.0, 4.0), None, false)).expect("fit");
        assert_range(fit.view_range, 3.8, 4.2);

        let fit = fit_axis(&axis, &info(ColumnMeta::scalar("Y"), (0.0, 0.0), None, false)).expect("fit");
        assert_range(fit.view_range, 0.0, 1.0);
        assert_view_within_bounds(&fit);
    }

    #[test]
    fn error_range_drives_bounds() {
        let fit = fit_axis(
            &AxisDefinition::new("Y"),
            &info(ColumnMeta::scalar("Y"), (0.0, 10.0), Some((-10.0, 20.0)), false),
        )
        .expect("fit");
        assert_range(fit.view_range, -0.5, 10.5);
        assert_range(fit.view_bounds, -11.5, 21.5);
    }

    #[test]
    fn log_scale_snaps_to_decades() {
        let axis = AxisDefinition::new("Y").with_log_scale(true);
        let fit = fit_axis(&axis, &info(ColumnMeta::scalar("Y"), (0.02, 0.5), Some((0.015, 0.6)), true))
            .expect("fit");
        assert_range(fit.view_bounds, 0.01, 1.0);
        // half-decade steps: log10(0.02) * 2 floors to -4, log10(0.5) * 2 ceils to 0
        assert_range(fit.view_range, 0.01, 1.0);
    }

    #[test]
    fn log_scale_single_decade_widens_down() {
        let axis = AxisDefinition::new("Y").with_log_scale(true);
        let fit = fit_axis(&axis, &info(ColumnMeta::scalar("Y"), (10.0, 10.0), None, true)).expect("fit");
        assert_range(fit.view_bounds, 1.0, 10.0);
        assert_range(fit.view_range, 10f64.sqrt(), 10.0);
    }

    #[test]
    fn fitting_is_idempotent() {
        let axis = AxisDefinition::new("Y")
            .with_include_zero(true)
            .with_fixed_range(None, Some(7.5));
        let acc = info(ColumnMeta::scalar("Y"), (1.25, 9.0), Some((0.5, 11.0)), false);
        let first = fit_axis(&axis, &acc).expect("fit");
        let second = fit_axis(&axis, &acc).expect("fit");
        assert_eq!(first.view_bounds.min.to_bits(), second.view_bounds.min.to_bits());
        assert_eq!(first.view_bounds.max.to_bits(), second.view_bounds.max.to_bits());
        assert_eq!(first.view_range.min.to_bits(), second.view_range.min.to_bits());
        assert_eq!(first.view_range.max.to_bits(), second.view_range.max.to_bits());
        assert_view_within_bounds(&first);
    }
}
