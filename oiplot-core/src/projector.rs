//! Projection of one measurement table onto one (x, y) axis pair.
//!
//! Rows are grouped into one series per (baseline, spectral channel). Each
//! retained point carries its converted value and, when the column has a paired
//! error column, a symmetric error interval. Observed ranges are returned as a
//! pair of [`AxisAccumulator`]s for the caller to merge.

use crate::accumulator::AxisAccumulator;
use crate::categories::Categories;
use crate::converter::{Converter, ConverterRegistry, REFLECT};
use crate::error::CoreError;
use crate::palette::{wavelength_colors, Rgba};
use crate::range::RangeTracker;
use crate::series::{PointShape, ScanArena, ScanPoint, Series, SeriesKey};
use crate::table::{ColumnData, ColumnMeta, DataTable};
use log::{debug, trace};
use plotdef::{uses_symmetry, AxisDefinition, ColorMapping};

/// Lower error bound used on a log axis when `value - error <= 0` (smallest positive subnormal).
pub const LOG_LOWER_CLAMP: f64 = 5e-324;

/// Settings shared by every table projected for one sub-plot.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    pub x_axis: &'a AxisDefinition,
    pub y_axis: &'a AxisDefinition,
    pub skip_flagged_data: bool,
    /// Selected target; rows of multi-target tables must match it.
    pub target: Option<&'a str>,
    pub color_mapping: ColorMapping,
    pub categories: &'a Categories,
}

/// Series and axis ranges contributed by one table.
#[derive(Debug, Clone)]
pub struct Projection {
    pub series: Vec<Series>,
    pub x_info: AxisAccumulator,
    pub y_info: AxisAccumulator,
    pub n_data: usize,
    pub n_skip_flag: usize,
    pub n_skip_target: usize,
    pub has_flagged_data: bool,
    pub uses_wavelengths: bool,
    pub used_baselines: Vec<String>,
    pub used_configurations: Vec<String>,
}

pub struct SeriesProjector<'a> {
    ctx: ProjectionContext<'a>,
    x_converter: Option<Converter>,
    y_converter: Option<Converter>,
}

struct AxisColumn<'t> {
    meta: &'t ColumnMeta,
    values: ColumnData<'t>,
    errors: Option<ColumnData<'t>>,
    use_log: bool,
}

impl<'t> AxisColumn<'t> {
    fn resolve(table: &'t dyn DataTable, axis: &AxisDefinition) -> Option<Self> {
        let meta = table.column_meta(&axis.name)?;
        let values = table.column(&axis.name)?;
        let errors = meta
            .error_column
            .as_deref()
            .and_then(|name| table.column(name));
        Some(Self {
            meta,
            values,
            errors,
            use_log: axis.log_scale,
        })
    }

    /// Converted value, NaN outside the log domain.
    fn value(&self, row: usize, channel: usize, conversion: Conversion<'_>) -> f64 {
        let value = conversion.value(self.values.value(row, channel));
        if self.use_log && value <= 0.0 {
            f64::NAN
        } else {
            value
        }
    }

    fn error(&self, row: usize, channel: usize) -> f64 {
        self.errors
            .map_or(f64::NAN, |errors| errors.value(row, channel))
    }
}

/// Reflection first, then the axis converter.
#[derive(Clone, Copy)]
struct Conversion<'c> {
    initial: Option<&'c Converter>,
    scale: Option<&'c Converter>,
}

impl Conversion<'_> {
    fn value(&self, mut value: f64) -> f64 {
        if let Some(c) = self.initial {
            value = c.evaluate(value);
        }
        if let Some(c) = self.scale {
            value = c.evaluate(value);
        }
        value
    }

    fn error(&self, mut error: f64) -> f64 {
        if let Some(c) = self.initial {
            error = c.evaluate_error(error);
        }
        if let Some(c) = self.scale {
            error = c.evaluate_error(error);
        }
        error
    }
}

struct Sample {
    value: f64,
    lower: f64,
    upper: f64,
    /// False for a negative error value.
    error_valid: bool,
    /// The lower bound was clamped into the log domain and must not widen the error range.
    lower_clamped: bool,
    has_error: bool,
}

impl Sample {
    fn new(value: f64, error: f64, use_log: bool, conversion: Conversion<'_>) -> Self {
        if !error.is_finite() {
            return Self {
                value,
                lower: f64::NAN,
                upper: f64::NAN,
                error_valid: true,
                lower_clamped: false,
                has_error: false,
            };
        }
        let (error, error_valid) = if error >= 0.0 {
            (conversion.error(error), true)
        } else {
            (f64::INFINITY, false)
        };
        let lower = value - error;
        let lower_clamped = use_log && lower <= 0.0;
        Self {
            value,
            lower: if lower_clamped { LOG_LOWER_CLAMP } else { lower },
            upper: value + error,
            error_valid,
            lower_clamped,
            has_error: true,
        }
    }
}

#[derive(Default)]
struct AxisScan {
    data: RangeTracker,
    data_err: RangeTracker,
    has_error: bool,
}

impl AxisScan {
    fn add(&mut self, sample: &Sample) {
        self.data.add(sample.value);
        if sample.has_error && sample.error_valid {
            if !sample.lower_clamped {
                self.data_err.add(sample.lower);
            }
            self.data_err.add(sample.upper);
        }
        self.has_error |= sample.has_error;
    }

    fn finish(&self, column: &AxisColumn<'_>, converter: Option<&Converter>) -> Option<AxisAccumulator> {
        AxisAccumulator::from_scan(
            column.meta.clone(),
            converter.and_then(Converter::unit).map(str::to_string),
            column.use_log,
            &self.data,
            &self.data_err,
            self.has_error,
        )
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

impl<'a> SeriesProjector<'a> {
    /// Resolves the axis converters; fails on an unknown converter key.
    pub fn new(ctx: ProjectionContext<'a>) -> Result<Self, CoreError> {
        Ok(Self {
            x_converter: ConverterRegistry::get(ctx.x_axis.converter_key())?,
            y_converter: ConverterRegistry::get(ctx.y_axis.converter_key())?,
            ctx,
        })
    }

    /// Whether a mirrored pass is produced for this axis pair.
    pub fn uses_symmetry(&self) -> bool {
        uses_symmetry(self.ctx.x_axis, self.ctx.y_axis)
    }

    fn color_mapping(&self) -> ColorMapping {
        match self.ctx.color_mapping {
            ColorMapping::ObservationDate => ColorMapping::WavelengthRange,
            mapping => mapping,
        }
    }

    /// Projects `table`; `mirrored` reflects both coordinates before the axis converters.
    ///
    /// Returns `Ok(None)` when an axis column is missing on the table or no row is retained.
    pub fn project(
        &self,
        table: &dyn DataTable,
        table_index: usize,
        mirrored: bool,
    ) -> Result<Option<Projection>, CoreError> {
        let Some(y) = AxisColumn::resolve(table, self.ctx.y_axis) else {
            trace!("column {} not found on {}", self.ctx.y_axis.name, table.name());
            return Ok(None);
        };
        let Some(x) = AxisColumn::resolve(table, self.ctx.x_axis) else {
            trace!("column {} not found on {}", self.ctx.x_axis.name, table.name());
            return Ok(None);
        };

        let initial = mirrored.then_some(&REFLECT);
        let x_conv = Conversion {
            initial,
            scale: self.x_converter.as_ref(),
        };
        let y_conv = Conversion {
            initial,
            scale: self.y_converter.as_ref(),
        };

        let n_rows = table.n_rows();
        let uses_wavelengths = x.values.is_array() || y.values.is_array();
        let n_channels = if uses_wavelengths { table.n_channels() } else { 1 };
        let n_baselines = table.baseline_names().len();
        let check_flags = table.n_flagged() > 0;
        let skip_flagged = self.ctx.skip_flagged_data;

        // Some(expected) when rows must match a target id; Some(None) rejects every row.
        let target_filter = match self.ctx.target {
            Some(name) if !table.has_single_target() => Some(table.target_id_for(name)),
            _ => None,
        };

        let mapping = self.color_mapping();
        let channel_colors = if mapping == ColorMapping::WavelengthRange {
            wavelength_colors(
                table.effective_wavelengths(),
                n_channels,
                uses_wavelengths,
                self.ctx.categories.wavelength_range,
            )
        } else {
            Vec::new()
        };

        let mut arena = ScanArena::with_capacity(n_rows);
        let mut x_scan = AxisScan::default();
        let mut y_scan = AxisScan::default();
        let mut series = Vec::new();
        let mut used_baselines = Vec::new();
        let mut used_configurations = Vec::new();
        let mut n_data = 0;
        let mut n_skip_flag = 0;
        let mut n_skip_target = 0;
        let mut has_flagged_data = false;

        for channel in 0..n_channels {
            for baseline in 0..n_baselines {
                let mut configuration = None;

                for row in 0..n_rows {
                    if table.baseline_id(row) != baseline {
                        continue;
                    }

                    let mut flagged = false;
                    if check_flags && row_flagged(table, row, channel, uses_wavelengths) {
                        if skip_flagged {
                            n_skip_flag += 1;
                            continue;
                        }
                        has_flagged_data = true;
                        flagged = true;
                    }

                    if let Some(expected) = target_filter {
                        if table.target_id(row) != expected {
                            n_skip_target += 1;
                            continue;
                        }
                    }

                    let y_value = y.value(row, channel, y_conv);
                    if !y_value.is_finite() {
                        continue;
                    }
                    let x_value = x.value(row, channel, x_conv);
                    if !x_value.is_finite() {
                        continue;
                    }

                    let ys = Sample::new(y_value, y.error(row, channel), y.use_log, y_conv);
                    let xs = Sample::new(x_value, x.error(row, channel), x.use_log, x_conv);
                    y_scan.add(&ys);
                    x_scan.add(&xs);

                    let shape = if flagged || !ys.error_valid || !xs.error_valid {
                        PointShape::Invalid
                    } else {
                        PointShape::Valid
                    };
                    arena.push(ScanPoint {
                        row,
                        x: xs.value,
                        x_lower: xs.lower,
                        x_upper: xs.upper,
                        y: ys.value,
                        y_lower: ys.lower,
                        y_upper: ys.upper,
                        shape,
                    });
                    configuration = Some(table.configuration_id(row));
                }

                if arena.len() == 0 {
                    continue;
                }
                n_data += arena.len();

                let baseline_name = table.baseline_names()[baseline].clone();
                let configuration_name = configuration
                    .and_then(|id| table.configuration_names().get(id))
                    .cloned()
                    .unwrap_or_default();
                let color = match mapping {
                    ColorMapping::StationIndex => {
                        self.ctx.categories.color(mapping, &baseline_name)?
                    }
                    ColorMapping::Configuration => {
                        self.ctx.categories.color(mapping, &configuration_name)?
                    }
                    ColorMapping::WavelengthRange | ColorMapping::ObservationDate => channel_colors
                        .get(channel)
                        .copied()
                        .unwrap_or(Rgba::BLACK),
                };

                push_unique(&mut used_baselines, &baseline_name);
                push_unique(&mut used_configurations, &configuration_name);

                let key = SeriesKey {
                    table_index,
                    baseline_index: baseline,
                    channel_index: uses_wavelengths.then_some(channel),
                    mirrored,
                    baseline_name,
                    configuration_name,
                };
                series.push(arena.take_series(key, color));
            }
        }

        if n_skip_flag != 0 || n_skip_target != 0 {
            debug!(
                "{}: skipped {} flagged and {} off-target points",
                table.name(),
                n_skip_flag,
                n_skip_target
            );
        }

        let (Some(x_info), Some(y_info)) = (
            x_scan.finish(&x, self.x_converter.as_ref()),
            y_scan.finish(&y, self.y_converter.as_ref()),
        ) else {
            trace!("{}: no retained point for {}", table.name(), self.ctx.y_axis.name);
            return Ok(None);
        };

        debug!(
            "{}: {} points in {} series for {} vs {}{}",
            table.name(),
            n_data,
            series.len(),
            self.ctx.y_axis.name,
            self.ctx.x_axis.name,
            if mirrored { " (mirrored)" } else { "" }
        );

        Ok(Some(Projection {
            series,
            x_info,
            y_info,
            n_data,
            n_skip_flag,
            n_skip_target,
            has_flagged_data,
            uses_wavelengths,
            used_baselines,
            used_configurations,
        }))
    }
}

/// Per-channel flag; without an array axis a row counts as flagged only when every channel is.
fn row_flagged(table: &dyn DataTable, row: usize, channel: usize, per_channel: bool) -> bool {
    if per_channel {
        table.is_flagged(row, channel)
    } else {
        (0..table.n_channels()).all(|ch| table.is_flagged(row, ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_error_invalidates_point_only() {
        let conv = Conversion {
            initial: None,
            scale: None,
        };
        let s = Sample::new(2.0, -0.5, false, conv);
        assert!(s.has_error);
        assert!(!s.error_valid);
        assert!(!s.lower_clamped);
        assert_eq!(s.upper, f64::INFINITY);
    }

    #[test]
    fn log_axis_clamps_lower_error() {
        let conv = Conversion {
            initial: None,
            scale: None,
        };
        let s = Sample::new(0.5, 1.0, true, conv);
        assert_eq!(s.lower, LOG_LOWER_CLAMP);
        assert!(s.lower > 0.0);
        assert!(s.error_valid);
        assert!(s.lower_clamped);
    }

    #[test]
    fn reflection_keeps_error_spread() {
        let scale = crate::converter::MEGA_LAMBDA;
        let conv = Conversion {
            initial: Some(&REFLECT),
            scale: Some(&scale),
        };
        let s = Sample::new(conv.value(2.0e6), 1.0e6, false, conv);
        assert!((s.value + 2.0).abs() < 1e-12);
        assert!((s.lower + 3.0).abs() < 1e-12);
        assert!((s.upper + 1.0).abs() < 1e-12);
    }
}
