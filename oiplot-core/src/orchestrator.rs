//! One plot refresh: projection of every table on every y axis, range fitting
//! and legend derivation.

use crate::accumulator::AxisAccumulator;
use crate::categories::{trim3, Categories};
use crate::converter::MICRO_METER;
use crate::error::CoreError;
use crate::fit::{fit_axis, ViewFit};
use crate::palette::{Rgba, LAMBDA_EPSILON};
use crate::projector::{Projection, ProjectionContext, SeriesProjector};
use crate::series::Series;
use crate::table::DataTable;
use log::{debug, warn};
use plotdef::{validate_plot_definition, AxisDefinition, ColorMapping, PlotDefinition};
use serde::Serialize;

/// Category legends longer than this are dropped.
pub const MAX_LEGEND_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RefreshState {
    #[default]
    Idle,
    Scanning,
    Accumulated,
    Fitted,
    Published,
}

impl RefreshState {
    fn in_progress(self) -> bool {
        matches!(
            self,
            RefreshState::Scanning | RefreshState::Accumulated | RefreshState::Fitted
        )
    }
}

/// Series and fitted y axis of one y axis definition.
#[derive(Debug, Clone)]
pub struct SubPlot {
    pub y_axis_index: usize,
    pub series: Vec<Series>,
    pub x_info: AxisAccumulator,
    pub y_info: AxisAccumulator,
    pub y_fit: ViewFit,
    pub y_label: String,
    pub n_data: usize,
    pub has_flagged_data: bool,
    pub uses_wavelengths: bool,
    pub used_baselines: Vec<String>,
    pub used_configurations: Vec<String>,
}

/// X axis shared by all sub-plots.
#[derive(Debug, Clone)]
pub struct CombinedAxis {
    pub info: AxisAccumulator,
    pub fit: ViewFit,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Legend {
    None,
    Categories(Vec<LegendEntry>),
    /// Colour scale bounds in µm.
    WavelengthScale { min: f64, max: f64 },
}

#[derive(Debug, Clone)]
pub struct PlotResult {
    pub plots: Vec<SubPlot>,
    /// `None` when no y axis has data.
    pub x_axis: Option<CombinedAxis>,
    pub legend: Legend,
    pub categories: Categories,
}

impl PlotResult {
    pub fn has_data(&self) -> bool {
        !self.plots.is_empty()
    }

    pub fn series_count(&self) -> usize {
        self.plots.iter().map(|p| p.series.len()).sum()
    }
}

/// Running totals of one sub-plot while its tables are projected.
struct SubPlotScan {
    series: Vec<Series>,
    x_info: Option<AxisAccumulator>,
    y_info: Option<AxisAccumulator>,
    n_data: usize,
    has_flagged_data: bool,
    uses_wavelengths: bool,
    used_baselines: Vec<String>,
    used_configurations: Vec<String>,
}

impl SubPlotScan {
    fn new() -> Self {
        Self {
            series: Vec::new(),
            x_info: None,
            y_info: None,
            n_data: 0,
            has_flagged_data: false,
            uses_wavelengths: false,
            used_baselines: Vec::new(),
            used_configurations: Vec::new(),
        }
    }

    fn add(&mut self, projection: Projection) {
        self.x_info = Some(AxisAccumulator::merge_into(self.x_info.take(), &projection.x_info));
        self.y_info = Some(AxisAccumulator::merge_into(self.y_info.take(), &projection.y_info));
        self.n_data += projection.n_data;
        self.has_flagged_data |= projection.has_flagged_data;
        self.uses_wavelengths |= projection.uses_wavelengths;
        extend_unique(&mut self.used_baselines, projection.used_baselines);
        extend_unique(&mut self.used_configurations, projection.used_configurations);
        self.series.extend(projection.series);
    }
}

fn extend_unique(names: &mut Vec<String>, more: Vec<String>) {
    for name in more {
        if !names.contains(&name) {
            names.push(name);
        }
    }
}

/// Drives plot refreshes; each instance runs one refresh at a time.
#[derive(Debug, Default)]
pub struct PlotOrchestrator {
    state: RefreshState,
    result: Option<PlotResult>,
}

impl PlotOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Last published result.
    pub fn result(&self) -> Option<&PlotResult> {
        match self.state {
            RefreshState::Published => self.result.as_ref(),
            _ => None,
        }
    }

    /// Abandons the current refresh, if any, and drops the published result.
    pub fn cancel(&mut self) {
        self.state = RefreshState::Idle;
        self.result = None;
    }

    /// Rebuilds all series and axis fits from `tables`.
    ///
    /// Fails with [`CoreError::RefreshInProgress`] while an earlier refresh was left
    /// unfinished; call [`cancel`](Self::cancel) first. Any other error resets the
    /// orchestrator to `Idle` without publishing.
    pub fn refresh(
        &mut self,
        definition: &PlotDefinition,
        tables: &[&dyn DataTable],
        target: Option<&str>,
    ) -> Result<&PlotResult, CoreError> {
        if self.state.in_progress() {
            return Err(CoreError::RefreshInProgress);
        }
        self.result = None;
        match self.run(definition, tables, target) {
            Ok(result) => {
                self.state = RefreshState::Published;
                let result: &PlotResult = self.result.insert(result);
                Ok(result)
            }
            Err(err) => {
                self.state = RefreshState::Idle;
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        definition: &PlotDefinition,
        tables: &[&dyn DataTable],
        target: Option<&str>,
    ) -> Result<PlotResult, CoreError> {
        validate_plot_definition(definition)?;
        self.state = RefreshState::Scanning;

        let categories = Categories::collect(tables);
        debug!("distinct baselines: {:?}", categories.baselines);
        debug!("distinct configurations: {:?}", categories.configurations);
        debug!("wavelength range: {:?}", categories.wavelength_range);
        if definition.color_mapping == ColorMapping::ObservationDate {
            warn!(
                "{} colour mapping is not supported, using {}",
                ColorMapping::ObservationDate.label(),
                ColorMapping::WavelengthRange.label()
            );
        }

        let mut scans = Vec::with_capacity(definition.y_axes.len());
        for (index, y_axis) in definition.y_axes.iter().enumerate() {
            let projector = SeriesProjector::new(ProjectionContext {
                x_axis: &definition.x_axis,
                y_axis,
                skip_flagged_data: definition.skip_flagged_data,
                target,
                color_mapping: definition.color_mapping,
                categories: &categories,
            })?;

            let mut scan = SubPlotScan::new();
            let passes: &[bool] = if projector.uses_symmetry() {
                &[true, false]
            } else {
                &[false]
            };
            for mirrored in passes {
                for (table_index, table) in tables.iter().enumerate() {
                    if let Some(projection) = projector.project(*table, table_index, *mirrored)? {
                        scan.add(projection);
                    }
                }
            }
            if scan.series.is_empty() {
                debug!("y axis {} ({}) has no data", index, y_axis.name);
                continue;
            }
            debug!(
                "y axis {} ({}): {} points in {} series",
                index,
                y_axis.name,
                scan.n_data,
                scan.series.len()
            );
            scans.push((index, y_axis, scan));
        }
        self.state = RefreshState::Accumulated;

        let mut plots = Vec::with_capacity(scans.len());
        for (y_axis_index, y_axis, scan) in scans {
            let (Some(x_info), Some(y_info)) = (scan.x_info, scan.y_info) else {
                continue;
            };
            let Some(y_fit) = fit_axis(y_axis, &y_info) else {
                continue;
            };
            plots.push(SubPlot {
                y_axis_index,
                series: scan.series,
                y_label: y_info.label(),
                x_info,
                y_info,
                y_fit,
                n_data: scan.n_data,
                has_flagged_data: scan.has_flagged_data,
                uses_wavelengths: scan.uses_wavelengths,
                used_baselines: scan.used_baselines,
                used_configurations: scan.used_configurations,
            });
        }
        let x_axis = combine_x_axis(&definition.x_axis, &plots);
        self.state = RefreshState::Fitted;

        let legend = build_legend(definition.color_mapping, &categories, &plots)?;
        Ok(PlotResult {
            plots,
            x_axis,
            legend,
            categories,
        })
    }
}

/// Merges the x ranges of every sub-plot into one axis, seeded from the first sub-plot.
fn combine_x_axis(x_axis: &AxisDefinition, plots: &[SubPlot]) -> Option<CombinedAxis> {
    let (first, rest) = plots.split_first()?;
    let mut info = first.x_info.clone();
    for plot in rest {
        if !info.is_compatible(&plot.x_info) {
            debug!(
                "merging incompatible x axes: {} and {}",
                info.label(),
                plot.x_info.label()
            );
        }
        info = info.merge(&plot.x_info);
    }
    let fit = fit_axis(x_axis, &info)?;
    Some(CombinedAxis {
        label: info.label(),
        info,
        fit,
    })
}

fn build_legend(
    mapping: ColorMapping,
    categories: &Categories,
    plots: &[SubPlot],
) -> Result<Legend, CoreError> {
    match mapping {
        ColorMapping::StationIndex | ColorMapping::Configuration => {
            let used = |name: &String| {
                plots.iter().any(|plot| match mapping {
                    ColorMapping::StationIndex => plot.used_baselines.contains(name),
                    _ => plot.used_configurations.contains(name),
                })
            };
            let mut entries = Vec::new();
            for name in categories.names(mapping).iter().filter(|n| used(*n)) {
                entries.push(LegendEntry {
                    label: name.clone(),
                    color: categories.color(mapping, name)?,
                });
            }
            if entries.len() > MAX_LEGEND_ENTRIES {
                debug!("legend dropped: {} entries", entries.len());
                return Ok(Legend::None);
            }
            Ok(Legend::Categories(entries))
        }
        ColorMapping::WavelengthRange | ColorMapping::ObservationDate => {
            let uses_wavelengths = plots.iter().any(|p| p.uses_wavelengths);
            match categories.wavelength_range {
                Some(range) if uses_wavelengths && range.length() > LAMBDA_EPSILON => {
                    Ok(Legend::WavelengthScale {
                        min: trim3(MICRO_METER.evaluate(range.min) - 1e-3),
                        max: trim3(MICRO_METER.evaluate(range.max) + 1e-3),
                    })
                }
                _ => Ok(Legend::None),
            }
        }
    }
}
