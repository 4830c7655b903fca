use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub mod presets;
pub use presets::{default_preset, preset, preset_names, presets, PLOT_DEFAULT};

/// Converter key scaling spatial frequencies to mega-lambda.
pub const CONVERTER_MEGA_LAMBDA: &str = "MEGA_LAMBDA";
/// Converter key scaling wavelengths from meters to microns.
pub const CONVERTER_MICRO_METER: &str = "MICRO_METER";
/// Converter key negating values (point symmetry).
pub const CONVERTER_REFLECT: &str = "REFLECT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_skip_flagged")]
    pub skip_flagged_data: bool,
    #[serde(default)]
    pub draw_line: bool,
    #[serde(default)]
    pub color_mapping: ColorMapping,
    pub x_axis: AxisDefinition,
    pub y_axes: Vec<AxisDefinition>,
}

fn default_skip_flagged() -> bool {
    true
}

/// One logical axis: source column, scale and range policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDefinition {
    pub name: String,
    #[serde(default)]
    pub log_scale: bool,
    #[serde(default)]
    pub include_zero: bool,
    #[serde(default)]
    pub range_mode: AxisRangeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<AxisRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
}

impl AxisDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log_scale: false,
            include_zero: false,
            range_mode: AxisRangeMode::default(),
            range: None,
            converter: None,
        }
    }

    pub fn with_log_scale(mut self, log_scale: bool) -> Self {
        self.log_scale = log_scale;
        self
    }

    pub fn with_include_zero(mut self, include_zero: bool) -> Self {
        self.include_zero = include_zero;
        self
    }

    pub fn with_converter(mut self, converter: impl Into<String>) -> Self {
        self.converter = Some(converter.into());
        self
    }

    pub fn with_range_mode(mut self, range_mode: AxisRangeMode) -> Self {
        self.range_mode = range_mode;
        self
    }

    /// Switches to `Fixed` mode with the given bounds; `None` leaves that edge automatic.
    pub fn with_fixed_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.range_mode = AxisRangeMode::Fixed;
        self.range = Some(AxisRange { min, max });
        self
    }

    /// Converter key, treating an empty string as no converter.
    pub fn converter_key(&self) -> Option<&str> {
        self.converter.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Fixed range, only when the axis is in `Fixed` mode.
    pub fn fixed_range(&self) -> Option<&AxisRange> {
        match self.range_mode {
            AxisRangeMode::Fixed => self.range.as_ref(),
            AxisRangeMode::Auto | AxisRangeMode::Default => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisRangeMode {
    /// Bounds follow the data only.
    Auto,
    /// Column domain is used when known, else `Auto`.
    #[default]
    Default,
    /// User range is used when valid, else `Default`.
    #[serde(alias = "Range")]
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Lower edge, `None` when unset or NaN.
    pub fn min_value(&self) -> Option<f64> {
        self.min.filter(|v| !v.is_nan())
    }

    /// Upper edge, `None` when unset or NaN.
    pub fn max_value(&self) -> Option<f64> {
        self.max.filter(|v| !v.is_nan())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorMapping {
    #[default]
    WavelengthRange,
    StationIndex,
    Configuration,
    ObservationDate,
}

impl ColorMapping {
    pub fn label(self) -> &'static str {
        match self {
            ColorMapping::WavelengthRange => "wavelength range",
            ColorMapping::StationIndex => "station index",
            ColorMapping::Configuration => "configuration",
            ColorMapping::ObservationDate => "observation date",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PlotDefError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("plot definition '{0}' not found")]
    UnknownPreset(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlotRuleError {
    #[error("plot definition has no y axis")]
    NoYAxis,
    #[error("axis {index} has no column name")]
    EmptyAxisName { index: usize },
    #[error("axis '{axis}' has a fixed range with min > max")]
    InvertedRange { axis: String },
}

/// Axis indices used in `PlotRuleError::EmptyAxisName`: 0 is the x axis, `i + 1` is y axis `i`.
pub fn validate_plot_definition(definition: &PlotDefinition) -> Result<(), PlotRuleError> {
    if definition.y_axes.is_empty() {
        return Err(PlotRuleError::NoYAxis);
    }
    let axes = std::iter::once(&definition.x_axis).chain(definition.y_axes.iter());
    for (index, axis) in axes.enumerate() {
        if axis.name.trim().is_empty() {
            return Err(PlotRuleError::EmptyAxisName { index });
        }
        if let Some(range) = axis.fixed_range() {
            if let (Some(min), Some(max)) = (range.min_value(), range.max_value()) {
                if min > max {
                    return Err(PlotRuleError::InvertedRange {
                        axis: axis.name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Spatial-frequency symmetry applies only when both axes are scaled to mega-lambda.
pub fn uses_symmetry(x_axis: &AxisDefinition, y_axis: &AxisDefinition) -> bool {
    x_axis.converter_key() == Some(CONVERTER_MEGA_LAMBDA)
        && y_axis.converter_key() == Some(CONVERTER_MEGA_LAMBDA)
}

impl PlotDefinition {
    pub fn new(name: impl Into<String>, x_axis: AxisDefinition, y_axes: Vec<AxisDefinition>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            skip_flagged_data: true,
            draw_line: false,
            color_mapping: ColorMapping::default(),
            x_axis,
            y_axes,
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PlotDefError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PlotDefError> {
        let data = fs::read(path)?;
        let definition = serde_json::from_slice(&data)?;
        Ok(definition)
    }
}
