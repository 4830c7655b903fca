use crate::{PlotDefError, PlotDefinition};
use serde::Deserialize;

/// Name of the preset used when nothing else is selected.
pub const PLOT_DEFAULT: &str = "VIS2DATA_T3PHI/SPATIAL_FREQ";

const PRESETS_TOML: &str = include_str!("../resources/presets.toml");

#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default)]
    plot: Vec<PlotDefinition>,
}

pub fn parse_presets(data: &str) -> Result<Vec<PlotDefinition>, PlotDefError> {
    let file: PresetFile = toml::from_str(data)?;
    Ok(file.plot)
}

/// Built-in plot definitions in declaration order.
pub fn presets() -> Result<Vec<PlotDefinition>, PlotDefError> {
    parse_presets(PRESETS_TOML)
}

pub fn preset_names() -> Result<Vec<String>, PlotDefError> {
    Ok(presets()?.into_iter().map(|p| p.name).collect())
}

pub fn preset(name: &str) -> Result<PlotDefinition, PlotDefError> {
    presets()?
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| PlotDefError::UnknownPreset(name.to_string()))
}

pub fn default_preset() -> Result<PlotDefinition, PlotDefError> {
    preset(PLOT_DEFAULT)
}
