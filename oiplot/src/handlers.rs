use crate::commands::Commands;
use crate::output::*;
use oiplot_core::{ConverterRegistry, DataTable, OiTable, PlotOrchestrator};
use plotdef::PlotDefinition;
use std::path::{Path, PathBuf};

pub fn handle_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Presets => print_preset_list(&plotdef::preset_names()?),
        Commands::ShowPreset { name } => {
            let definition = plotdef::preset(&name)?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        Commands::Converters => {
            let mut converters = Vec::new();
            for key in ConverterRegistry::keys() {
                let unit = ConverterRegistry::get(Some(key))?.and_then(|c| c.unit());
                converters.push((key, unit));
            }
            print_converter_list(&converters);
        }
        Commands::Fit {
            tables,
            plot,
            preset,
            target,
            json,
            default_converters,
        } => {
            let mut definition = load_definition(plot, preset)?;
            if default_converters {
                apply_default_converters(&mut definition);
            }
            handle_fit(&tables, &definition, target.as_deref(), json)?
        }
    }
    Ok(())
}

fn load_definition(
    plot: Option<PathBuf>,
    preset: Option<String>,
) -> Result<PlotDefinition, plotdef::PlotDefError> {
    match (plot, preset) {
        (Some(path), _) => PlotDefinition::load_from_file(path),
        (None, Some(name)) => plotdef::preset(&name),
        (None, None) => plotdef::default_preset(),
    }
}

/// Fills in the column's usual converter on every axis that has none.
fn apply_default_converters(definition: &mut PlotDefinition) {
    let axes = std::iter::once(&mut definition.x_axis).chain(definition.y_axes.iter_mut());
    for axis in axes {
        if axis.converter_key().is_some() {
            continue;
        }
        if let Some(key) = ConverterRegistry::default_for_column(&axis.name) {
            log::debug!("axis {} uses default converter {key}", axis.name);
            axis.converter = Some(key.to_string());
        }
    }
}

fn handle_fit(
    tables: &Path,
    definition: &PlotDefinition,
    target: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tables = OiTable::load_all_from_file(tables)?;
    log::debug!("loaded {} tables", tables.len());
    let tables: Vec<&dyn DataTable> = tables.iter().map(|t| t as &dyn DataTable).collect();

    let mut orchestrator = PlotOrchestrator::new();
    let result = orchestrator.refresh(definition, &tables, target)?;
    if json {
        let report = FitReport::new(definition, result);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_fit(definition, result);
    }
    Ok(())
}
