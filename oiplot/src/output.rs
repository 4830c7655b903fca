use oiplot_core::{AxisAccumulator, Legend, PlotResult, Range, SubPlot, ViewFit};
use plotdef::{PlotDefinition, PLOT_DEFAULT};
use serde::Serialize;

pub fn print_info(message: &str) {
    println!("[oiplot][INFO] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[oiplot][ERROR]: {message}");
}

pub fn print_preset_list(names: &[String]) {
    print_info("Built-in plot definitions:");
    for name in names {
        if name == PLOT_DEFAULT {
            println!("{name} (default)");
        } else {
            println!("{name}");
        }
    }
}

pub fn print_converter_list(converters: &[(&str, Option<&str>)]) {
    print_info("Unit converters:");
    for (key, unit) in converters {
        match unit {
            Some(unit) => println!("{key} ({unit})"),
            None => println!("{key}"),
        }
    }
}

#[derive(Serialize)]
pub struct AxisReport {
    pub label: String,
    pub data_range: Option<Range>,
    pub data_err_range: Option<Range>,
    pub has_data_error: bool,
    pub fit: ViewFit,
}

impl AxisReport {
    fn new(label: &str, info: &AxisAccumulator, fit: ViewFit) -> Self {
        Self {
            label: label.to_string(),
            data_range: info.data_range,
            data_err_range: info.data_err_range,
            has_data_error: info.has_data_error,
            fit,
        }
    }
}

#[derive(Serialize)]
pub struct SubPlotReport {
    pub y_axis_index: usize,
    pub y_axis: AxisReport,
    pub series: usize,
    pub points: usize,
    pub has_flagged_data: bool,
    pub uses_wavelengths: bool,
    pub baselines: Vec<String>,
    pub configurations: Vec<String>,
}

impl SubPlotReport {
    fn new(plot: &SubPlot) -> Self {
        Self {
            y_axis_index: plot.y_axis_index,
            y_axis: AxisReport::new(&plot.y_label, &plot.y_info, plot.y_fit),
            series: plot.series.len(),
            points: plot.n_data,
            has_flagged_data: plot.has_flagged_data,
            uses_wavelengths: plot.uses_wavelengths,
            baselines: plot.used_baselines.clone(),
            configurations: plot.used_configurations.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct FitReport {
    pub plot: String,
    pub draw_line: bool,
    pub x_axis: Option<AxisReport>,
    pub plots: Vec<SubPlotReport>,
    pub legend: Legend,
}

impl FitReport {
    pub fn new(definition: &PlotDefinition, result: &PlotResult) -> Self {
        Self {
            plot: definition.name.clone(),
            draw_line: definition.draw_line,
            x_axis: result
                .x_axis
                .as_ref()
                .map(|x| AxisReport::new(&x.label, &x.info, x.fit)),
            plots: result.plots.iter().map(SubPlotReport::new).collect(),
            legend: result.legend.clone(),
        }
    }
}

fn format_range(range: &Range) -> String {
    format!("[{}, {}]", range.min, range.max)
}

fn print_axis(name: &str, label: &str, fit: &ViewFit) {
    println!(
        "{name}: {label} view {} bounds {}",
        format_range(&fit.view_range),
        format_range(&fit.view_bounds)
    );
}

pub fn print_fit(definition: &PlotDefinition, result: &PlotResult) {
    if !result.has_data() {
        print_info(&format!("{}: no data to plot", definition.name));
        return;
    }
    print_info(&format!(
        "{}: {} plots, {} series",
        definition.name,
        result.plots.len(),
        result.series_count()
    ));
    if let Some(x) = &result.x_axis {
        print_axis("x", &x.label, &x.fit);
    }
    for plot in &result.plots {
        print_axis(
            &format!("y[{}]", plot.y_axis_index),
            &plot.y_label,
            &plot.y_fit,
        );
        let flagged = if plot.has_flagged_data { ", flagged data" } else { "" };
        println!(
            "\t{} points in {} series{flagged}",
            plot.n_data,
            plot.series.len()
        );
    }
    match &result.legend {
        Legend::None => {}
        Legend::Categories(entries) => {
            let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
            println!("legend: {}", labels.join(", "));
        }
        Legend::WavelengthScale { min, max } => println!("legend: {min} - {max} µm"),
    }
}
