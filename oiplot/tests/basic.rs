use plotdef::{AxisDefinition, PlotDefinition, PLOT_DEFAULT};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const TABLES: &str = r#"[
  {
    "name": "OI_VIS2",
    "wavelengths": [2.0e-6, 2.2e-6],
    "baselines": ["A0-B1", "B1-C2"],
    "baseline_ids": [0, 1, 0, 1],
    "columns": [
      { "name": "UCOORD", "values": [30.0, 10.0, 40.0, -20.0] },
      { "name": "VCOORD", "values": [40.0, 20.0, 30.0, 5.0] },
      { "name": "VIS2DATA", "error_column": "VIS2ERR",
        "array_values": [[0.9, 0.8], [0.7, 0.6], [0.5, null], [0.3, 0.2]] },
      { "name": "VIS2ERR",
        "array_values": [[0.01, 0.01], [0.02, 0.02], [0.01, 0.01], [0.05, 0.05]] }
    ]
  }
]"#;

fn oiplot(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_oiplot"))
        .args(args)
        .output()
        .expect("run oiplot")
}

fn write_tables(dir: &Path) -> PathBuf {
    let path = dir.join("tables.json");
    std::fs::write(&path, TABLES).expect("write tables");
    path
}

#[test]
fn presets_lists_default() {
    let output = oiplot(&["presets"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("{PLOT_DEFAULT} (default)")));
    assert!(stdout.contains("VCOORD/UCOORD"));
}

#[test]
fn show_preset_prints_definition() {
    let output = oiplot(&["show-preset", "VIS2DATA/SPATIAL_FREQ"]);
    assert!(output.status.success());
    let definition: PlotDefinition =
        serde_json::from_slice(&output.stdout).expect("plot definition json");
    assert_eq!(definition.name, "VIS2DATA/SPATIAL_FREQ");
    assert_eq!(definition.y_axes[0].name, "VIS2DATA");
}

#[test]
fn fit_reports_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tables = write_tables(dir.path());
    let output = oiplot(&[
        "fit",
        "--tables",
        tables.to_str().expect("path"),
        "--preset",
        "VIS2DATA/SPATIAL_FREQ",
        "--json",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report json");
    assert_eq!(report["plot"], "VIS2DATA/SPATIAL_FREQ");
    assert_eq!(report["draw_line"], false);
    let plot = &report["plots"][0];
    assert_eq!(plot["points"], 7);
    assert_eq!(plot["series"], 4);
    assert_eq!(plot["y_axis"]["has_data_error"], true);
    assert!(report["x_axis"]["label"]
        .as_str()
        .expect("label")
        .starts_with("SPATIAL_FREQ"));
    assert!(report["legend"]["WavelengthScale"].is_object());
}

#[test]
fn fit_reads_plot_definition_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tables = write_tables(dir.path());
    let plot_path = dir.path().join("plot.json");
    PlotDefinition::new(
        "baseline",
        AxisDefinition::new("BASELINE"),
        vec![AxisDefinition::new("VIS2DATA").with_include_zero(true)],
    )
    .save_to_file(&plot_path)
    .expect("save plot");

    let output = oiplot(&[
        "fit",
        "--tables",
        tables.to_str().expect("path"),
        "--plot",
        plot_path.to_str().expect("path"),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[oiplot][INFO] baseline: 1 plots"));
    assert!(stdout.contains("x: BASELINE (m)"));
}

#[test]
fn converters_lists_keys_with_units() {
    let output = oiplot(&["converters"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("MEGA_LAMBDA (Mλ)"));
    assert!(stdout.contains("MICRO_METER (µm)"));
    assert!(stdout.lines().any(|line| line == "REFLECT"));
}

#[test]
fn fit_applies_default_converters_on_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tables = write_tables(dir.path());
    let plot_path = dir.path().join("plot.json");
    PlotDefinition::new(
        "freq",
        AxisDefinition::new("SPATIAL_FREQ"),
        vec![AxisDefinition::new("VIS2DATA")],
    )
    .save_to_file(&plot_path)
    .expect("save plot");
    let base = [
        "fit",
        "--tables",
        tables.to_str().expect("path"),
        "--plot",
        plot_path.to_str().expect("path"),
    ];

    let plain = oiplot(&base);
    assert!(plain.status.success());
    assert!(String::from_utf8_lossy(&plain.stdout).contains("x: SPATIAL_FREQ (rad-1)"));

    let mut args = base.to_vec();
    args.push("--default-converters");
    let converted = oiplot(&args);
    assert!(converted.status.success());
    assert!(String::from_utf8_lossy(&converted.stdout).contains("x: SPATIAL_FREQ (Mλ)"));
}

#[test]
fn fit_fails_on_unknown_preset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tables = write_tables(dir.path());
    let output = oiplot(&[
        "fit",
        "--tables",
        tables.to_str().expect("path"),
        "--preset",
        "NOPE",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[oiplot][ERROR]"));
    assert!(stderr.contains("NOPE"));
}

#[test]
fn fit_fails_on_missing_tables() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.json");
    let output = oiplot(&["fit", "--tables", missing.to_str().expect("path")]);
    assert!(!output.status.success());
}

#[test]
fn help_describes_every_subcommand() {
    let output = oiplot(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in [
        "List built-in plot definitions",
        "Print a built-in plot definition as JSON",
        "List unit converter keys",
        "Project tables onto a plot definition",
    ] {
        assert!(stdout.contains(line), "missing '{line}'");
    }
}
