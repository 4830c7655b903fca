use plotdef::{
    default_preset, preset, preset_names, uses_symmetry, validate_plot_definition,
    AxisDefinition, AxisRangeMode, ColorMapping, PlotDefError, PlotDefinition, PlotRuleError,
    CONVERTER_MEGA_LAMBDA, PLOT_DEFAULT,
};

#[test]
fn save_and_load_plot_definition() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plot.json");

    let mut definition = PlotDefinition::new(
        "custom",
        AxisDefinition::new("EFF_WAVE").with_converter("MICRO_METER"),
        vec![
            AxisDefinition::new("VIS2DATA").with_include_zero(true),
            AxisDefinition::new("T3PHI").with_fixed_range(Some(-90.0), None),
        ],
    );
    definition.color_mapping = ColorMapping::Configuration;
    definition.skip_flagged_data = false;

    definition.save_to_file(&path).expect("save");
    let loaded = PlotDefinition::load_from_file(&path).expect("load");

    assert_eq!(loaded, definition);
    assert_eq!(loaded.y_axes[1].range_mode, AxisRangeMode::Fixed);
    assert_eq!(loaded.y_axes[1].fixed_range().and_then(|r| r.max_value()), None);
}

#[test]
fn minimal_json_uses_defaults() {
    let json = r#"{
        "name": "minimal",
        "x_axis": { "name": "SPATIAL_FREQ" },
        "y_axes": [ { "name": "VIS2DATA" } ]
    }"#;
    let definition: PlotDefinition = serde_json::from_str(json).expect("parse");
    assert!(definition.skip_flagged_data);
    assert!(!definition.draw_line);
    assert_eq!(definition.color_mapping, ColorMapping::WavelengthRange);
    assert_eq!(definition.x_axis.range_mode, AxisRangeMode::Default);
    assert!(definition.x_axis.range.is_none());
}

#[test]
fn load_missing_file_reports_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = PlotDefinition::load_from_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(PlotDefError::Io(_))));
}

#[test]
fn validation_rejects_missing_y_axis() {
    let definition = PlotDefinition::new("empty", AxisDefinition::new("EFF_WAVE"), Vec::new());
    assert_eq!(
        validate_plot_definition(&definition),
        Err(PlotRuleError::NoYAxis)
    );
}

#[test]
fn validation_rejects_blank_axis_name() {
    let definition = PlotDefinition::new(
        "blank",
        AxisDefinition::new("EFF_WAVE"),
        vec![AxisDefinition::new("VIS2DATA"), AxisDefinition::new(" ")],
    );
    assert_eq!(
        validate_plot_definition(&definition),
        Err(PlotRuleError::EmptyAxisName { index: 2 })
    );
}

#[test]
fn validation_rejects_inverted_fixed_range() {
    let definition = PlotDefinition::new(
        "inverted",
        AxisDefinition::new("EFF_WAVE"),
        vec![AxisDefinition::new("VIS2DATA").with_fixed_range(Some(2.0), Some(1.0))],
    );
    assert!(matches!(
        validate_plot_definition(&definition),
        Err(PlotRuleError::InvertedRange { .. })
    ));
}

#[test]
fn presets_are_valid_and_default_is_first() {
    let names = preset_names().expect("presets");
    assert_eq!(names.first().map(String::as_str), Some(PLOT_DEFAULT));
    for name in &names {
        let definition = preset(name).expect("preset");
        validate_plot_definition(&definition).expect("valid preset");
    }
    let default = default_preset().expect("default");
    assert_eq!(default.y_axes.len(), 2);
}

#[test]
fn uv_coverage_preset_uses_symmetry() {
    let uv = preset("VCOORD/UCOORD").expect("uv preset");
    assert!(uses_symmetry(&uv.x_axis, &uv.y_axes[0]));

    let vis2 = preset("VIS2DATA/SPATIAL_FREQ").expect("vis2 preset");
    assert_eq!(vis2.x_axis.converter_key(), Some(CONVERTER_MEGA_LAMBDA));
    assert!(!uses_symmetry(&vis2.x_axis, &vis2.y_axes[0]));
}

#[test]
fn unknown_preset_is_reported() {
    assert!(matches!(
        preset("NOPE"),
        Err(PlotDefError::UnknownPreset(name)) if name == "NOPE"
    ));
}
