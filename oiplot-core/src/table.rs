//! Read-only measurement tables consumed by the projector.
//!
//! Rows carry a dense baseline id and configuration id assigned once when the
//! table is built, so rows of the same baseline are grouped by integer
//! equality. Columns hold one value per row (scalar) or one value per row and
//! spectral channel (array), optionally paired with an error column.

use crate::range::{Range, RangeTracker};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const COLUMN_EFF_WAVE: &str = "EFF_WAVE";
pub const COLUMN_BASELINE: &str = "BASELINE";
pub const COLUMN_SPATIAL_FREQ: &str = "SPATIAL_FREQ";
pub const COLUMN_UCOORD: &str = "UCOORD";
pub const COLUMN_VCOORD: &str = "VCOORD";
pub const COLUMN_UCOORD_SPATIAL: &str = "UCOORD_SPATIAL";
pub const COLUMN_VCOORD_SPATIAL: &str = "VCOORD_SPATIAL";

const T3_COORDS: [(&str, &str); 4] = [
    ("U1COORD", "U1COORD_SPATIAL"),
    ("V1COORD", "V1COORD_SPATIAL"),
    ("U2COORD", "U2COORD_SPATIAL"),
    ("V2COORD", "V2COORD_SPATIAL"),
];

/// Expected value domain of a column; either edge may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl DomainRange {
    pub const UNIT: DomainRange = DomainRange {
        min: Some(0.0),
        max: Some(1.0),
    };
    pub const ANGLE: DomainRange = DomainRange {
        min: Some(-180.0),
        max: Some(180.0),
    };
    pub const POSITIVE: DomainRange = DomainRange {
        min: Some(0.0),
        max: None,
    };

    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Domain of the standard interferometry columns.
    pub fn known(column: &str) -> Option<DomainRange> {
        match column {
            "VIS2DATA" | "VISAMP" => Some(Self::UNIT),
            "VISPHI" | "T3PHI" => Some(Self::ANGLE),
            "VIS2ERR" | "VISAMPERR" | "VISPHIERR" | "T3AMPERR" | "T3PHIERR" | "T3AMP"
            | COLUMN_SPATIAL_FREQ => Some(Self::POSITIVE),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_range: Option<DomainRange>,
}

impl ColumnMeta {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_array: false,
            error_column: None,
            unit: None,
            data_range: None,
        }
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self {
            is_array: true,
            ..Self::scalar(name)
        }
    }

    pub fn with_error_column(mut self, error_column: impl Into<String>) -> Self {
        self.error_column = Some(error_column.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_data_range(mut self, data_range: DomainRange) -> Self {
        self.data_range = Some(data_range);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Scalar(Vec<f64>),
    Array(Vec<Vec<f64>>),
}

impl ColumnValues {
    fn len(&self) -> usize {
        match self {
            ColumnValues::Scalar(values) => values.len(),
            ColumnValues::Array(rows) => rows.len(),
        }
    }
}

/// Borrowed view on a column's values.
#[derive(Debug, Clone, Copy)]
pub enum ColumnData<'a> {
    Scalar(&'a [f64]),
    Array(&'a [Vec<f64>]),
}

impl ColumnData<'_> {
    pub fn is_array(&self) -> bool {
        matches!(self, ColumnData::Array(_))
    }

    /// Value at `(row, channel)`; scalar columns ignore the channel. Out of range reads are NaN.
    pub fn value(&self, row: usize, channel: usize) -> f64 {
        match self {
            ColumnData::Scalar(values) => values.get(row).copied(),
            ColumnData::Array(rows) => rows.get(row).and_then(|r| r.get(channel)).copied(),
        }
        .unwrap_or(f64::NAN)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("column '{column}' row {row} has {actual} channels, expected {expected}")]
    ChannelMismatch {
        column: String,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("row {row} references unknown baseline {id}")]
    UnknownBaseline { row: usize, id: usize },
    #[error("row {row} references unknown configuration {id}")]
    UnknownConfiguration { row: usize, id: usize },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read access to one measurement table.
pub trait DataTable {
    fn name(&self) -> &str;
    fn n_rows(&self) -> usize;
    /// Number of spectral channels.
    fn n_channels(&self) -> usize;
    fn column_meta(&self, name: &str) -> Option<&ColumnMeta>;
    fn column(&self, name: &str) -> Option<ColumnData<'_>>;
    fn baseline_id(&self, row: usize) -> usize;
    fn configuration_id(&self, row: usize) -> usize;
    /// Baseline names indexed by baseline id.
    fn baseline_names(&self) -> &[String];
    /// Configuration names indexed by configuration id.
    fn configuration_names(&self) -> &[String];
    fn is_flagged(&self, row: usize, channel: usize) -> bool;
    fn n_flagged(&self) -> usize;
    fn target_id(&self, row: usize) -> Option<i16>;
    fn has_single_target(&self) -> bool;
    fn target_id_for(&self, target: &str) -> Option<i16>;
    /// Effective wavelength of each channel, in meters.
    fn effective_wavelengths(&self) -> &[f64];

    fn wavelength_range(&self) -> Option<Range> {
        let mut tracker = RangeTracker::default();
        for wl in self.effective_wavelengths() {
            if wl.is_finite() {
                tracker.add(*wl);
            }
        }
        tracker.range()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub id: i16,
    pub name: String,
}

/// Column as stored on disk: `values` for scalar columns, `array_values` for per-channel ones.
/// `null` entries read as NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(flatten)]
    pub meta: ColumnMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_values: Option<Vec<Vec<Option<f64>>>>,
}

/// Serialized form of an [`OiTable`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OiTableSpec {
    pub name: String,
    #[serde(default)]
    pub wavelengths: Vec<f64>,
    pub baselines: Vec<String>,
    #[serde(default)]
    pub configurations: Vec<String>,
    pub baseline_ids: Vec<usize>,
    #[serde(default)]
    pub configuration_ids: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<Vec<bool>>>,
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ids: Option<Vec<i16>>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone)]
pub struct OiTable {
    name: String,
    wavelengths: Vec<f64>,
    baselines: Vec<String>,
    configurations: Vec<String>,
    baseline_ids: Vec<usize>,
    configuration_ids: Vec<usize>,
    flags: Option<Vec<Vec<bool>>>,
    n_flagged: usize,
    targets: Vec<TargetEntry>,
    target_ids: Option<Vec<i16>>,
    metas: Vec<ColumnMeta>,
    values: Vec<ColumnValues>,
    index: HashMap<String, usize>,
}

impl DataTable for OiTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_rows(&self) -> usize {
        self.baseline_ids.len()
    }

    fn n_channels(&self) -> usize {
        self.wavelengths.len().max(1)
    }

    fn column_meta(&self, name: &str) -> Option<&ColumnMeta> {
        self.index.get(name).map(|idx| &self.metas[*idx])
    }

    fn column(&self, name: &str) -> Option<ColumnData<'_>> {
        self.index.get(name).map(|idx| match &self.values[*idx] {
            ColumnValues::Scalar(values) => ColumnData::Scalar(values),
            ColumnValues::Array(rows) => ColumnData::Array(rows),
        })
    }

    fn baseline_id(&self, row: usize) -> usize {
        self.baseline_ids[row]
    }

    fn configuration_id(&self, row: usize) -> usize {
        self.configuration_ids[row]
    }

    fn baseline_names(&self) -> &[String] {
        &self.baselines
    }

    fn configuration_names(&self) -> &[String] {
        &self.configurations
    }

    fn is_flagged(&self, row: usize, channel: usize) -> bool {
        self.flags
            .as_ref()
            .and_then(|flags| flags.get(row))
            .and_then(|row| row.get(channel))
            .copied()
            .unwrap_or(false)
    }

    fn n_flagged(&self) -> usize {
        self.n_flagged
    }

    fn target_id(&self, row: usize) -> Option<i16> {
        self.target_ids.as_ref().and_then(|ids| ids.get(row)).copied()
    }

    fn has_single_target(&self) -> bool {
        self.targets.len() <= 1 || self.target_ids.is_none()
    }

    fn target_id_for(&self, target: &str) -> Option<i16> {
        self.targets
            .iter()
            .find(|t| t.name == target)
            .map(|t| t.id)
    }

    fn effective_wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }
}

impl OiTable {
    pub fn builder(name: impl Into<String>) -> OiTableBuilder {
        OiTableBuilder::new(name)
    }

    pub fn from_spec(spec: OiTableSpec) -> Result<Self, TableError> {
        let mut builder = OiTableBuilder::new(spec.name)
            .wavelengths(spec.wavelengths)
            .baselines(spec.baselines)
            .configurations(spec.configurations)
            .rows(spec.baseline_ids, spec.configuration_ids)
            .targets(spec.targets, spec.target_ids);
        if let Some(flags) = spec.flags {
            builder = builder.flags(flags);
        }
        for column in spec.columns {
            let values = if let Some(rows) = column.array_values {
                ColumnValues::Array(
                    rows.into_iter()
                        .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
                        .collect(),
                )
            } else {
                ColumnValues::Scalar(
                    column
                        .values
                        .unwrap_or_default()
                        .into_iter()
                        .map(|v| v.unwrap_or(f64::NAN))
                        .collect(),
                )
            };
            builder = builder.column(column.meta, values);
        }
        builder.build()
    }

    /// Loads a JSON array of table specs.
    pub fn load_all_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, TableError> {
        let data = fs::read(path)?;
        let specs: Vec<OiTableSpec> = serde_json::from_slice(&data)?;
        specs.into_iter().map(Self::from_spec).collect()
    }
}

pub struct OiTableBuilder {
    name: String,
    wavelengths: Vec<f64>,
    baselines: Vec<String>,
    configurations: Vec<String>,
    baseline_ids: Vec<usize>,
    configuration_ids: Vec<usize>,
    flags: Option<Vec<Vec<bool>>>,
    targets: Vec<TargetEntry>,
    target_ids: Option<Vec<i16>>,
    columns: Vec<(ColumnMeta, ColumnValues)>,
}

impl OiTableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wavelengths: Vec::new(),
            baselines: Vec::new(),
            configurations: Vec::new(),
            baseline_ids: Vec::new(),
            configuration_ids: Vec::new(),
            flags: None,
            targets: Vec::new(),
            target_ids: None,
            columns: Vec::new(),
        }
    }

    pub fn wavelengths(mut self, wavelengths: Vec<f64>) -> Self {
        self.wavelengths = wavelengths;
        self
    }

    pub fn baselines(mut self, names: Vec<String>) -> Self {
        self.baselines = names;
        self
    }

    pub fn configurations(mut self, names: Vec<String>) -> Self {
        self.configurations = names;
        self
    }

    /// Per-row baseline and configuration ids; an empty configuration list maps every row to 0.
    pub fn rows(mut self, baseline_ids: Vec<usize>, configuration_ids: Vec<usize>) -> Self {
        self.baseline_ids = baseline_ids;
        self.configuration_ids = configuration_ids;
        self
    }

    pub fn flags(mut self, flags: Vec<Vec<bool>>) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn targets(mut self, targets: Vec<TargetEntry>, target_ids: Option<Vec<i16>>) -> Self {
        self.targets = targets;
        self.target_ids = target_ids;
        self
    }

    pub fn column(mut self, meta: ColumnMeta, values: ColumnValues) -> Self {
        self.columns.push((meta, values));
        self
    }

    pub fn scalar(self, name: &str, values: Vec<f64>) -> Self {
        self.column(ColumnMeta::scalar(name), ColumnValues::Scalar(values))
    }

    pub fn array(self, name: &str, rows: Vec<Vec<f64>>) -> Self {
        self.column(ColumnMeta::array(name), ColumnValues::Array(rows))
    }

    pub fn build(mut self) -> Result<OiTable, TableError> {
        let n_rows = self.baseline_ids.len();
        let n_channels = self.wavelengths.len().max(1);

        if self.configuration_ids.is_empty() {
            self.configuration_ids = vec![0; n_rows];
        }
        if self.configurations.is_empty() {
            self.configurations = vec![self.baselines.join(" ")];
        }
        if self.configuration_ids.len() != n_rows {
            return Err(TableError::LengthMismatch {
                column: "configuration_ids".to_string(),
                expected: n_rows,
                actual: self.configuration_ids.len(),
            });
        }
        for (row, id) in self.baseline_ids.iter().enumerate() {
            if *id >= self.baselines.len() {
                return Err(TableError::UnknownBaseline { row, id: *id });
            }
        }
        for (row, id) in self.configuration_ids.iter().enumerate() {
            if *id >= self.configurations.len() {
                return Err(TableError::UnknownConfiguration { row, id: *id });
            }
        }
        if let Some(ids) = &self.target_ids {
            check_len("target_ids", n_rows, ids.len())?;
        }
        let mut n_flagged = 0;
        if let Some(flags) = &self.flags {
            check_len("flags", n_rows, flags.len())?;
            for (row, channels) in flags.iter().enumerate() {
                check_channels("flags", row, n_channels, channels.len())?;
                n_flagged += channels.iter().filter(|f| **f).count();
            }
        }

        let mut metas = Vec::with_capacity(self.columns.len());
        let mut values = Vec::with_capacity(self.columns.len());
        let mut index = HashMap::new();
        for (mut meta, column) in self.columns {
            check_len(&meta.name, n_rows, column.len())?;
            if let ColumnValues::Array(rows) = &column {
                for (row, channels) in rows.iter().enumerate() {
                    check_channels(&meta.name, row, n_channels, channels.len())?;
                }
            }
            meta.is_array = matches!(column, ColumnValues::Array(_));
            if meta.data_range.is_none() {
                meta.data_range = DomainRange::known(&meta.name);
            }
            if index.insert(meta.name.clone(), metas.len()).is_some() {
                return Err(TableError::DuplicateColumn(meta.name));
            }
            metas.push(meta);
            values.push(column);
        }

        let mut table = OiTable {
            name: self.name,
            wavelengths: self.wavelengths,
            baselines: self.baselines,
            configurations: self.configurations,
            baseline_ids: self.baseline_ids,
            configuration_ids: self.configuration_ids,
            flags: self.flags,
            n_flagged,
            targets: self.targets,
            target_ids: self.target_ids,
            metas,
            values,
            index,
        };
        add_derived_columns(&mut table);
        Ok(table)
    }
}

fn check_len(column: &str, expected: usize, actual: usize) -> Result<(), TableError> {
    if expected != actual {
        return Err(TableError::LengthMismatch {
            column: column.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_channels(column: &str, row: usize, expected: usize, actual: usize) -> Result<(), TableError> {
    if expected != actual {
        return Err(TableError::ChannelMismatch {
            column: column.to_string(),
            row,
            expected,
            actual,
        });
    }
    Ok(())
}

fn push_derived(table: &mut OiTable, meta: ColumnMeta, values: ColumnValues) {
    if table.index.contains_key(&meta.name) {
        return;
    }
    table.index.insert(meta.name.clone(), table.metas.len());
    table.metas.push(meta);
    table.values.push(values);
}

fn scalar_values<'a>(table: &'a OiTable, name: &str) -> Option<&'a [f64]> {
    match table.column(name)? {
        ColumnData::Scalar(values) => Some(values),
        ColumnData::Array(_) => None,
    }
}

fn per_channel(values: &[f64], wavelengths: &[f64]) -> Vec<Vec<f64>> {
    values
        .iter()
        .map(|v| wavelengths.iter().map(|wl| v / wl).collect())
        .collect()
}

/// Adds wavelength and spatial-frequency columns derived from the uv coordinates.
fn add_derived_columns(table: &mut OiTable) {
    if table.wavelengths.is_empty() {
        return;
    }
    let wavelengths = table.wavelengths.clone();
    let n_rows = table.n_rows();

    push_derived(
        table,
        ColumnMeta::array(COLUMN_EFF_WAVE).with_unit("m"),
        ColumnValues::Array(vec![wavelengths.clone(); n_rows]),
    );

    let uv = scalar_values(table, COLUMN_UCOORD)
        .zip(scalar_values(table, COLUMN_VCOORD))
        .map(|(u, v)| (u.to_vec(), v.to_vec()));
    if let Some((u, v)) = uv {
        let baseline: Vec<f64> = u.iter().zip(&v).map(|(u, v)| u.hypot(*v)).collect();
        push_derived(
            table,
            ColumnMeta::array(COLUMN_UCOORD_SPATIAL).with_unit("rad-1"),
            ColumnValues::Array(per_channel(&u, &wavelengths)),
        );
        push_derived(
            table,
            ColumnMeta::array(COLUMN_VCOORD_SPATIAL).with_unit("rad-1"),
            ColumnValues::Array(per_channel(&v, &wavelengths)),
        );
        push_derived(
            table,
            ColumnMeta::array(COLUMN_SPATIAL_FREQ)
                .with_unit("rad-1")
                .with_data_range(DomainRange::POSITIVE),
            ColumnValues::Array(per_channel(&baseline, &wavelengths)),
        );
        push_derived(
            table,
            ColumnMeta::scalar(COLUMN_BASELINE).with_unit("m"),
            ColumnValues::Scalar(baseline),
        );
        return;
    }

    let coords: Option<Vec<Vec<f64>>> = T3_COORDS
        .iter()
        .map(|(name, _)| scalar_values(table, name).map(<[f64]>::to_vec))
        .collect();
    if let Some(coords) = coords {
        for ((_, derived), values) in T3_COORDS.iter().zip(&coords) {
            push_derived(
                table,
                ColumnMeta::array(*derived).with_unit("rad-1"),
                ColumnValues::Array(per_channel(values, &wavelengths)),
            );
        }
        // Longest of the three triangle sides.
        let longest: Vec<f64> = (0..n_rows)
            .map(|row| {
                let (u1, v1, u2, v2) = (coords[0][row], coords[1][row], coords[2][row], coords[3][row]);
                u1.hypot(v1).max(u2.hypot(v2)).max((u1 + u2).hypot(v1 + v2))
            })
            .collect();
        push_derived(
            table,
            ColumnMeta::array(COLUMN_SPATIAL_FREQ)
                .with_unit("rad-1")
                .with_data_range(DomainRange::POSITIVE),
            ColumnValues::Array(per_channel(&longest, &wavelengths)),
        );
    }
}
