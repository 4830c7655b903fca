use crate::palette::Rgba;

/// Identifies one series within a plot refresh.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub table_index: usize,
    pub baseline_index: usize,
    /// Spectral channel, or `None` when neither axis is per-channel.
    pub channel_index: Option<usize>,
    /// Produced by the point-symmetry pass.
    pub mirrored: bool,
    pub baseline_name: String,
    pub configuration_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointShape {
    Valid,
    /// Flagged point or point with a negative error value.
    Invalid,
}

/// Point/error-bar arrays of one (table, baseline, channel); all arrays share one length.
///
/// Bounds are NaN when the point has no error on that axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: SeriesKey,
    pub color: Rgba,
    pub rows: Vec<usize>,
    pub x: Vec<f64>,
    pub x_lower: Vec<f64>,
    pub x_upper: Vec<f64>,
    pub y: Vec<f64>,
    pub y_lower: Vec<f64>,
    pub y_upper: Vec<f64>,
    pub shapes: Vec<PointShape>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn valid_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|s| **s == PointShape::Valid)
            .count()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ScanPoint {
    pub row: usize,
    pub x: f64,
    pub x_lower: f64,
    pub x_upper: f64,
    pub y: f64,
    pub y_lower: f64,
    pub y_upper: f64,
    pub shape: PointShape,
}

/// Scratch arrays reused across the series of one table scan.
///
/// Sized once for the table's row count; each finished series copies out
/// exactly the retained points and the buffers are cleared for the next one.
pub(crate) struct ScanArena {
    rows: Vec<usize>,
    x: Vec<f64>,
    x_lower: Vec<f64>,
    x_upper: Vec<f64>,
    y: Vec<f64>,
    y_lower: Vec<f64>,
    y_upper: Vec<f64>,
    shapes: Vec<PointShape>,
}

impl ScanArena {
    pub fn with_capacity(n_rows: usize) -> Self {
        Self {
            rows: Vec::with_capacity(n_rows),
            x: Vec::with_capacity(n_rows),
            x_lower: Vec::with_capacity(n_rows),
            x_upper: Vec::with_capacity(n_rows),
            y: Vec::with_capacity(n_rows),
            y_lower: Vec::with_capacity(n_rows),
            y_upper: Vec::with_capacity(n_rows),
            shapes: Vec::with_capacity(n_rows),
        }
    }

    pub fn push(&mut self, p: ScanPoint) {
        self.rows.push(p.row);
        self.x.push(p.x);
        self.x_lower.push(p.x_lower);
        self.x_upper.push(p.x_upper);
        self.y.push(p.y);
        self.y_lower.push(p.y_lower);
        self.y_upper.push(p.y_upper);
        self.shapes.push(p.shape);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.x.clear();
        self.x_lower.clear();
        self.x_upper.clear();
        self.y.clear();
        self.y_lower.clear();
        self.y_upper.clear();
        self.shapes.clear();
    }

    /// Copies the pending points into a new series and resets the buffers.
    pub fn take_series(&mut self, key: SeriesKey, color: Rgba) -> Series {
        let series = Series {
            key,
            color,
            rows: self.rows.to_vec(),
            x: self.x.to_vec(),
            x_lower: self.x_lower.to_vec(),
            x_upper: self.x_upper.to_vec(),
            y: self.y.to_vec(),
            y_lower: self.y_lower.to_vec(),
            y_upper: self.y_upper.to_vec(),
            shapes: self.shapes.to_vec(),
        };
        self.clear();
        series
    }
}
