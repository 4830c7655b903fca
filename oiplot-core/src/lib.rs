pub mod accumulator;
pub mod categories;
pub mod converter;
mod error;
pub mod fit;
pub mod orchestrator;
pub mod palette;
pub mod projector;
pub mod range;
pub mod series;
pub mod table;

pub use accumulator::AxisAccumulator;
pub use categories::Categories;
pub use converter::{Converter, ConverterRegistry};
pub use error::CoreError;
pub use fit::{fit_axis, ViewFit, MARGIN_PERCENTS};
pub use orchestrator::{
    CombinedAxis, Legend, LegendEntry, PlotOrchestrator, PlotResult, RefreshState, SubPlot,
};
pub use palette::Rgba;
pub use projector::{Projection, ProjectionContext, SeriesProjector};
pub use range::{Range, RangeTracker};
pub use series::{PointShape, Series, SeriesKey};
pub use table::{DataTable, OiTable, OiTableBuilder, TableError};
