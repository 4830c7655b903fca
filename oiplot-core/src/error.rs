use crate::table::TableError;
use plotdef::{ColorMapping, PlotRuleError};

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("unknown converter '{0}'")]
    UnknownConverter(String),
    #[error("{} colour mapping has no category for '{label}'", mapping.label())]
    MissingCategory { mapping: ColorMapping, label: String },
    #[error("invalid plot definition: {0}")]
    InvalidDefinition(#[from] PlotRuleError),
    #[error("a refresh is already in progress")]
    RefreshInProgress,
    #[error("table error: {0}")]
    Table(#[from] TableError),
}
