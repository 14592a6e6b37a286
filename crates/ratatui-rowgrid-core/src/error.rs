use thiserror::Error;

/// Errors raised while configuring a grid.
///
/// Interaction paths (key presses, menu actions, row edits) never fail; they degrade to no-ops.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("duplicate column key `{0}`")]
    DuplicateColumnKey(String),
    #[error("column key `{0}` is reserved for the row number column")]
    ReservedColumnKey(String),
    #[error("unknown sort direction `{0}` (expected ASC or DESC)")]
    UnknownSortDirection(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
