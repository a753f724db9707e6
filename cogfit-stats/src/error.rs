use thiserror::Error;

/// `(rows, columns)` of a 2-D array.
pub type Shape = (usize, usize);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("shape mismatch: model is {}x{}, reference is {}x{}", left.0, left.1, right.0, right.1)]
    ShapeMismatch { left: Shape, right: Shape },
    #[error("ragged 2-D array: row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}
