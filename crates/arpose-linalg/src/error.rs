use thiserror::Error;

/// An error type for matrix operations.
#[derive(Debug, Error, PartialEq)]
pub enum LinalgError {
    /// The operand shapes are not compatible with the operation.
    #[error("Incompatible matrix shapes: {op} of {lhs_rows}x{lhs_cols} and {rhs_rows}x{rhs_cols}")]
    DimensionMismatch {
        /// Name of the operation that rejected the shapes.
        op: &'static str,
        /// Rows of the left-hand operand.
        lhs_rows: usize,
        /// Columns of the left-hand operand.
        lhs_cols: usize,
        /// Rows of the right-hand operand.
        rhs_rows: usize,
        /// Columns of the right-hand operand.
        rhs_cols: usize,
    },

    /// The backing buffer could not be allocated.
    #[error("Failed to allocate a {0}x{1} matrix")]
    AllocationFailure(usize, usize),

    /// The matrix is singular to working precision.
    #[error("Matrix is singular")]
    Singular,
}
