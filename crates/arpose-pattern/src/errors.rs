/// Errors that can occur when working with a pattern store.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PatternError {
    /// The template resolution or the capacity is out of range.
    #[error("Invalid pattern store parameters: size {pattern_size} (must be 16..=64), capacity {capacity} (must be > 0)")]
    InvalidParameter {
        /// Requested template resolution.
        pattern_size: usize,
        /// Requested number of slots.
        capacity: usize,
    },

    /// Every slot is already in use.
    #[error("All {0} pattern slots are in use")]
    StoreFull(usize),

    /// The handle does not address a slot of this store.
    #[error("Pattern handle {0} is out of range")]
    InvalidHandle(usize),

    /// The slot addressed by the handle is not in use.
    #[error("Pattern slot {0} is not in use")]
    SlotNotInUse(usize),

    /// Rotation index must be 0, 1, 2 or 3.
    #[error("Invalid rotation index {0}")]
    InvalidRotation(usize),

    /// The sample buffer does not hold `size * size * 3` values.
    #[error("Expected {expected} color samples, got {actual}")]
    SampleCount {
        /// Samples required for one rotation variant.
        expected: usize,
        /// Samples supplied.
        actual: usize,
    },
}
