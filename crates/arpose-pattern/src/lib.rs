#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the pattern store.
pub mod errors;

/// The slot arena and its lifecycle.
pub mod store;

pub use crate::errors::PatternError;
pub use crate::store::{
    PattHandle, PattStore, PatternVariant, PATT_NUM_DEFAULT, PATT_SIZE_DEFAULT, PATT_SIZE_MAX,
};
