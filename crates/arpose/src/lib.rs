#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use arpose_linalg as linalg;

#[doc(inline)]
pub use arpose_camera as camera;

#[doc(inline)]
pub use arpose_pattern as pattern;

#[doc(inline)]
pub use arpose_icp as icp;
