#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! The solver refines an initial target-to-camera pose by minimizing the mean
//! squared reprojection error of known 3D points against their observed 2D
//! image locations. Points may be observed by a single camera or split across
//! the two cameras of a calibrated stereo rig.
//!
//! ```
//! use arpose_icp::{icp_point, Correspondences, IcpConfig, IcpHandle};
//!
//! let k = [[800.0, 0.0, 320.0, 0.0], [0.0, 800.0, 240.0, 0.0], [0.0, 0.0, 1.0, 0.0]];
//! let world = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
//! let screen = [[280.0, 200.0], [360.0, 200.0], [360.0, 280.0], [280.0, 280.0]];
//! let init = [[1.0, 0.0, 0.0, -0.4], [0.0, 1.0, 0.0, -0.6], [0.0, 0.0, 1.0, 9.0]];
//!
//! let handle = IcpHandle::new(k, IcpConfig::default().with_break_loop_error_thresh(1e-8));
//! let data = Correspondences::new(&world, &screen)?;
//! let result = icp_point(&handle, &data, &init)?;
//! assert!((result.pose[2][3] - 10.0).abs() < 1e-3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Error types for the pose solver.
pub mod error;

/// Camera handles, correspondence sets and solver configuration.
pub mod handle;

mod icp_point;
pub use icp_point::*;

mod ops;

pub use crate::error::IcpError;
pub use crate::handle::{Correspondences, IcpConfig, IcpHandle, IcpStereoData, IcpStereoHandle};
