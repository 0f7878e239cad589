use arpose_linalg::{mat34_mul, Mat34};
use serde::{Deserialize, Serialize};

use crate::error::IcpError;

/// Convergence parameters shared by the mono and stereo solvers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IcpConfig {
    /// Stop as soon as the mean squared reprojection error drops below this value.
    pub break_loop_error_thresh: f64,
    /// Stop when the error ratio to the previous iteration exceeds this value.
    pub break_loop_error_ratio_thresh: f64,
    /// The ratio test only applies once the error is below this value.
    pub break_loop_error_thresh2: f64,
    /// Maximum number of pose updates.
    pub max_loop: usize,
}

impl Default for IcpConfig {
    fn default() -> Self {
        Self {
            break_loop_error_thresh: 0.1,
            break_loop_error_ratio_thresh: 0.99,
            break_loop_error_thresh2: 4.0,
            max_loop: 10,
        }
    }
}

impl IcpConfig {
    /// Set the absolute error threshold.
    pub fn with_break_loop_error_thresh(mut self, thresh: f64) -> Self {
        self.break_loop_error_thresh = thresh;
        self
    }

    /// Set the plateau ratio threshold.
    pub fn with_break_loop_error_ratio_thresh(mut self, ratio: f64) -> Self {
        self.break_loop_error_ratio_thresh = ratio;
        self
    }

    /// Set the error level below which the plateau test is active.
    pub fn with_break_loop_error_thresh2(mut self, thresh: f64) -> Self {
        self.break_loop_error_thresh2 = thresh;
        self
    }

    /// Set the maximum number of pose updates.
    pub fn with_max_loop(mut self, max_loop: usize) -> Self {
        self.max_loop = max_loop;
        self
    }
}

/// A single calibrated camera.
#[derive(Debug, Clone, PartialEq)]
pub struct IcpHandle {
    /// Camera-to-undistorted-image projection.
    pub mat_xc2u: Mat34,
    /// Convergence parameters.
    pub config: IcpConfig,
}

impl IcpHandle {
    /// Create a handle from the camera projection matrix.
    pub fn new(mat_xc2u: Mat34, config: IcpConfig) -> Self {
        Self { mat_xc2u, config }
    }
}

/// A calibrated stereo rig.
///
/// The pose being solved maps target coordinates into the rig frame; `mat_c2l`
/// and `mat_c2r` carry the rig frame into each camera, and `mat_xcl2ul` and
/// `mat_xcr2ur` project each camera frame into its undistorted image.
#[derive(Debug, Clone, PartialEq)]
pub struct IcpStereoHandle {
    /// Left camera-to-image projection.
    pub mat_xcl2ul: Mat34,
    /// Right camera-to-image projection.
    pub mat_xcr2ur: Mat34,
    /// Rig-to-left-camera transform.
    pub mat_c2l: Mat34,
    /// Rig-to-right-camera transform.
    pub mat_c2r: Mat34,
    /// Convergence parameters.
    pub config: IcpConfig,
}

impl IcpStereoHandle {
    /// Create a handle from the four extrinsic transforms.
    pub fn new(
        mat_xcl2ul: Mat34,
        mat_xcr2ur: Mat34,
        mat_c2l: Mat34,
        mat_c2r: Mat34,
        config: IcpConfig,
    ) -> Self {
        Self {
            mat_xcl2ul,
            mat_xcr2ur,
            mat_c2l,
            mat_c2r,
            config,
        }
    }

    /// Rig-to-image projections for the left and right camera.
    pub fn projections(&self) -> (Mat34, Mat34) {
        (
            mat34_mul(&self.mat_xcl2ul, &self.mat_c2l),
            mat34_mul(&self.mat_xcr2ur, &self.mat_c2r),
        )
    }
}

/// Paired 3D target points and their 2D image observations.
#[derive(Debug, Clone, Copy)]
pub struct Correspondences<'a> {
    world: &'a [[f64; 3]],
    screen: &'a [[f64; 2]],
}

impl<'a> Correspondences<'a> {
    /// Pair `world[i]` with `screen[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`IcpError::MismatchedArrayLengths`] if the slices differ in length.
    pub fn new(world: &'a [[f64; 3]], screen: &'a [[f64; 2]]) -> Result<Self, IcpError> {
        if world.len() != screen.len() {
            return Err(IcpError::MismatchedArrayLengths {
                left_name: "world",
                left_len: world.len(),
                right_name: "screen",
                right_len: screen.len(),
            });
        }
        Ok(Self { world, screen })
    }

    /// A set without any points.
    pub fn empty() -> Self {
        Self {
            world: &[],
            screen: &[],
        }
    }

    /// Number of correspondences.
    pub fn len(&self) -> usize {
        self.world.len()
    }

    /// Whether the set holds no correspondences.
    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Target-frame points.
    pub fn world(&self) -> &'a [[f64; 3]] {
        self.world
    }

    /// Observed image points.
    pub fn screen(&self) -> &'a [[f64; 2]] {
        self.screen
    }
}

impl Default for Correspondences<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Correspondences observed by the left and right cameras of a rig.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcpStereoData<'a> {
    /// Points seen by the left camera.
    pub left: Correspondences<'a>,
    /// Points seen by the right camera.
    pub right: Correspondences<'a>,
}

impl<'a> IcpStereoData<'a> {
    /// Combine the per-camera sets.
    pub fn new(left: Correspondences<'a>, right: Correspondences<'a>) -> Self {
        Self { left, right }
    }

    /// Total number of correspondences across both cameras.
    pub fn total(&self) -> usize {
        self.left.len() + self.right.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpose_linalg::MAT34_IDENTITY;

    #[test]
    fn test_config_defaults() {
        let config = IcpConfig::default();
        assert_eq!(config.break_loop_error_thresh, 0.1);
        assert_eq!(config.break_loop_error_ratio_thresh, 0.99);
        assert_eq!(config.break_loop_error_thresh2, 4.0);
        assert_eq!(config.max_loop, 10);

        let config = config.with_max_loop(20).with_break_loop_error_thresh(1e-6);
        assert_eq!(config.max_loop, 20);
        assert_eq!(config.break_loop_error_thresh, 1e-6);
    }

    #[test]
    fn test_correspondences_length_mismatch() {
        let world = [[0.0; 3]; 3];
        let screen = [[0.0; 2]; 2];
        let err = Correspondences::new(&world, &screen).unwrap_err();
        assert_eq!(
            err,
            IcpError::MismatchedArrayLengths {
                left_name: "world",
                left_len: 3,
                right_name: "screen",
                right_len: 2,
            }
        );
    }

    #[test]
    fn test_stereo_total() -> Result<(), Box<dyn std::error::Error>> {
        let world = [[0.0; 3]; 4];
        let screen = [[0.0; 2]; 4];
        let left = Correspondences::new(&world, &screen)?;
        let data = IcpStereoData::new(left, Correspondences::empty());
        assert_eq!(data.total(), 4);
        assert!(data.right.is_empty());
        Ok(())
    }

    #[test]
    fn test_stereo_projections() {
        let k = [
            [500.0, 0.0, 320.0, 0.0],
            [0.0, 500.0, 240.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ];
        let mut c2r = MAT34_IDENTITY;
        c2r[0][3] = -0.1;
        let handle = IcpStereoHandle::new(k, k, MAT34_IDENTITY, c2r, IcpConfig::default());
        let (left, right) = handle.projections();
        assert_eq!(left, k);
        assert_eq!(right[0][3], -50.0);
        assert_eq!(right[1][3], 0.0);
    }
}
