use std::fmt;

use arpose_linalg::Mat34;
use serde::{Deserialize, Serialize};

use crate::distortion::{DistortionFactors, DistortionVersion};
use crate::error::CameraError;

const RULE: &str = "--------------------------------------";

/// Intrinsic parameters of a camera: image size, a 3x4 projection matrix and
/// versioned lens distortion coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraParam {
    xsize: u32,
    ysize: u32,
    mat: Mat34,
    dist: DistortionFactors,
}

impl CameraParam {
    /// Create default parameters for an image of `xsize x ysize`.
    ///
    /// The projection matrix is a unit-focal pinhole with its principal point
    /// at the image centre and the distortion coefficients take the defaults of
    /// [`DistortionFactors::cleared`].
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::InvalidParameter`] if `dist_function_version` is
    /// not 1, 2, 3 or 4.
    ///
    /// Example:
    ///
    /// ```
    /// use arpose_camera::CameraParam;
    ///
    /// let param = CameraParam::new(640, 480, 1).unwrap();
    /// assert_eq!(param.dist_factor(), &[320.0, 240.0, 1.0, 0.0]);
    /// ```
    pub fn new(xsize: u32, ysize: u32, dist_function_version: i32) -> Result<Self, CameraError> {
        let version = DistortionVersion::try_from(dist_function_version)?;
        Ok(Self {
            xsize,
            ysize,
            mat: centered_projection(xsize, ysize),
            dist: DistortionFactors::cleared(version, xsize, ysize),
        })
    }

    /// Assemble parameters from an already calibrated projection matrix and
    /// distortion coefficients.
    pub fn from_parts(
        xsize: u32,
        ysize: u32,
        mat: Mat34,
        dist_function_version: i32,
        dist_factor: &[f64],
    ) -> Result<Self, CameraError> {
        let version = DistortionVersion::try_from(dist_function_version)?;
        let dist = DistortionFactors::from_slice(version, dist_factor)?;
        Ok(Self {
            xsize,
            ysize,
            mat,
            dist,
        })
    }

    /// Reset these parameters to the defaults of [`CameraParam::new`].
    ///
    /// On error `self` is left unchanged.
    pub fn clear(
        &mut self,
        xsize: u32,
        ysize: u32,
        dist_function_version: i32,
    ) -> Result<(), CameraError> {
        *self = Self::new(xsize, ysize, dist_function_version)?;
        Ok(())
    }

    /// Image size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.xsize, self.ysize)
    }

    /// The 3x4 projection matrix.
    pub fn mat(&self) -> &Mat34 {
        &self.mat
    }

    /// The distortion layout version.
    pub fn dist_function_version(&self) -> DistortionVersion {
        self.dist.version()
    }

    /// The versioned distortion coefficients.
    pub fn distortion(&self) -> &DistortionFactors {
        &self.dist
    }

    /// The distortion coefficients in layout order.
    pub fn dist_factor(&self) -> &[f64] {
        self.dist.as_slice()
    }

    /// Write the diagnostic dump of these parameters to the `info` log.
    pub fn log_param(&self) {
        for line in self.to_string().lines() {
            log::info!("{line}");
        }
    }
}

fn centered_projection(xsize: u32, ysize: u32) -> Mat34 {
    [
        [1.0, 0.0, xsize as f64 / 2.0, 0.0],
        [0.0, 1.0, ysize as f64 / 2.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
    ]
}

fn write_mat34(f: &mut fmt::Formatter<'_>, mat: &Mat34) -> fmt::Result {
    for row in mat {
        for v in row {
            write!(f, "{v:7.5} ")?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for CameraParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "SIZE = {}, {}", self.xsize, self.ysize)?;
        match &self.dist {
            DistortionFactors::V4(d) => {
                writeln!(
                    f,
                    "Distortion factor: k1={:1.10}, k2={:1.10}, p1={:1.10}, p2={:1.10}",
                    d[0], d[1], d[2], d[3]
                )?;
                writeln!(
                    f,
                    "                  fx={:.6}, fy={:.6}, x0={:.6}, y0={:.6}, s={:.6}",
                    d[4], d[5], d[6], d[7], d[8]
                )?;
            }
            other => {
                write!(f, "Distortion factor =")?;
                for v in other.as_slice() {
                    write!(f, " {v:.6}")?;
                }
                writeln!(f)?;
            }
        }
        write_mat34(f, &self.mat)?;
        writeln!(f, "{RULE}")
    }
}

/// Render a 3x4 transform in the same layout as the camera parameter dump.
pub fn format_transform(trans: &Mat34) -> String {
    struct Transform<'a>(&'a Mat34);

    impl fmt::Display for Transform<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "{RULE}")?;
            write_mat34(f, self.0)?;
            writeln!(f, "{RULE}")
        }
    }

    Transform(trans).to_string()
}

/// Write a 3x4 transform to the `info` log.
pub fn log_transform(trans: &Mat34) {
    for line in format_transform(trans).lines() {
        log::info!("{line}");
    }
}
