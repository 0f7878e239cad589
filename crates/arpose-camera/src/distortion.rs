use serde::{Deserialize, Serialize};

use crate::error::CameraError;

/// Tag selecting one of the supported distortion coefficient layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistortionVersion {
    /// Four coefficients: `x0, y0, s, f`.
    V1 = 1,
    /// Five coefficients: `x0, y0, s, f1, f2`.
    V2 = 2,
    /// Six coefficients: `x0, y0, sx, sy, f1, f2`.
    V3 = 3,
    /// Nine coefficients: `k1, k2, p1, p2, fx, fy, x0, y0, s`.
    V4 = 4,
}

impl DistortionVersion {
    /// Number of coefficients in this layout.
    pub fn coefficient_count(self) -> usize {
        match self {
            Self::V1 => 4,
            Self::V2 => 5,
            Self::V3 => 6,
            Self::V4 => 9,
        }
    }
}

impl TryFrom<i32> for DistortionVersion {
    type Error = CameraError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            v => Err(CameraError::InvalidParameter(v)),
        }
    }
}

impl From<DistortionVersion> for i32 {
    fn from(value: DistortionVersion) -> Self {
        value as i32
    }
}

/// Distortion coefficients, sized by their layout version.
///
/// Consumers match on the variant before reading any coefficient slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DistortionFactors {
    /// Version 1 layout.
    V1([f64; 4]),
    /// Version 2 layout.
    V2([f64; 5]),
    /// Version 3 layout.
    V3([f64; 6]),
    /// Version 4 layout.
    V4([f64; 9]),
}

impl DistortionFactors {
    /// Default coefficients for an image of `xsize x ysize`.
    ///
    /// The principal point sits at the image centre, scales are one and every
    /// distortion term is zero.
    pub fn cleared(version: DistortionVersion, xsize: u32, ysize: u32) -> Self {
        let x0 = xsize as f64 / 2.0;
        let y0 = ysize as f64 / 2.0;
        match version {
            DistortionVersion::V4 => Self::V4([0.0, 0.0, 0.0, 0.0, 1.0, 1.0, x0, y0, 1.0]),
            DistortionVersion::V3 => Self::V3([x0, y0, 1.0, 1.0, 0.0, 0.0]),
            DistortionVersion::V2 => Self::V2([x0, y0, 1.0, 0.0, 0.0]),
            DistortionVersion::V1 => Self::V1([x0, y0, 1.0, 0.0]),
        }
    }

    /// Build from a coefficient slice whose length must match `version`.
    pub fn from_slice(version: DistortionVersion, coeffs: &[f64]) -> Result<Self, CameraError> {
        let expected = version.coefficient_count();
        if coeffs.len() != expected {
            return Err(CameraError::CoefficientCount {
                version: version.into(),
                expected,
                actual: coeffs.len(),
            });
        }
        let factors = match version {
            DistortionVersion::V1 => Self::V1(copy_array(coeffs)),
            DistortionVersion::V2 => Self::V2(copy_array(coeffs)),
            DistortionVersion::V3 => Self::V3(copy_array(coeffs)),
            DistortionVersion::V4 => Self::V4(copy_array(coeffs)),
        };
        Ok(factors)
    }

    /// The layout version of these coefficients.
    pub fn version(&self) -> DistortionVersion {
        match self {
            Self::V1(_) => DistortionVersion::V1,
            Self::V2(_) => DistortionVersion::V2,
            Self::V3(_) => DistortionVersion::V3,
            Self::V4(_) => DistortionVersion::V4,
        }
    }

    /// The coefficients in layout order.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::V1(c) => c,
            Self::V2(c) => c,
            Self::V3(c) => c,
            Self::V4(c) => c,
        }
    }
}

// PRECONDITION: coeffs.len() == N
fn copy_array<const N: usize>(coeffs: &[f64]) -> [f64; N] {
    let mut out = [0.0; N];
    out.copy_from_slice(coeffs);
    out
}
