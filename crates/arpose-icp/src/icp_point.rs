use arpose_linalg::{mat34_mul, Mat34, Matrix};

use crate::error::IcpError;
use crate::handle::{Correspondences, IcpConfig, IcpHandle, IcpStereoData, IcpStereoHandle};
use crate::ops::{delta_s, jacobian_u_s, project, update_pose};

/// Minimum number of correspondences needed to constrain the six pose parameters.
const MIN_CORRESPONDENCES: usize = 3;

/// Result of a pose refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct IcpResult {
    /// Refined target-to-camera (or target-to-rig) pose `[R|t]`.
    pub pose: Mat34,
    /// Mean squared reprojection error of the returned pose, in pixels².
    pub err: f64,
    /// Number of pose updates applied.
    pub num_iterations: usize,
}

/// Refine a pose from correspondences observed by a single camera.
///
/// # Arguments
///
/// * `handle` - Camera projection and convergence parameters.
/// * `data` - Target points and their image observations.
/// * `init_pose` - Initial target-to-camera pose. Never modified.
///
/// # Errors
///
/// See [`icp_stereo_point`].
pub fn icp_point(
    handle: &IcpHandle,
    data: &Correspondences,
    init_pose: &Mat34,
) -> Result<IcpResult, IcpError> {
    solve(&[(handle.mat_xc2u, *data)], init_pose, &handle.config)
        .inspect_err(|e| log::debug!("icp_point failed: {e}"))
}

/// Refine a target-to-rig pose from correspondences split across a stereo pair.
///
/// Each iteration projects every point through the current pose, stops once
/// one of the [`IcpConfig`] criteria holds, and otherwise applies the
/// Gauss-Newton increment of the stacked reprojection residuals.
/// Reaching `max_loop` is a successful exit.
///
/// # Arguments
///
/// * `handle` - Stereo calibration and convergence parameters.
/// * `data` - Correspondences for the left and right camera.
/// * `init_pose` - Initial target-to-rig pose. Never modified.
///
/// # Errors
///
/// - [`IcpError::InsufficientCorrespondences`] if fewer than 3 points are given in total.
/// - [`IcpError::AllocationFailure`] if the solver buffers cannot be allocated.
/// - [`IcpError::ProjectionFailure`] if a point cannot be projected.
/// - [`IcpError::SingularSystem`] if the normal equations cannot be inverted.
pub fn icp_stereo_point(
    handle: &IcpStereoHandle,
    data: &IcpStereoData,
    init_pose: &Mat34,
) -> Result<IcpResult, IcpError> {
    let (xc2ul, xc2ur) = handle.projections();
    solve(
        &[(xc2ul, data.left), (xc2ur, data.right)],
        init_pose,
        &handle.config,
    )
    .inspect_err(|e| log::debug!("icp_stereo_point failed: {e}"))
}

fn solve(
    cameras: &[(Mat34, Correspondences)],
    init_pose: &Mat34,
    config: &IcpConfig,
) -> Result<IcpResult, IcpError> {
    let num_points: usize = cameras.iter().map(|(_, data)| data.len()).sum();
    if num_points < MIN_CORRESPONDENCES {
        return Err(IcpError::InsufficientCorrespondences {
            required: MIN_CORRESPONDENCES,
            actual: num_points,
        });
    }

    let mut j_u_s = Matrix::zeros(2 * num_points, 6)?;
    let mut du = Matrix::zeros(2 * num_points, 1)?;

    let mut pose = *init_pose;
    let mut err0 = 0.0;
    let mut i = 0;

    let err = loop {
        let mut sum = 0.0;
        let mut index = 0;
        for (xc2u, data) in cameras {
            let xw2u = mat34_mul(xc2u, &pose);
            for (xw, u) in data.world().iter().zip(data.screen()) {
                let proj = project(&xw2u, xw).ok_or(IcpError::ProjectionFailure { index })?;
                let dx = u[0] - proj[0];
                let dy = u[1] - proj[1];
                du[(2 * index, 0)] = dx;
                du[(2 * index + 1, 0)] = dy;
                sum += dx * dx + dy * dy;
                index += 1;
            }
        }
        let err1 = sum / num_points as f64;
        log::debug!("Iteration {}: err = {:.6}", i, err1);

        if err1 < config.break_loop_error_thresh {
            break err1;
        }
        if i > 0
            && err1 < config.break_loop_error_thresh2
            && err1 / err0 > config.break_loop_error_ratio_thresh
        {
            break err1;
        }
        if i == config.max_loop {
            break err1;
        }
        err0 = err1;

        let mut index = 0;
        for (xc2u, data) in cameras {
            for xw in data.world() {
                let j = jacobian_u_s(xc2u, &pose, xw)
                    .ok_or(IcpError::ProjectionFailure { index })?;
                for (r, row) in j.iter().enumerate() {
                    for (c, val) in row.iter().enumerate() {
                        j_u_s[(2 * index + r, c)] = *val;
                    }
                }
                index += 1;
            }
        }

        let ds = delta_s(&du, &j_u_s)?;
        pose = update_pose(&pose, &ds);
        i += 1;
    };

    log::debug!("Converged after {} iterations, err = {:.6}", i, err);

    Ok(IcpResult {
        pose,
        err,
        num_iterations: i,
    })
}
