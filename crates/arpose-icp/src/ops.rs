use arpose_linalg::{mat34_from_rt, mat34_mul, rodrigues, Mat34, Matrix};

use crate::error::IcpError;

/// Project a target point through a 3x4 matrix into image coordinates.
///
/// Returns `None` when the point lies on or behind the camera plane
/// (homogeneous denominator not positive) or the result is not finite.
pub(crate) fn project(xw2u: &Mat34, xw: &[f64; 3]) -> Option<[f64; 2]> {
    let [hx, hy, h] = apply(xw2u, xw);
    if h <= 0.0 {
        return None;
    }
    let u = [hx / h, hy / h];
    (u[0].is_finite() && u[1].is_finite()).then_some(u)
}

/// Derivative of the projected image point with respect to the six pose
/// parameters `[wx, wy, wz, tx, ty, tz]` of a body-frame increment.
pub(crate) fn jacobian_u_s(xc2u: &Mat34, pose: &Mat34, xw: &[f64; 3]) -> Option<[[f64; 6]; 2]> {
    let xc = apply(pose, xw);
    let [hx, hy, h] = apply(xc2u, &xc);
    if h <= 0.0 {
        return None;
    }
    let h2 = h * h;

    let mut j_u_xc = [[0.0; 3]; 2];
    for k in 0..3 {
        j_u_xc[0][k] = (xc2u[0][k] * h - hx * xc2u[2][k]) / h2;
        j_u_xc[1][k] = (xc2u[1][k] * h - hy * xc2u[2][k]) / h2;
    }

    // d(Xc)/d(w_k) = R (e_k x Xw), d(Xc)/d(t_k) = R e_k
    let [x, y, z] = *xw;
    let cross = [[0.0, -z, y], [z, 0.0, -x], [-y, x, 0.0]];
    let mut j_xc_s = [[0.0; 6]; 3];
    for (r, row) in j_xc_s.iter_mut().enumerate() {
        for (k, c) in cross.iter().enumerate() {
            row[k] = pose[r][0] * c[0] + pose[r][1] * c[1] + pose[r][2] * c[2];
            row[k + 3] = pose[r][k];
        }
    }

    let mut j = [[0.0; 6]; 2];
    for (r, row) in j.iter_mut().enumerate() {
        for (c, val) in row.iter_mut().enumerate() {
            *val = (0..3).map(|k| j_u_xc[r][k] * j_xc_s[k][c]).sum();
        }
    }

    j.iter()
        .flatten()
        .all(|v| v.is_finite())
        .then_some(j)
}

/// Solve the normal equations `dS = (J^T J)^-1 J^T dU`.
pub(crate) fn delta_s(du: &Matrix, j_u_s: &Matrix) -> Result<[f64; 6], IcpError> {
    let j_t = j_u_s.transposed()?;
    let mut j_tj = j_t.matmul(j_u_s)?;
    j_tj.self_inverse()?;
    let j_tdu = j_t.matmul(du)?;
    let ds = j_tj.matmul(&j_tdu)?;

    let mut out = [0.0; 6];
    out.copy_from_slice(ds.as_slice());
    Ok(out)
}

/// Apply a body-frame increment: `pose * [rodrigues(dS[0..3]) | dS[3..6]]`.
pub(crate) fn update_pose(pose: &Mat34, ds: &[f64; 6]) -> Mat34 {
    let d_rot = rodrigues(&[ds[0], ds[1], ds[2]]);
    let delta = mat34_from_rt(&d_rot, &[ds[3], ds[4], ds[5]]);
    mat34_mul(pose, &delta)
}

fn apply(m: &Mat34, p: &[f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (o, row) in out.iter_mut().zip(m.iter()) {
        *o = row[0] * p[0] + row[1] * p[1] + row[2] * p[2] + row[3];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use arpose_linalg::MAT34_IDENTITY;

    const K: Mat34 = [
        [800.0, 0.0, 320.0, 0.0],
        [0.0, 800.0, 240.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
    ];

    fn test_pose() -> Mat34 {
        let r = rodrigues(&[0.1, -0.2, 0.05]);
        mat34_from_rt(&r, &[0.3, -0.1, 6.0])
    }

    #[test]
    fn test_project() {
        let pose = [
            [1.0, 0.0, 0.0, -0.5],
            [0.0, 1.0, 0.0, -0.5],
            [0.0, 0.0, 1.0, 10.0],
        ];
        let xw2u = mat34_mul(&K, &pose);
        let u = project(&xw2u, &[1.0, 1.0, 0.0]).unwrap();
        assert_relative_eq!(u[0], 360.0, epsilon = 1e-9);
        assert_relative_eq!(u[1], 280.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_zero_depth() {
        assert!(project(&K, &[1.0, 1.0, 0.0]).is_none());
        assert!(project(&MAT34_IDENTITY, &[0.0, 0.0, f64::NAN]).is_none());
    }

    #[test]
    fn test_jacobian_matches_finite_differences() {
        let pose = test_pose();
        let xw = [0.4, -0.7, 0.2];
        let j = jacobian_u_s(&K, &pose, &xw).unwrap();

        let eps = 1e-6;
        for k in 0..6 {
            let mut ds = [0.0; 6];
            ds[k] = eps;
            let plus = project(&mat34_mul(&K, &update_pose(&pose, &ds)), &xw).unwrap();
            ds[k] = -eps;
            let minus = project(&mat34_mul(&K, &update_pose(&pose, &ds)), &xw).unwrap();
            for r in 0..2 {
                let numeric = (plus[r] - minus[r]) / (2.0 * eps);
                assert_relative_eq!(j[r][k], numeric, epsilon = 1e-4, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn test_project_behind_camera() {
        let pose = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, -10.0],
        ];
        assert!(project(&mat34_mul(&K, &pose), &[0.5, 0.5, 0.0]).is_none());
    }

    #[test]
    fn test_jacobian_zero_depth() {
        assert!(jacobian_u_s(&K, &MAT34_IDENTITY, &[1.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_jacobian_behind_camera() {
        let mut pose = MAT34_IDENTITY;
        pose[2][3] = -5.0;
        assert!(jacobian_u_s(&K, &pose, &[1.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_delta_s_identity_system() -> Result<(), Box<dyn std::error::Error>> {
        let j = Matrix::identity(6)?;
        let du = Matrix::from_row_slice(6, 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let ds = delta_s(&du, &j)?;
        for (k, v) in ds.iter().enumerate() {
            assert_relative_eq!(*v, (k + 1) as f64, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_delta_s_singular() -> Result<(), Box<dyn std::error::Error>> {
        let j = Matrix::zeros(6, 6)?;
        let du = Matrix::zeros(6, 1)?;
        assert_eq!(delta_s(&du, &j), Err(IcpError::SingularSystem));
        Ok(())
    }

    #[test]
    fn test_update_pose_zero_increment() {
        let pose = test_pose();
        let updated = update_pose(&pose, &[0.0; 6]);
        for (a, b) in updated.iter().flatten().zip(pose.iter().flatten()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_update_pose_translation_in_body_frame() {
        let pose = [
            [0.0, -1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 2.0],
            [0.0, 0.0, 1.0, 3.0],
        ];
        let updated = update_pose(&pose, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_relative_eq!(updated[0][3], 1.0, epsilon = 1e-15);
        assert_relative_eq!(updated[1][3], 3.0, epsilon = 1e-15);
        assert_relative_eq!(updated[2][3], 3.0, epsilon = 1e-15);
    }
}
