/// A 3x4 transform `[R|t]` (or a 3x4 projection matrix), row-major.
pub type Mat34 = [[f64; 4]; 3];

/// The identity 3x4 transform.
pub const MAT34_IDENTITY: Mat34 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
];

/// Compose two 3x4 transforms as `a * b`.
///
/// Both operands are treated as 4x4 matrices with an implicit last row
/// `[0, 0, 0, 1]`, so the result maps through `b` first and then `a`.
///
/// Example:
///
/// ```
/// use arpose_linalg::transform::{mat34_mul, MAT34_IDENTITY};
///
/// let t = [[1.0, 0.0, 0.0, 2.0], [0.0, 1.0, 0.0, 3.0], [0.0, 0.0, 1.0, 4.0]];
/// assert_eq!(mat34_mul(&MAT34_IDENTITY, &t), t);
/// ```
pub fn mat34_mul(a: &Mat34, b: &Mat34) -> Mat34 {
    let mut out = [[0.0; 4]; 3];
    for (j, row) in out.iter_mut().enumerate() {
        for (i, val) in row.iter_mut().enumerate() {
            *val = a[j][0] * b[0][i] + a[j][1] * b[1][i] + a[j][2] * b[2][i];
        }
        row[3] += a[j][3];
    }
    out
}

/// Build a 3x4 transform from a rotation matrix and a translation vector.
pub fn mat34_from_rt(rotation: &[[f64; 3]; 3], translation: &[f64; 3]) -> Mat34 {
    let mut out = [[0.0; 4]; 3];
    for j in 0..3 {
        out[j][..3].copy_from_slice(&rotation[j]);
        out[j][3] = translation[j];
    }
    out
}

/// Compute the rotation matrix for a rotation vector (axis scaled by angle).
///
/// Near zero the first-order expansion `I + [w]x` is returned.
pub fn rodrigues(rvec: &[f64; 3]) -> [[f64; 3]; 3] {
    let theta = (rvec[0] * rvec[0] + rvec[1] * rvec[1] + rvec[2] * rvec[2]).sqrt();
    if theta < 1e-12 {
        return [
            [1.0, -rvec[2], rvec[1]],
            [rvec[2], 1.0, -rvec[0]],
            [-rvec[1], rvec[0], 1.0],
        ];
    }

    let x = rvec[0] / theta;
    let y = rvec[1] / theta;
    let z = rvec[2] / theta;

    let c = theta.cos();
    let s = theta.sin();
    let t = 1.0 - c;

    let tmp1 = x * y * t;
    let tmp2 = z * s;
    let tmp3 = x * z * t;
    let tmp4 = y * s;
    let tmp5 = y * z * t;
    let tmp6 = x * s;

    [
        [c + x * x * t, tmp1 - tmp2, tmp3 + tmp4],
        [tmp1 + tmp2, c + y * y * t, tmp5 - tmp6],
        [tmp3 - tmp4, tmp5 + tmp6, c + z * z * t],
    ]
}
