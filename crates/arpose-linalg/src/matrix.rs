use std::ops::{Index, IndexMut};

use crate::error::LinalgError;

/// Relative pivot magnitude below which a matrix is treated as singular.
const PIVOT_EPS: f64 = 1e-12;

/// A dense, row-major `f64` matrix that owns its storage.
///
/// Elements are addressed by `(row, col)` and every access is bounds checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Allocates a zero-filled `rows x cols` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::AllocationFailure`] if the buffer cannot be reserved.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, LinalgError> {
        let len = rows
            .checked_mul(cols)
            .ok_or(LinalgError::AllocationFailure(rows, cols))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| LinalgError::AllocationFailure(rows, cols))?;
        data.resize(len, 0.0);
        Ok(Self { rows, cols, data })
    }

    /// Allocates an `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Self, LinalgError> {
        let mut m = Self::zeros(n, n)?;
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        Ok(m)
    }

    /// Builds a matrix by copying a row-major slice.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] when `data.len() != rows * cols`.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[f64]) -> Result<Self, LinalgError> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(LinalgError::DimensionMismatch {
                op: "from_row_slice",
                lhs_rows: rows,
                lhs_cols: cols,
                rhs_rows: data.len(),
                rhs_cols: 1,
            });
        }
        let mut m = Self::zeros(rows, cols)?;
        m.data.copy_from_slice(data);
        Ok(m)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The underlying row-major storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// A borrowed `faer` view over the same storage.
    pub fn as_faer(&self) -> faer::MatRef<'_, f64> {
        faer::mat::from_row_major_slice(&self.data, self.rows, self.cols)
    }

    fn as_faer_mut(&mut self) -> faer::MatMut<'_, f64> {
        faer::mat::from_row_major_slice_mut(&mut self.data, self.rows, self.cols)
    }

    /// Computes `self * rhs` into a newly allocated matrix.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix, LinalgError> {
        check_mul_shapes(self, rhs)?;
        let mut dest = Matrix::zeros(self.rows, rhs.cols)?;
        mul(&mut dest, self, rhs)?;
        Ok(dest)
    }

    /// Returns the transpose as a newly allocated matrix.
    pub fn transposed(&self) -> Result<Matrix, LinalgError> {
        let mut dest = Matrix::zeros(self.cols, self.rows)?;
        transpose(&mut dest, self)?;
        Ok(dest)
    }

    /// Inverts a square matrix in place using Gauss-Jordan elimination with
    /// partial pivoting.
    ///
    /// The matrix is left untouched when an error is returned.
    ///
    /// # Errors
    ///
    /// - [`LinalgError::DimensionMismatch`] if the matrix is not square.
    /// - [`LinalgError::Singular`] if a pivot vanishes relative to the largest entry.
    pub fn self_inverse(&mut self) -> Result<(), LinalgError> {
        if self.rows != self.cols {
            return Err(LinalgError::DimensionMismatch {
                op: "inverse",
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: self.rows,
                rhs_cols: self.cols,
            });
        }
        let n = self.rows;

        let scale = self.data.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if !scale.is_finite() || scale == 0.0 {
            return Err(LinalgError::Singular);
        }
        let tol = scale * PIVOT_EPS;

        let mut a = self.clone();
        let mut inv = Matrix::identity(n)?;

        for i in 0..n {
            let mut piv = i;
            let mut max_val = a[(i, i)].abs();
            for r in (i + 1)..n {
                let v = a[(r, i)].abs();
                if v > max_val {
                    max_val = v;
                    piv = r;
                }
            }
            if max_val <= tol {
                return Err(LinalgError::Singular);
            }
            if piv != i {
                a.swap_rows(i, piv);
                inv.swap_rows(i, piv);
            }

            let diag = a[(i, i)];
            for c in 0..n {
                a[(i, c)] /= diag;
                inv[(i, c)] /= diag;
            }

            for r in 0..n {
                if r == i {
                    continue;
                }
                let factor = a[(r, i)];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..n {
                    let pa = a[(i, c)];
                    let pi = inv[(i, c)];
                    a[(r, c)] -= factor * pa;
                    inv[(r, c)] -= factor * pi;
                }
            }
        }

        *self = inv;
        Ok(())
    }

    fn swap_rows(&mut self, r0: usize, r1: usize) {
        for c in 0..self.cols {
            self.data.swap(r0 * self.cols + c, r1 * self.cols + c);
        }
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "Index ({row}, {col}) out of bounds for a {}x{} matrix",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.data[self.offset(row, col)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        let offset = self.offset(row, col);
        &mut self.data[offset]
    }
}

fn check_mul_shapes(a: &Matrix, b: &Matrix) -> Result<(), LinalgError> {
    if a.cols != b.rows {
        return Err(LinalgError::DimensionMismatch {
            op: "mul",
            lhs_rows: a.rows,
            lhs_cols: a.cols,
            rhs_rows: b.rows,
            rhs_cols: b.cols,
        });
    }
    Ok(())
}

/// Computes `dest = a * b`.
///
/// # Errors
///
/// Returns [`LinalgError::DimensionMismatch`] if the inner dimensions differ or
/// `dest` is not `rows(a) x cols(b)`. `dest` is not written in that case.
pub fn mul(dest: &mut Matrix, a: &Matrix, b: &Matrix) -> Result<(), LinalgError> {
    check_mul_shapes(a, b)?;
    if dest.rows != a.rows || dest.cols != b.cols {
        return Err(LinalgError::DimensionMismatch {
            op: "mul destination",
            lhs_rows: dest.rows,
            lhs_cols: dest.cols,
            rhs_rows: a.rows,
            rhs_cols: b.cols,
        });
    }

    let mut dst = dest.as_faer_mut();
    faer::linalg::matmul::matmul(
        &mut dst,
        a.as_faer(),
        b.as_faer(),
        None,
        1.0,
        faer::Parallelism::None,
    );
    Ok(())
}

/// Allocates a `rows(a) x cols(b)` matrix holding `a * b`.
///
/// Returns `None` when the multiplication is not defined or the result cannot
/// be allocated; no partially initialized matrix is ever returned.
///
/// Example:
///
/// ```
/// use arpose_linalg::{alloc_mul, Matrix};
///
/// let a = Matrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let b = Matrix::from_row_slice(4, 2, &[0.0; 8]).unwrap();
/// assert!(alloc_mul(&a, &b).is_none());
/// ```
pub fn alloc_mul(a: &Matrix, b: &Matrix) -> Option<Matrix> {
    a.matmul(b).ok()
}

/// Writes the transpose of `src` into `dest`.
pub fn transpose(dest: &mut Matrix, src: &Matrix) -> Result<(), LinalgError> {
    if dest.rows != src.cols || dest.cols != src.rows {
        return Err(LinalgError::DimensionMismatch {
            op: "transpose",
            lhs_rows: dest.rows,
            lhs_cols: dest.cols,
            rhs_rows: src.rows,
            rhs_cols: src.cols,
        });
    }
    for r in 0..src.rows {
        for c in 0..src.cols {
            dest[(c, r)] = src[(r, c)];
        }
    }
    Ok(())
}

/// Allocates the transpose of `src`, or `None` if the allocation fails.
pub fn alloc_transpose(src: &Matrix) -> Option<Matrix> {
    src.transposed().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_alloc_mul() -> Result<(), LinalgError> {
        let a = Matrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let b = Matrix::from_row_slice(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0])?;
        let c = alloc_mul(&a, &b).expect("shapes are compatible");
        assert_eq!(c.rows(), 2);
        assert_eq!(c.cols(), 2);
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
        Ok(())
    }

    #[test]
    fn test_alloc_mul_mismatched_inner_dims() -> Result<(), LinalgError> {
        let a = Matrix::zeros(2, 3)?;
        let b = Matrix::zeros(4, 2)?;
        assert!(alloc_mul(&a, &b).is_none());
        Ok(())
    }

    #[test]
    fn test_mul_rejects_wrong_destination() -> Result<(), LinalgError> {
        let a = Matrix::identity(2)?;
        let b = Matrix::identity(2)?;
        let mut dest = Matrix::from_row_slice(3, 2, &[9.0; 6])?;
        assert!(matches!(
            mul(&mut dest, &a, &b),
            Err(LinalgError::DimensionMismatch { .. })
        ));
        assert_eq!(dest.as_slice(), &[9.0; 6]);
        Ok(())
    }

    #[test]
    fn test_transpose() -> Result<(), LinalgError> {
        let a = Matrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let t = alloc_transpose(&a).expect("allocation");
        assert_eq!(t.rows(), 3);
        assert_eq!(t[(2, 1)], 6.0);
        assert_eq!(t[(0, 1)], 4.0);
        Ok(())
    }

    #[test]
    fn test_self_inverse() -> Result<(), LinalgError> {
        let a = Matrix::from_row_slice(3, 3, &[4.0, 7.0, 2.0, 3.0, 6.0, 1.0, 2.0, 5.0, 3.0])?;
        let mut inv = a.clone();
        inv.self_inverse()?;
        let id = a.matmul(&inv)?;
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_relative_eq!(id[(r, c)], expected, epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_self_inverse_needs_pivoting() -> Result<(), LinalgError> {
        let mut a = Matrix::from_row_slice(2, 2, &[0.0, 1.0, 2.0, 0.0])?;
        a.self_inverse()?;
        assert_eq!(a.as_slice(), &[0.0, 0.5, 1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_self_inverse_singular_keeps_input() -> Result<(), LinalgError> {
        let data = [1.0, 2.0, 2.0, 4.0];
        let mut a = Matrix::from_row_slice(2, 2, &data)?;
        assert_eq!(a.self_inverse(), Err(LinalgError::Singular));
        assert_eq!(a.as_slice(), &data);
        Ok(())
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds() {
        let m = Matrix::zeros(2, 2).unwrap();
        let _ = m[(2, 0)];
    }
}
