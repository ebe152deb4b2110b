use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Result, SparselandError};

/// Full factorization of a dense matrix. Singular values are returned in
/// whatever order the backend produces; consumers locate the dominant
/// triplet explicitly via [`SvdFactors::dominant`].
pub struct SvdFactors {
    pub u: Array2<f64>,
    pub s: Array1<f64>,
    pub vt: Array2<f64>,
}

impl SvdFactors {
    /// Index of the largest singular value.
    pub fn dominant(&self) -> usize {
        let mut best = 0;
        for (i, &sv) in self.s.iter().enumerate() {
            if sv > self.s[best] {
                best = i;
            }
        }
        best
    }

    pub fn reconstruct(&self) -> Array2<f64> {
        let s_diag = Array2::from_diag(&self.s);
        self.u.dot(&s_diag).dot(&self.vt)
    }
}

/// Seam for the dense SVD used by the exact K-SVD atom update.
pub trait SvdProvider: Send + Sync {
    fn compute(&self, matrix: ArrayView2<f64>) -> Result<SvdFactors>;
}

/// Default provider backed by nalgebra's dense SVD.
#[derive(Debug, Clone, Copy, Default)]
pub struct NalgebraSvd;

impl SvdProvider for NalgebraSvd {
    fn compute(&self, matrix: ArrayView2<f64>) -> Result<SvdFactors> {
        let svd = nalgebra::SVD::new(to_nalgebra(matrix), true, true);
        let u = svd
            .u
            .ok_or_else(|| SparselandError::Numeric("SVD did not produce U".into()))?;
        let vt = svd
            .v_t
            .ok_or_else(|| SparselandError::Numeric("SVD did not produce Vt".into()))?;
        Ok(SvdFactors {
            u: to_ndarray(&u),
            s: Array1::from_iter(svd.singular_values.iter().cloned()),
            vt: to_ndarray(&vt),
        })
    }
}

/// Minimum-norm least-squares solution of `a x = b` through the SVD.
pub fn least_squares(a: ArrayView2<f64>, b: ArrayView1<f64>) -> Result<Array1<f64>> {
    if a.nrows() != b.len() {
        return Err(SparselandError::DimensionMismatch {
            expected: a.nrows(),
            got: b.len(),
        });
    }
    let svd = nalgebra::SVD::new(to_nalgebra(a), true, true);
    let rhs = DVector::from_iterator(b.len(), b.iter().cloned());
    let solution = svd
        .solve(&rhs, 1e-12)
        .map_err(|e| SparselandError::Numeric(e.to_string()))?;
    Ok(Array1::from_iter(solution.iter().cloned()))
}

fn to_nalgebra(a: ArrayView2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |r, c| a[(r, c)])
}

fn to_ndarray(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(r, c)| m[(r, c)])
}
