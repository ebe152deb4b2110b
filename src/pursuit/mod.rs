//! Sparse-coding solvers: given a fixed dictionary D (n x K) and samples
//! Y (n x N), find a coefficient matrix A (K x N) whose columns are sparse
//! and satisfy D A ~= Y. Column fits are independent and run in parallel.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::dictionary::Dictionary;
use crate::error::{Result, SparselandError};

mod matching;
mod orthogonal;
mod thresholding;

pub use matching::MatchingPursuit;
pub use orthogonal::OrthogonalMatchingPursuit;
pub use thresholding::ThresholdingPursuit;

/// Stopping criterion for a pursuit. Exactly one is always in force; the
/// both-or-neither misconfiguration cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCriterion {
    /// Stop once a column holds this many non-zero coefficients.
    Sparsity(usize),
    /// Stop once the squared residual norm falls below `n * tol^2`.
    Tolerance(f64),
}

/// Selects a pursuit variant for the learning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuitKind {
    Matching,
    Orthogonal,
    Thresholding,
}

/// Shared contract of the pursuit family. Implementations never mutate
/// the dictionary they were constructed with.
pub trait Pursuit {
    /// Sparse-codes every column of `y`, returning a K x N coefficient
    /// matrix with the same column indexing as the input.
    fn fit(&self, y: ArrayView2<f64>) -> Result<Array2<f64>>;
}

pub(crate) fn check_dims(dictionary: &Dictionary, y: ArrayView2<f64>) -> Result<()> {
    if y.nrows() != dictionary.atom_dim() {
        return Err(SparselandError::DimensionMismatch {
            expected: dictionary.atom_dim(),
            got: y.nrows(),
        });
    }
    Ok(())
}

/// Runs `solve` over every column of `y` in parallel and assembles the
/// coefficient matrix.
pub(crate) fn fit_columns<F>(y: ArrayView2<f64>, num_atoms: usize, solve: F) -> Result<Array2<f64>>
where
    F: Fn(ArrayView1<f64>) -> Result<Array1<f64>> + Sync,
{
    let columns: Vec<Array1<f64>> = y
        .axis_iter(Axis(1))
        .into_par_iter()
        .map(|col| solve(col))
        .collect::<Result<Vec<_>>>()?;

    let mut alphas = Array2::zeros((num_atoms, columns.len()));
    for (i, coeffs) in columns.iter().enumerate() {
        alphas.column_mut(i).assign(coeffs);
    }
    Ok(alphas)
}
