use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::svd::least_squares;
use crate::utils::{argmax_abs, ZERO_TOL};

use super::{check_dims, fit_columns, Pursuit, StopCriterion};

/// Orthogonal matching pursuit. Like plain matching pursuit it grows the
/// support greedily, but after every selection the coefficients over the
/// whole support are re-solved in the least-squares sense, so the residual
/// stays orthogonal to every selected atom.
#[derive(Debug, Clone)]
pub struct OrthogonalMatchingPursuit {
    dictionary: Dictionary,
    criterion: StopCriterion,
}

impl OrthogonalMatchingPursuit {
    pub fn new(dictionary: Dictionary, criterion: StopCriterion) -> Self {
        OrthogonalMatchingPursuit {
            dictionary,
            criterion,
        }
    }

    fn fit_column(&self, y: ArrayView1<f64>) -> Result<Array1<f64>> {
        let d = self.dictionary.matrix();
        let (n, k) = d.dim();

        let mut support: Vec<usize> = Vec::new();
        let mut solution = Array1::zeros(0);
        let mut residual = y.to_owned();

        loop {
            let finished = match self.criterion {
                StopCriterion::Sparsity(s) => support.len() >= s,
                StopCriterion::Tolerance(tol) => {
                    residual.dot(&residual) < n as f64 * tol * tol
                }
            };
            // The least-squares system degenerates past n atoms.
            if finished || support.len() >= n {
                break;
            }

            let correlations = d.t().dot(&residual);
            let (atom, alpha) = argmax_abs(correlations.view());
            if alpha.abs() <= ZERO_TOL || support.contains(&atom) {
                break;
            }
            support.push(atom);

            let restricted = d.select(Axis(1), &support);
            solution = least_squares(restricted.view(), y)?;
            residual = y.to_owned() - restricted.dot(&solution);
        }

        let mut coeffs = Array1::zeros(k);
        for (slot, &atom) in support.iter().enumerate() {
            coeffs[atom] = solution[slot];
        }
        Ok(coeffs)
    }
}

impl Pursuit for OrthogonalMatchingPursuit {
    fn fit(&self, y: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_dims(&self.dictionary, y)?;
        fit_columns(y, self.dictionary.num_atoms(), |col| self.fit_column(col))
    }
}
