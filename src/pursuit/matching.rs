use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::utils::{argmax_abs, count_nonzero, ZERO_TOL};

use super::{check_dims, fit_columns, Pursuit, StopCriterion};

/// Greedy matching pursuit. Each iteration picks the atom most correlated
/// with the residual and peels off its contribution. Atoms may be selected
/// more than once; their coefficients accumulate additively.
#[derive(Debug, Clone)]
pub struct MatchingPursuit {
    dictionary: Dictionary,
    criterion: StopCriterion,
    max_iter: Option<usize>,
}

impl MatchingPursuit {
    pub fn new(dictionary: Dictionary, criterion: StopCriterion) -> Self {
        MatchingPursuit {
            dictionary,
            criterion,
            max_iter: None,
        }
    }

    /// Caps the number of greedy iterations per signal column.
    pub fn max_iter(mut self, cap: usize) -> Self {
        self.max_iter = Some(cap);
        self
    }

    fn fit_column(&self, y: ArrayView1<f64>) -> Result<Array1<f64>> {
        let d = self.dictionary.matrix();
        let (n, k) = d.dim();
        let cap = self.max_iter.unwrap_or(usize::MAX);

        let mut coeffs = Array1::zeros(k);
        let mut residual = y.to_owned();
        let mut iterations = 0;

        loop {
            let finished = match self.criterion {
                StopCriterion::Sparsity(s) => count_nonzero(coeffs.view()) >= s,
                StopCriterion::Tolerance(tol) => {
                    residual.dot(&residual) < n as f64 * tol * tol || 2 * iterations >= n
                }
            };
            if finished || iterations >= cap {
                break;
            }

            let correlations = d.t().dot(&residual);
            let (atom, alpha) = argmax_abs(correlations.view());
            residual.scaled_add(-alpha, &d.column(atom));
            if alpha.abs() <= ZERO_TOL {
                // No atom explains the residual any further.
                break;
            }
            coeffs[atom] += alpha;
            iterations += 1;
        }
        Ok(coeffs)
    }
}

impl Pursuit for MatchingPursuit {
    fn fit(&self, y: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_dims(&self.dictionary, y)?;
        fit_columns(y, self.dictionary.num_atoms(), |col| self.fit_column(col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2, Axis};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Array2::from_shape_fn((rows, cols), |_| rng.random::<f64>() - 0.5)
    }

    #[test]
    fn test_sparsity_bound_holds_per_column() {
        let dict = Dictionary::random(3, 4, Some(1)).unwrap();
        let y = random_matrix(9, 12, 2);
        let mp = MatchingPursuit::new(dict, StopCriterion::Sparsity(3));
        let alphas = mp.fit(y.view()).unwrap();
        assert_eq!(alphas.dim(), (16, 12));
        for col in alphas.axis_iter(Axis(1)) {
            assert!(count_nonzero(col) <= 3);
        }
    }

    #[test]
    fn test_zero_sparsity_yields_zero_coefficients() {
        let dict = Dictionary::new(Array2::eye(4));
        let y = array![[1.0], [2.0], [3.0], [4.0]];
        let mp = MatchingPursuit::new(dict, StopCriterion::Sparsity(0));
        let alphas = mp.fit(y.view()).unwrap();
        assert_eq!(count_nonzero(alphas.column(0)), 0);
    }

    #[test]
    fn test_recovers_single_atom_signal() {
        let dict = Dictionary::dct(2, 2).unwrap();
        let k = dict.num_atoms();
        // The signal is atom 2 scaled by 2.5.
        let y = dict
            .matrix()
            .column(2)
            .mapv(|x| x * 2.5)
            .insert_axis(Axis(1));
        let mp = MatchingPursuit::new(dict, StopCriterion::Sparsity(k));
        let alphas = mp.fit(y.view()).unwrap();
        assert_eq!(count_nonzero(alphas.column(0)), 1);
        assert_abs_diff_eq!(alphas[(2, 0)], 2.5, epsilon = 1e-10);
    }

    #[test]
    fn test_identity_dictionary_basis_vector() {
        // D = I4, Y = e2: single non-zero at index 1 with value 1.0.
        let dict = Dictionary::new(Array2::eye(4));
        let y = array![[0.0], [1.0], [0.0], [0.0]];
        let mp = MatchingPursuit::new(dict, StopCriterion::Sparsity(1));
        let alphas = mp.fit(y.view()).unwrap();
        assert_abs_diff_eq!(alphas[(1, 0)], 1.0);
        assert_eq!(count_nonzero(alphas.column(0)), 1);
    }

    #[test]
    fn test_tolerance_mode_skips_small_signals() {
        let dict = Dictionary::new(Array2::eye(3));
        let y = array![[0.1], [0.0], [0.0]];
        // n * tol^2 = 3 * 1 far exceeds the signal energy.
        let mp = MatchingPursuit::new(dict, StopCriterion::Tolerance(1.0));
        let alphas = mp.fit(y.view()).unwrap();
        assert_eq!(count_nonzero(alphas.column(0)), 0);
    }

    #[test]
    fn test_tolerance_mode_reduces_residual() {
        let dict = Dictionary::dct(4, 4).unwrap();
        let y = random_matrix(16, 5, 3);
        let mp = MatchingPursuit::new(dict.clone(), StopCriterion::Tolerance(0.05));
        let alphas = mp.fit(y.view()).unwrap();
        let residual = &y - &dict.matrix().dot(&alphas);
        for (col, res) in y.axis_iter(Axis(1)).zip(residual.axis_iter(Axis(1))) {
            assert!(res.dot(&res) <= col.dot(&col));
        }
    }

    #[test]
    fn test_max_iter_caps_selection() {
        let dict = Dictionary::random(3, 3, Some(4)).unwrap();
        let y = random_matrix(9, 2, 5);
        let mp = MatchingPursuit::new(dict, StopCriterion::Sparsity(9)).max_iter(2);
        let alphas = mp.fit(y.view()).unwrap();
        for col in alphas.axis_iter(Axis(1)) {
            assert!(count_nonzero(col) <= 2);
        }
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let dict = Dictionary::new(Array2::eye(4));
        let y = Array2::zeros((3, 2));
        let mp = MatchingPursuit::new(dict, StopCriterion::Sparsity(1));
        assert!(matches!(
            mp.fit(y.view()),
            Err(crate::error::SparselandError::DimensionMismatch { expected: 4, got: 3 })
        ));
    }
}
