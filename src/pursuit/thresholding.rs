use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::dictionary::Dictionary;
use crate::error::{Result, SparselandError};

use super::{check_dims, fit_columns, Pursuit, StopCriterion};

/// Thresholding pursuit: one correlation pass per signal, keeping the
/// `sparsity` largest correlation magnitudes as coefficients. The retained
/// values are unsigned magnitudes, not least-squares-refined coefficients.
/// Only the sparsity criterion is supported.
#[derive(Debug, Clone)]
pub struct ThresholdingPursuit {
    dictionary: Dictionary,
    sparsity: usize,
}

impl ThresholdingPursuit {
    pub fn new(dictionary: Dictionary, criterion: StopCriterion) -> Result<Self> {
        match criterion {
            StopCriterion::Sparsity(sparsity) => Ok(ThresholdingPursuit {
                dictionary,
                sparsity,
            }),
            StopCriterion::Tolerance(_) => Err(SparselandError::InvalidCriterion(
                "thresholding pursuit only supports a sparsity target".into(),
            )),
        }
    }

    fn fit_column(&self, y: ArrayView1<f64>) -> Result<Array1<f64>> {
        let d = self.dictionary.matrix();
        let k = d.ncols();
        let magnitudes = d.t().dot(&y).mapv(f64::abs);

        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| magnitudes[b].total_cmp(&magnitudes[a]));

        let mut coeffs = Array1::zeros(k);
        for &atom in order.iter().take(self.sparsity) {
            coeffs[atom] = magnitudes[atom];
        }
        Ok(coeffs)
    }
}

impl Pursuit for ThresholdingPursuit {
    fn fit(&self, y: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_dims(&self.dictionary, y)?;
        fit_columns(y, self.dictionary.num_atoms(), |col| self.fit_column(col))
    }
}
