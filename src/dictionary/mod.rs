use ndarray::{s, Array2};

use crate::error::{Result, SparselandError};
use crate::utils::{is_perfect_square, l2_norm};

mod init;

const UNIT_TOL: f64 = 1e-8;

/// An n x K matrix whose columns are atoms. K >= n (overcomplete) is the
/// typical regime; columns are not normalized unless the constructor says so.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    matrix: Array2<f64>,
}

impl Dictionary {
    pub fn new(matrix: Array2<f64>) -> Self {
        Dictionary { matrix }
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn into_matrix(self) -> Array2<f64> {
        self.matrix
    }

    /// Signal dimension n.
    pub fn atom_dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of atoms K.
    pub fn num_atoms(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.matrix.dim()
    }

    /// True iff the dictionary is square and orthonormal. Non-square
    /// dictionaries are never unitary.
    pub fn is_unitary(&self) -> bool {
        let (n, k) = self.matrix.dim();
        if n != k {
            return false;
        }
        let gram = self.matrix.t().dot(&self.matrix);
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { 1.0 } else { 0.0 };
                if (gram[(i, j)] - expected).abs() > UNIT_TOL {
                    return false;
                }
            }
        }
        true
    }

    /// True iff every atom has unit L2 norm.
    pub fn is_normalized(&self) -> bool {
        self.matrix
            .columns()
            .into_iter()
            .all(|col| (l2_norm(col) - 1.0).abs() <= UNIT_TOL)
    }

    /// Largest normalized inner product over all distinct atom pairs.
    /// Returns 0.0 for dictionaries with fewer than two atoms.
    pub fn mutual_coherence(&self) -> f64 {
        let k = self.num_atoms();
        let mut mu: f64 = 0.0;
        for i in 0..k {
            let di = self.matrix.column(i);
            let ni = l2_norm(di);
            for j in (i + 1)..k {
                let dj = self.matrix.column(j);
                let coherence = di.dot(&dj).abs() / (ni * l2_norm(dj));
                mu = mu.max(coherence);
            }
        }
        mu
    }

    /// Tiles the atoms into a single 2-D image for inspection: each atom is
    /// min-max stretched independently, reshaped into a square patch, and
    /// placed on a grid with one-pixel borders. Requires both n and K to be
    /// perfect squares.
    pub fn to_img(&self) -> Result<Array2<f64>> {
        let (n, k) = self.matrix.dim();
        let (n_r, k_r) = match (is_perfect_square(n), is_perfect_square(k)) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(SparselandError::NotPerfectSquare { dim: n, atoms: k }),
        };

        let mut stretched = self.matrix.clone();
        for mut col in stretched.columns_mut() {
            let min = col.iter().cloned().fold(f64::INFINITY, f64::min);
            col.mapv_inplace(|x| x - min);
            let max = col.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            if max != 0.0 {
                col.mapv_inplace(|x| x / max);
            }
        }

        let background = stretched.iter().cloned().fold(f64::INFINITY, f64::min);
        let dim = n_r * k_r + k_r + 1;
        let mut img = Array2::from_elem((dim, dim), background);

        // Atom index runs down each grid column, as in the usual atlas layout.
        for i in 0..k_r {
            for j in 0..k_r {
                let atom = stretched.column(i * k_r + j);
                let patch =
                    Array2::from_shape_fn((n_r, n_r), |(r, c)| atom[r * n_r + c]);
                let top = j * n_r + 1 + j;
                let left = i * n_r + 1 + i;
                img.slice_mut(s![top..top + n_r, left..left + n_r])
                    .assign(&patch);
            }
        }
        Ok(img)
    }
}
