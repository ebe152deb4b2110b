//! Deterministic dictionary constructors. Each builds a separable 1-D base
//! of shape (base_dim, base_atoms) and takes its Kronecker product with
//! itself, so the resulting dictionary codes square patches of side
//! `base_dim` with `base_atoms * base_atoms` atoms.

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, SparselandError};
use crate::utils::{kron, l2_norm};

use super::Dictionary;

impl Dictionary {
    /// Separable DCT-II dictionary of shape (base_dim^2, base_atoms^2).
    /// Unitary and normalized when `base_atoms == base_dim`.
    pub fn dct(base_dim: usize, base_atoms: usize) -> Result<Self> {
        check_overcomplete(base_dim, base_atoms)?;
        let base = dct_base(base_dim, base_atoms);
        Ok(Dictionary::new(kron(&base, &base)))
    }

    /// Separable Haar dictionary of shape (base_dim^2, base_atoms^2).
    /// `base_dim` must be a power of two and at least 2. Oversampled
    /// (overcomplete) atoms beyond the base dimension are zero.
    pub fn haar(base_dim: usize, base_atoms: usize) -> Result<Self> {
        check_overcomplete(base_dim, base_atoms)?;
        if base_dim < 2 || !base_dim.is_power_of_two() {
            return Err(SparselandError::InvalidTransform(format!(
                "Haar base dimension must be a power of two >= 2, got {base_dim}"
            )));
        }
        let mut analysis = Array2::zeros((base_atoms, base_dim));
        for i in 0..base_dim {
            let mut e = Array1::zeros(base_dim);
            e[i] = 1.0;
            analysis
                .column_mut(i)
                .assign(&haar_vector(e, base_atoms));
        }
        let base = analysis.t().to_owned();
        Ok(Dictionary::new(kron(&base, &base)))
    }

    /// Random dictionary of shape (base_dim^2, base_atoms^2) with normalized
    /// atoms. A fixed seed makes the construction reproducible.
    pub fn random(base_dim: usize, base_atoms: usize, seed: Option<u64>) -> Result<Self> {
        check_overcomplete(base_dim, base_atoms)?;
        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        let mut base =
            Array2::from_shape_fn((base_dim, base_atoms), |_| rng.random::<f64>() * 255.0);
        for mut col in base.columns_mut() {
            let norm = l2_norm(col.view());
            if norm != 0.0 {
                col.mapv_inplace(|x| x / norm);
            }
        }
        Ok(Dictionary::new(kron(&base, &base)))
    }
}

fn check_overcomplete(base_dim: usize, base_atoms: usize) -> Result<()> {
    if base_atoms < base_dim {
        return Err(SparselandError::OvercompleteShape {
            dim: base_dim,
            atoms: base_atoms,
        });
    }
    Ok(())
}

/// Column k of the synthesis base: the orthonormalized DCT-II response of
/// the i-th unit impulse, oversampled to `atoms` frequencies.
fn dct_base(dim: usize, atoms: usize) -> Array2<f64> {
    let scale = (2.0 / dim as f64).sqrt();
    Array2::from_shape_fn((dim, atoms), |(i, k)| {
        let angle = (0.5 + i as f64) * k as f64 * std::f64::consts::PI / atoms as f64;
        let norm = if k == 0 {
            scale * std::f64::consts::FRAC_1_SQRT_2
        } else {
            scale
        };
        norm * angle.cos()
    })
}

/// In-place normalized Haar transform of `v`, oversampled to length `atoms`.
/// Butterfly passes only reach the first `v.len()` entries, so oversampled
/// tail entries stay zero.
fn haar_vector(mut v: Array1<f64>, atoms: usize) -> Array1<f64> {
    let n = v.len();
    let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
    let mut tmp = Array1::zeros(atoms);
    let mut count = 2;
    while count <= n {
        for i in 0..count / 2 {
            tmp[2 * i] = (v[i] + v[i + count / 2]) * inv_sqrt2;
            tmp[2 * i + 1] = (v[i] - v[i + count / 2]) * inv_sqrt2;
        }
        for i in 0..count {
            v[i] = tmp[i];
        }
        count *= 2;
    }
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_square_dct_is_unitary() {
        let d = Dictionary::dct(4, 4).unwrap();
        assert_eq!(d.shape(), (16, 16));
        assert!(d.is_unitary());
        assert!(d.is_normalized());
    }

    #[test]
    fn test_overcomplete_dct_shape() {
        let d = Dictionary::dct(2, 3).unwrap();
        assert_eq!(d.shape(), (4, 9));
        assert!(!d.is_unitary());
    }

    #[test]
    fn test_dct_rejects_undercomplete() {
        assert!(matches!(
            Dictionary::dct(4, 3),
            Err(SparselandError::OvercompleteShape { .. })
        ));
    }

    #[test]
    fn test_square_haar_is_unitary() {
        let d = Dictionary::haar(4, 4).unwrap();
        assert_eq!(d.shape(), (16, 16));
        assert!(d.is_unitary());
    }

    #[test]
    fn test_overcomplete_haar_pads_oversampled_atoms_with_zeros() {
        let d = Dictionary::haar(2, 4).unwrap();
        assert_eq!(d.shape(), (4, 16));
        // The butterfly only reaches the first base_dim entries of the
        // oversampled base, so atoms outside the 2x2 live block are zero.
        let mut zero_atoms = 0;
        for col in d.matrix().columns() {
            if col.iter().all(|&x| x == 0.0) {
                zero_atoms += 1;
            } else {
                assert_abs_diff_eq!(col.dot(&col).sqrt(), 1.0, epsilon = 1e-12);
            }
        }
        assert_eq!(zero_atoms, 12);
    }

    #[test]
    fn test_haar_rejects_non_power_of_two() {
        assert!(matches!(
            Dictionary::haar(3, 3),
            Err(SparselandError::InvalidTransform(_))
        ));
    }

    #[test]
    fn test_random_is_normalized_and_seeded() {
        let a = Dictionary::random(3, 4, Some(7)).unwrap();
        let b = Dictionary::random(3, 4, Some(7)).unwrap();
        let c = Dictionary::random(3, 4, Some(8)).unwrap();
        assert_eq!(a.shape(), (9, 16));
        assert!(a.is_normalized());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_dct_base_first_column_is_constant() {
        let base = dct_base(4, 4);
        let expected = 0.5; // sqrt(2/4) / sqrt(2)
        for i in 0..4 {
            assert_abs_diff_eq!(base[(i, 0)], expected, epsilon = 1e-12);
        }
    }
}
