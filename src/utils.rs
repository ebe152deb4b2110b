use ndarray::{s, Array2, ArrayView1};

/// Coefficients with magnitude at or below this are treated as zero,
/// matching the numpy `isclose` default absolute tolerance.
pub(crate) const ZERO_TOL: f64 = 1e-8;

/// Index of the entry with the largest absolute value, ties broken by
/// the lowest index. Returns the signed value alongside the index.
pub(crate) fn argmax_abs(v: ArrayView1<f64>) -> (usize, f64) {
    let mut best = 0;
    let mut best_abs = f64::NEG_INFINITY;
    for (i, &x) in v.iter().enumerate() {
        if x.abs() > best_abs {
            best = i;
            best_abs = x.abs();
        }
    }
    (best, v[best])
}

pub(crate) fn count_nonzero(v: ArrayView1<f64>) -> usize {
    v.iter().filter(|&&x| x != 0.0).count()
}

pub(crate) fn l2_norm(v: ArrayView1<f64>) -> f64 {
    v.dot(&v).sqrt()
}

pub(crate) fn is_perfect_square(x: usize) -> Option<usize> {
    let r = (x as f64).sqrt().round() as usize;
    (r * r == x).then_some(r)
}

/// Kronecker product of two dense matrices.
pub(crate) fn kron(a: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    let mut out = Array2::zeros((ar * br, ac * bc));
    for i in 0..ar {
        for j in 0..ac {
            let scale = a[(i, j)];
            if scale != 0.0 {
                out.slice_mut(s![i * br..(i + 1) * br, j * bc..(j + 1) * bc])
                    .assign(&(b * scale));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_argmax_abs_ties_take_lowest_index() {
        let v = array![1.0, -3.0, 3.0, 0.5];
        let (idx, val) = argmax_abs(v.view());
        assert_eq!(idx, 1);
        assert_abs_diff_eq!(val, -3.0);
    }

    #[test]
    fn test_count_nonzero() {
        let v = array![0.0, 1.0, 0.0, -2.0];
        assert_eq!(count_nonzero(v.view()), 2);
    }

    #[test]
    fn test_perfect_square() {
        assert_eq!(is_perfect_square(16), Some(4));
        assert_eq!(is_perfect_square(15), None);
        assert_eq!(is_perfect_square(1), Some(1));
    }

    #[test]
    fn test_kron_shapes_and_values() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[0.0, 1.0], [1.0, 0.0]];
        let k = kron(&a, &b);
        assert_eq!(k.dim(), (4, 4));
        assert_abs_diff_eq!(k[(0, 1)], 1.0);
        assert_abs_diff_eq!(k[(1, 0)], 1.0);
        assert_abs_diff_eq!(k[(2, 3)], 3.0);
        assert_abs_diff_eq!(k[(3, 2)], 3.0);
        assert_abs_diff_eq!(k[(0, 3)], 2.0);
    }
}
