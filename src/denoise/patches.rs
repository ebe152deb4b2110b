//! Sliding-window patch extraction and overlap-add stitching.

use ndarray::{Array2, ArrayView2};

use crate::error::{Result, SparselandError};

/// Stacks every overlapping `patch x patch` window of the image as a
/// row-major flattened column. Columns are ordered row-major over the
/// window's top-left corner.
pub fn extract_patches(image: ArrayView2<f64>, patch: usize) -> Result<Array2<f64>> {
    let (rows, cols) = image.dim();
    if patch == 0 || patch > rows || patch > cols {
        return Err(SparselandError::InvalidPatchSize {
            patch,
            size: rows.min(cols),
        });
    }

    let n_rows = rows - patch + 1;
    let n_cols = cols - patch + 1;
    let mut y = Array2::zeros((patch * patch, n_rows * n_cols));
    for r in 0..n_rows {
        for c in 0..n_cols {
            let mut column = y.column_mut(r * n_cols + c);
            for pr in 0..patch {
                for pc in 0..patch {
                    column[pr * patch + pc] = image[(r + pr, c + pc)];
                }
            }
        }
    }
    Ok(y)
}

/// Sums reconstructed patches (`dictionary * alphas[:, k]`) back into image
/// space, returning the accumulated values and the per-pixel overlap counts.
/// The coefficient matrix must hold one column per overlapping window and
/// the dictionary one row per patch pixel.
pub fn overlap_add(
    dictionary: &Array2<f64>,
    alphas: &Array2<f64>,
    patch: usize,
    rows: usize,
    cols: usize,
) -> Result<(Array2<f64>, Array2<f64>)> {
    if patch == 0 || patch > rows || patch > cols {
        return Err(SparselandError::InvalidPatchSize {
            patch,
            size: rows.min(cols),
        });
    }
    if dictionary.nrows() != patch * patch {
        return Err(SparselandError::DimensionMismatch {
            expected: patch * patch,
            got: dictionary.nrows(),
        });
    }
    let n_rows = rows - patch + 1;
    let n_cols = cols - patch + 1;
    if alphas.ncols() != n_rows * n_cols {
        return Err(SparselandError::DimensionMismatch {
            expected: n_rows * n_cols,
            got: alphas.ncols(),
        });
    }

    let mut accum = Array2::zeros((rows, cols));
    let mut weight = Array2::zeros((rows, cols));

    for k in 0..alphas.ncols() {
        let reconstructed = dictionary.dot(&alphas.column(k));
        let r = k / n_cols;
        let c = k % n_cols;
        for pr in 0..patch {
            for pc in 0..patch {
                accum[(r + pr, c + pc)] += reconstructed[pr * patch + pc];
                weight[(r + pr, c + pc)] += 1.0;
            }
        }
    }
    Ok((accum, weight))
}
