//! K-SVD dictionary learning: alternate a sparse-coding stage (pursuit
//! against the current dictionary) with a per-atom dictionary-update stage
//! for a fixed number of outer iterations. Two update rules are offered:
//! the exact rank-one SVD update and the cheaper approximate projection
//! update. Both engines are interchangeable through [`DictionaryLearning`].

use std::sync::Arc;

use log::{debug, trace};
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::dictionary::Dictionary;
use crate::error::{Result, SparselandError};
use crate::pursuit::{
    check_dims, MatchingPursuit, OrthogonalMatchingPursuit, Pursuit, PursuitKind, StopCriterion,
    ThresholdingPursuit,
};
use crate::svd::{NalgebraSvd, SvdProvider};
use crate::utils::l2_norm;

/// Below this norm the approximate update's correction direction is
/// considered degenerate and the fit aborts.
const DEGENERATE_TOL: f64 = 1e-12;

/// Common contract of the exact and approximate engines.
pub trait DictionaryLearning {
    /// Runs `iterations` outer iterations against the sample matrix and
    /// returns the refined dictionary together with the last coefficient
    /// matrix. With `iterations == 0` the dictionary is returned unchanged
    /// and the coefficient matrix has zero columns.
    fn fit(&mut self, y: ArrayView2<f64>, iterations: usize) -> Result<(Dictionary, Array2<f64>)>;
}

/// Pursuit configuration shared by both engines. Tolerance mode is in
/// force when both noise gain and sigma are set, otherwise the sparsity
/// target applies.
#[derive(Debug, Clone)]
struct CodingConfig {
    pursuit: PursuitKind,
    sparsity: usize,
    noise_gain: Option<f64>,
    sigma: Option<f64>,
}

impl CodingConfig {
    fn criterion(&self) -> StopCriterion {
        match (self.noise_gain, self.sigma) {
            (Some(gain), Some(sigma)) => StopCriterion::Tolerance(gain * sigma),
            _ => StopCriterion::Sparsity(self.sparsity),
        }
    }

    fn sparse_code(&self, dictionary: &Dictionary, y: ArrayView2<f64>) -> Result<Array2<f64>> {
        let criterion = self.criterion();
        let pursuit: Box<dyn Pursuit> = match self.pursuit {
            PursuitKind::Matching => {
                Box::new(MatchingPursuit::new(dictionary.clone(), criterion))
            }
            PursuitKind::Orthogonal => {
                Box::new(OrthogonalMatchingPursuit::new(dictionary.clone(), criterion))
            }
            PursuitKind::Thresholding => {
                Box::new(ThresholdingPursuit::new(dictionary.clone(), criterion)?)
            }
        };
        pursuit.fit(y)
    }
}

pub struct KSvdBuilder<S: SvdProvider> {
    dictionary: Dictionary,
    pursuit: PursuitKind,
    sparsity: usize,
    noise_gain: Option<f64>,
    sigma: Option<f64>,
    svd: Arc<S>,
}

impl KSvdBuilder<NalgebraSvd> {
    pub fn new(dictionary: Dictionary) -> Self {
        KSvdBuilder {
            dictionary,
            pursuit: PursuitKind::Matching,
            sparsity: 1,
            noise_gain: None,
            sigma: None,
            svd: Arc::new(NalgebraSvd),
        }
    }
}

impl<S: SvdProvider> KSvdBuilder<S> {
    pub fn pursuit(mut self, kind: PursuitKind) -> Self {
        self.pursuit = kind;
        self
    }

    pub fn sparsity(mut self, sparsity: usize) -> Self {
        self.sparsity = sparsity;
        self
    }

    pub fn noise_gain(mut self, noise_gain: f64) -> Self {
        self.noise_gain = Some(noise_gain);
        self
    }

    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn svd_provider<T: SvdProvider>(self, provider: T) -> KSvdBuilder<T> {
        KSvdBuilder {
            dictionary: self.dictionary,
            pursuit: self.pursuit,
            sparsity: self.sparsity,
            noise_gain: self.noise_gain,
            sigma: self.sigma,
            svd: Arc::new(provider),
        }
    }

    pub fn build(self) -> KSvd<S> {
        KSvd {
            dictionary: self.dictionary,
            coding: CodingConfig {
                pursuit: self.pursuit,
                sparsity: self.sparsity,
                noise_gain: self.noise_gain,
                sigma: self.sigma,
            },
            svd: self.svd,
        }
    }
}

/// Exact K-SVD: each atom update replaces the atom with the dominant left
/// singular vector of the restricted error matrix, which minimizes the
/// reconstruction error for that atom with everything else held fixed.
pub struct KSvd<S: SvdProvider = NalgebraSvd> {
    dictionary: Dictionary,
    coding: CodingConfig,
    svd: Arc<S>,
}

impl<S: SvdProvider> KSvd<S> {
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}

impl<S: SvdProvider> DictionaryLearning for KSvd<S> {
    fn fit(&mut self, y: ArrayView2<f64>, iterations: usize) -> Result<(Dictionary, Array2<f64>)> {
        check_dims(&self.dictionary, y)?;
        let mut alphas = Array2::zeros((self.dictionary.num_atoms(), 0));
        for iteration in 0..iterations {
            debug!("k-svd iteration {}/{}: sparse coding", iteration + 1, iterations);
            alphas = self.coding.sparse_code(&self.dictionary, y)?;
            debug!("k-svd iteration {}/{}: dictionary update", iteration + 1, iterations);
            let mut matrix = self.dictionary.matrix().clone();
            exact_update(self.svd.as_ref(), &mut matrix, &mut alphas, y)?;
            self.dictionary = Dictionary::new(matrix);
        }
        Ok((self.dictionary.clone(), alphas))
    }
}

pub struct ApproximateKSvdBuilder {
    dictionary: Dictionary,
    pursuit: PursuitKind,
    sparsity: usize,
    noise_gain: Option<f64>,
    sigma: Option<f64>,
}

impl ApproximateKSvdBuilder {
    pub fn new(dictionary: Dictionary) -> Self {
        ApproximateKSvdBuilder {
            dictionary,
            pursuit: PursuitKind::Matching,
            sparsity: 1,
            noise_gain: None,
            sigma: None,
        }
    }

    pub fn pursuit(mut self, kind: PursuitKind) -> Self {
        self.pursuit = kind;
        self
    }

    pub fn sparsity(mut self, sparsity: usize) -> Self {
        self.sparsity = sparsity;
        self
    }

    pub fn noise_gain(mut self, noise_gain: f64) -> Self {
        self.noise_gain = Some(noise_gain);
        self
    }

    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn build(self) -> ApproximateKSvd {
        ApproximateKSvd {
            dictionary: self.dictionary,
            coding: CodingConfig {
                pursuit: self.pursuit,
                sparsity: self.sparsity,
                noise_gain: self.noise_gain,
                sigma: self.sigma,
            },
        }
    }
}

/// Approximate K-SVD: a single projection pass per atom instead of a full
/// SVD. Quality is close to the exact rule at a fraction of the cost.
pub struct ApproximateKSvd {
    dictionary: Dictionary,
    coding: CodingConfig,
}

impl ApproximateKSvd {
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}

impl DictionaryLearning for ApproximateKSvd {
    fn fit(&mut self, y: ArrayView2<f64>, iterations: usize) -> Result<(Dictionary, Array2<f64>)> {
        check_dims(&self.dictionary, y)?;
        let mut alphas = Array2::zeros((self.dictionary.num_atoms(), 0));
        for iteration in 0..iterations {
            debug!(
                "approximate k-svd iteration {}/{}: sparse coding",
                iteration + 1,
                iterations
            );
            alphas = self.coding.sparse_code(&self.dictionary, y)?;
            debug!(
                "approximate k-svd iteration {}/{}: dictionary update",
                iteration + 1,
                iterations
            );
            let mut matrix = self.dictionary.matrix().clone();
            approximate_update(&mut matrix, &mut alphas, y)?;
            self.dictionary = Dictionary::new(matrix);
        }
        Ok((self.dictionary.clone(), alphas))
    }
}

/// Columns of `y` whose coefficient at atom row `k` is non-zero.
fn active_set(alphas: &Array2<f64>, k: usize) -> Vec<usize> {
    alphas
        .row(k)
        .iter()
        .enumerate()
        .filter(|(_, &a)| a != 0.0)
        .map(|(i, _)| i)
        .collect()
}

fn exact_update<S: SvdProvider>(
    svd: &S,
    d: &mut Array2<f64>,
    alphas: &mut Array2<f64>,
    y: ArrayView2<f64>,
) -> Result<()> {
    for k in 0..d.ncols() {
        let active = active_set(alphas, k);
        if active.is_empty() {
            trace!("atom {k} has no users, leaving it unchanged");
            continue;
        }

        let y_w = y.select(Axis(1), &active);
        let a_w = alphas.select(Axis(1), &active);
        // Error of the active columns with every atom's contribution
        // removed except atom k's, i.e. Y_w - D A_w + d_k a_k.
        let mut error = &y_w - &d.dot(&a_w);
        let atom = d.column(k).to_owned();
        for (slot, &col) in active.iter().enumerate() {
            error.column_mut(slot).scaled_add(alphas[(k, col)], &atom);
        }

        let factors = svd.compute(error.view())?;
        let dom = factors.dominant();
        d.column_mut(k).assign(&factors.u.column(dom));
        for (slot, &col) in active.iter().enumerate() {
            alphas[(k, col)] = factors.s[dom] * factors.vt[(dom, slot)];
        }
    }
    Ok(())
}

fn approximate_update(
    d: &mut Array2<f64>,
    alphas: &mut Array2<f64>,
    y: ArrayView2<f64>,
) -> Result<()> {
    for k in 0..d.ncols() {
        let active = active_set(alphas, k);
        if active.is_empty() {
            trace!("atom {k} has no users, leaving it unchanged");
            continue;
        }

        d.column_mut(k).fill(0.0);
        let g = Array1::from_iter(active.iter().map(|&col| alphas[(k, col)]));
        let y_w = y.select(Axis(1), &active);
        let a_w = alphas.select(Axis(1), &active);
        // Atom k is zeroed, so this reconstruction excludes it.
        let recon = d.dot(&a_w);

        let mut direction = y_w.dot(&g) - recon.dot(&g);
        let norm = l2_norm(direction.view());
        if norm <= DEGENERATE_TOL {
            return Err(SparselandError::DegenerateAtom { atom: k });
        }
        direction.mapv_inplace(|x| x / norm);

        let coeffs = y_w.t().dot(&direction) - recon.t().dot(&direction);
        d.column_mut(k).assign(&direction);
        for (slot, &col) in active.iter().enumerate() {
            alphas[(k, col)] = coeffs[slot];
        }
    }
    Ok(())
}
