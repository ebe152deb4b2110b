//! Image denoising on top of the approximate K-SVD: learn a dictionary on
//! all overlapping patches of the noisy image, then stitch the sparse
//! reconstructions back together with a blend toward the input.

use log::debug;
use ndarray::{Array2, ArrayView2};

use crate::dictionary::Dictionary;
use crate::error::{Result, SparselandError};
use crate::learning::{ApproximateKSvdBuilder, DictionaryLearning};
use crate::pursuit::PursuitKind;

mod patches;

pub use patches::{extract_patches, overlap_add};

pub struct ImageDenoiserBuilder {
    dictionary: Dictionary,
    pursuit: PursuitKind,
    sigma: f64,
    noise_gain: f64,
    multiplier: f64,
    iterations: usize,
    patch_size: usize,
}

impl ImageDenoiserBuilder {
    pub fn new(dictionary: Dictionary) -> Self {
        ImageDenoiserBuilder {
            dictionary,
            pursuit: PursuitKind::Matching,
            sigma: 3.0,
            noise_gain: 1.15,
            multiplier: 10.0,
            iterations: 15,
            patch_size: 8,
        }
    }

    pub fn pursuit(mut self, kind: PursuitKind) -> Self {
        self.pursuit = kind;
        self
    }

    /// Noise standard deviation of the input image.
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn noise_gain(mut self, noise_gain: f64) -> Self {
        self.noise_gain = noise_gain;
        self
    }

    /// Weight of the noisy input in the final blend.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn patch_size(mut self, patch_size: usize) -> Self {
        self.patch_size = patch_size;
        self
    }

    pub fn build(self) -> ImageDenoiser {
        ImageDenoiser {
            dictionary: self.dictionary,
            pursuit: self.pursuit,
            sigma: self.sigma,
            noise_gain: self.noise_gain,
            multiplier: self.multiplier,
            iterations: self.iterations,
            patch_size: self.patch_size,
        }
    }
}

pub struct ImageDenoiser {
    dictionary: Dictionary,
    pursuit: PursuitKind,
    sigma: f64,
    noise_gain: f64,
    multiplier: f64,
    iterations: usize,
    patch_size: usize,
}

pub struct DenoiseResult {
    pub image: Array2<f64>,
    pub dictionary: Dictionary,
    pub coefficients: Array2<f64>,
}

impl ImageDenoiser {
    /// Denoises a square image. The pursuit runs in tolerance mode with
    /// `noise_gain * sigma`; sigma 0 degrades gracefully to a near-exact
    /// reconstruction pass.
    pub fn denoise(&self, image: ArrayView2<f64>) -> Result<DenoiseResult> {
        let (rows, cols) = image.dim();
        if rows != cols {
            return Err(SparselandError::NonSquareImage { rows, cols });
        }

        let y = extract_patches(image, self.patch_size)?;
        debug!(
            "denoising {}x{} image: {} patches of size {}",
            rows,
            cols,
            y.ncols(),
            self.patch_size
        );

        let mut learner = ApproximateKSvdBuilder::new(self.dictionary.clone())
            .pursuit(self.pursuit)
            .noise_gain(self.noise_gain)
            .sigma(self.sigma)
            .build();
        let (dictionary, coefficients) = learner.fit(y.view(), self.iterations)?;

        debug!("stitching {} reconstructed patches", coefficients.ncols());
        let (accum, weight) = overlap_add(
            dictionary.matrix(),
            &coefficients,
            self.patch_size,
            rows,
            cols,
        )?;
        let blended = (&accum + &image.mapv(|x| x * self.multiplier))
            / (&weight + self.multiplier);

        Ok(DenoiseResult {
            image: blended,
            dictionary,
            coefficients,
        })
    }
}
