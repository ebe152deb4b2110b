use thiserror::Error;

/// Errors reported by the sparse-coding and dictionary-learning routines.
#[derive(Error, Debug)]
pub enum SparselandError {
    /// Sample matrix row count does not match the dictionary's signal dimension.
    #[error("dimension mismatch: expected {expected} rows, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A pursuit was configured with a stopping criterion it does not support.
    #[error("invalid stopping criterion: {0}")]
    InvalidCriterion(String),

    /// An overcomplete construction was requested with fewer atoms than dimensions.
    #[error("dictionary needs at least as many atoms as dimensions, got {atoms} atoms for dimension {dim}")]
    OvercompleteShape { dim: usize, atoms: usize },

    /// Atom tiling requires both the signal dimension and the atom count to be perfect squares.
    #[error("cannot tile atoms into patches: {dim} and {atoms} must both be perfect squares")]
    NotPerfectSquare { dim: usize, atoms: usize },

    /// A transform-based constructor was given an unsupported base size.
    #[error("invalid transform size: {0}")]
    InvalidTransform(String),

    /// The denoiser only accepts square images.
    #[error("image must be square, got {rows}x{cols}")]
    NonSquareImage { rows: usize, cols: usize },

    /// Patch size must be positive and no larger than the image side.
    #[error("patch size {patch} is invalid for an image of side {size}")]
    InvalidPatchSize { patch: usize, size: usize },

    /// The approximate atom update produced a zero-norm direction.
    #[error("degenerate update for atom {atom}: correction direction has zero norm")]
    DegenerateAtom { atom: usize },

    /// Failure inside the numerical backend (SVD, least squares).
    #[error("numerical backend failure: {0}")]
    Numeric(String),
}

pub type Result<T> = std::result::Result<T, SparselandError>;
