pub mod denoise;
pub mod dictionary;
pub mod error;
pub mod learning;
pub mod pursuit;
pub mod svd;
mod utils;

pub use dictionary::Dictionary;
pub use error::{Result, SparselandError};
pub use learning::{ApproximateKSvd, ApproximateKSvdBuilder, DictionaryLearning, KSvd, KSvdBuilder};
pub use pursuit::{Pursuit, PursuitKind, StopCriterion};
