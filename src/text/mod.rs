//! Spanish text normalization for speech synthesis.

pub mod normalize;
pub mod numbers;

pub use normalize::normalize;
