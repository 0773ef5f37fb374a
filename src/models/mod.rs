//! Inference artifacts: the ordinal encoder, the label decoder and the classifier.
//!
//! These are immutable once constructed. Loading them from disk lives in
//! `io::artifacts`; everything here is pure.

pub mod classifier;
pub mod encoder;
pub mod labels;

pub use classifier::*;
pub use encoder::*;
pub use labels::*;
