//! Feature pipeline: preprocessing and matrix assembly

pub mod features;
pub mod preprocess;

pub use features::{feature_matrix, labels, FEATURE_COLUMNS};
pub use preprocess::{preprocess, FittedParams, Preprocessor, TransformedBatch, TransformedRow};
