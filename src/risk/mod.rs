//! Risk scoring, ranking and summary.

pub mod classifier;
pub mod summary;

pub use classifier::{classify, rank, score, Classification, RiskRecord};
pub use summary::{heat_matrix, summarize, ClassificationSummaryEntry};
