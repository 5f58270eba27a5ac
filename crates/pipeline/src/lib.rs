//! Voyage - linear file-based training pipeline
//!
//! Five strictly ordered stages, each an independent process that reads
//! the previous stage's files and writes its own:
//!
//! `ingest -> preprocess -> features -> train -> evaluate`
//!
//! Stage cores are pure frame-to-frame (or frame-to-model) functions;
//! the `run` function of each module adds the filesystem endpoints.

pub mod evaluate;
pub mod features;
pub mod ingest;
pub mod model;
pub mod preprocess;
pub mod train;

pub use evaluate::{evaluate, ClassMetrics, MetricsReport};
pub use ingest::{fetch, split};
pub use model::LogisticModel;
pub use preprocess::preprocess;
pub use train::{fit, TrainingOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
