//! Voyage Core - shared substrate for the tabular training pipeline
//!
//! Provides the column-oriented frame the stages exchange on disk, the
//! feature schema shared by training and evaluation, the YAML parameter
//! loader, the filesystem layout contract, the error taxonomy, and the
//! console + file logging setup.

pub mod errors;
pub mod frame;
pub mod layout;
pub mod logging;
pub mod params;
pub mod schema;

pub use errors::{PipelineError, Result};
pub use frame::{Column, Frame, Value};
pub use layout::DataLayout;
pub use params::{Namespace, Params};
pub use schema::FeatureSchema;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
