//! Filesystem layout contract
//!
//! Stages compose through files, never by calling each other. The layout
//! is the typed form of that convention: stage N writes to a path the
//! next stage reads, and tests can point the whole chain at a temporary
//! directory.

use std::path::{Path, PathBuf};

/// Conventional paths under one data root
#[derive(Clone, Debug)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw split written by ingestion.
    pub fn raw_train(&self) -> PathBuf {
        self.root.join("raw").join("train.csv")
    }

    pub fn raw_test(&self) -> PathBuf {
        self.root.join("raw").join("test.csv")
    }

    /// Cleaned and encoded split written by preprocessing.
    pub fn interim_train(&self) -> PathBuf {
        self.root.join("interim").join("train_processed.csv")
    }

    pub fn interim_test(&self) -> PathBuf {
        self.root.join("interim").join("test_processed.csv")
    }

    /// Feature-engineered split consumed by training and evaluation.
    pub fn engineered_train(&self) -> PathBuf {
        self.root.join("engineered").join("train_engineered.csv")
    }

    pub fn engineered_test(&self) -> PathBuf {
        self.root.join("engineered").join("test_engineered.csv")
    }
}
