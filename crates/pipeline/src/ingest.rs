//! Data ingestion stage
//!
//! Fetches the source dataset (URL or local path), splits it into a
//! seeded train/test partition, and writes both halves under the raw
//! data directory.

use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, error, info};

use voyage_core::{DataLayout, Frame, Params, PipelineError, Result};

/// Published passenger survival table the original pipeline trains on.
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/JishnudipSaha/Datasets/refs/heads/main/Titanic-Dataset.csv";

/// Held-out fraction used when `data_ingestion.test_size` is absent.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Seed for the reproducible partition.
pub const DEFAULT_SEED: u64 = 42;

/// Load the dataset from a URL or a filesystem path.
pub fn fetch(source: &str) -> Result<Frame> {
    let frame = if source.starts_with("http://") || source.starts_with("https://") {
        let body = ureq::get(source)
            .call()
            .map_err(|err| {
                error!("Failed to fetch {source}: {err}");
                PipelineError::SourceUnreachable(format!("{source}: {err}"))
            })?
            .into_string()
            .map_err(|err| {
                error!("Failed to read response body from {source}: {err}");
                PipelineError::SourceUnreachable(format!("{source}: {err}"))
            })?;
        Frame::read_csv(body.as_bytes())
    } else {
        let path = Path::new(source);
        if !path.exists() {
            error!("Source path does not exist: {source}");
            return Err(PipelineError::SourceUnreachable(source.to_string()));
        }
        Frame::from_csv_path(path)
    };

    match frame {
        Ok(frame) => {
            debug!("Loaded {} rows from {source}", frame.n_rows());
            Ok(frame)
        }
        Err(err) => {
            error!("Failed to parse dataset from {source}: {err}");
            Err(err)
        }
    }
}

/// Seeded randomized partition. The test half gets `round(n * test_size)`
/// rows; the same seed, fraction, and input always produce the same
/// partition.
pub fn split(frame: &Frame, test_size: f64, seed: u64) -> Result<(Frame, Frame)> {
    let n = frame.n_rows();
    if n == 0 {
        return Err(PipelineError::DatasetParse("dataset has no rows".to_string()));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = (((n as f64) * test_size).round() as usize).min(n);
    let test = frame.take_rows(&indices[..test_len]);
    let train = frame.take_rows(&indices[test_len..]);
    Ok((train, test))
}

/// Run the stage: fetch, split, write `raw/{train,test}.csv`.
pub fn run(source: &str, layout: &DataLayout, params_path: &Path, seed: u64) -> Result<()> {
    let params = Params::load(params_path)?;
    let namespace = params.namespace("data_ingestion");
    let test_size = namespace.f64_or("test_size", DEFAULT_TEST_SIZE)?;
    if !(test_size > 0.0 && test_size < 1.0) {
        let err = PipelineError::InvalidParam {
            namespace: "data_ingestion".to_string(),
            key: "test_size".to_string(),
            expected: "a float in (0, 1)",
        };
        error!("{err}");
        return Err(err);
    }

    info!("Ingesting from {source} (test_size={test_size}, seed={seed})");
    let frame = fetch(source)?;
    let (train, test) = split(&frame, test_size, seed)?;

    train.write_csv_path(layout.raw_train())?;
    test.write_csv_path(layout.raw_test())?;
    debug!(
        "Wrote {} train rows to {} and {} test rows to {}",
        train.n_rows(),
        layout.raw_train().display(),
        test.n_rows(),
        layout.raw_test().display()
    );
    Ok(())
}
