//! Feature engineering stage
//!
//! Currently an identity pass from the interim split to the engineered
//! split. Derived-column logic belongs in [`engineer`]; callers only see
//! a frame-to-frame transform, so adding features never touches them.

use tracing::{debug, error};

use voyage_core::{DataLayout, Frame, Result};

/// Transform one split. Identity for now.
pub fn engineer(frame: Frame) -> Result<Frame> {
    Ok(frame)
}

/// Run the stage: read both interim splits, transform, write
/// `engineered/{train,test}_engineered.csv`.
pub fn run(layout: &DataLayout) -> Result<()> {
    let outcome = (|| {
        let train = engineer(Frame::from_csv_path(layout.interim_train())?)?;
        let test = engineer(Frame::from_csv_path(layout.interim_test())?)?;

        train.write_csv_path(layout.engineered_train())?;
        test.write_csv_path(layout.engineered_test())?;
        debug!(
            "Wrote engineered splits to {} and {}",
            layout.engineered_train().display(),
            layout.engineered_test().display()
        );
        Ok(())
    })();
    if let Err(err) = &outcome {
        error!("Feature engineering stage failed: {err}");
    }
    outcome
}
