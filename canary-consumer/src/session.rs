/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use std::io;
use std::time::Duration;

use canary_diagnostics::MetricsSink;
use canary_validator::{CanaryFrameProcessor, FrameError};
use thiserror::Error;
use tracing::{debug, info};

use crate::source::FrameSource;

/// Reasons a consumption session ends early.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The canary harness produced a frame it cannot validate.
    #[error("malformed canary frame after {frames_processed} frames: {source}")]
    MalformedFrame {
        frames_processed: u64,
        #[source]
        source: FrameError,
    },

    #[error("frame source failed: {0}")]
    Source(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames_processed: u64,
    /// The run duration elapsed before the source ended.
    pub timed_out: bool,
}

/// Feed every frame from `source` through `processor` until the source ends
/// or `run_duration` elapses, whichever comes first.
pub async fn run_session<F, S>(
    source: &mut F,
    processor: &mut CanaryFrameProcessor<S>,
    run_duration: Duration,
) -> Result<SessionSummary, SessionError>
where
    F: FrameSource,
    S: MetricsSink,
{
    let consume = async {
        while let Some(frame) = source.next_frame().await? {
            processor
                .process(&frame)
                .map_err(|err| SessionError::MalformedFrame {
                    frames_processed: processor.frames_processed(),
                    source: err,
                })?;
        }
        debug!("frame source reached end of stream");
        Ok::<(), SessionError>(())
    };

    let timed_out = match tokio::time::timeout(run_duration, consume).await {
        Ok(result) => {
            result?;
            false
        }
        Err(_) => {
            info!("run duration of {:?} elapsed, stopping", run_duration);
            true
        }
    };

    Ok(SessionSummary {
        frames_processed: processor.frames_processed(),
        timed_out,
    })
}
