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

use canary_diagnostics::{now_ms, MetricBatch, MetricsSink, DEFAULT_NAMESPACE};
use log::trace;

use crate::error::Result;
use crate::frame::Frame;
use crate::validator::FrameValidator;

/// Couples a session's [`FrameValidator`] with the sink its observations go to.
pub struct CanaryFrameProcessor<S: MetricsSink> {
    validator: FrameValidator,
    sink: S,
    namespace: String,
    frames_processed: u64,
}

impl<S: MetricsSink> CanaryFrameProcessor<S> {
    pub fn new(stream_name: &str, canary_label: &str, sink: S) -> Self {
        Self::with_namespace(stream_name, canary_label, DEFAULT_NAMESPACE, sink)
    }

    pub fn with_namespace(
        stream_name: &str,
        canary_label: &str,
        namespace: impl Into<String>,
        sink: S,
    ) -> Self {
        Self {
            validator: FrameValidator::new(stream_name, canary_label),
            sink,
            namespace: namespace.into(),
            frames_processed: 0,
        }
    }

    /// Validate `frame` and hand its observations to the sink.
    ///
    /// Submission is fire-and-forget; only a malformed frame produces an error,
    /// in which case nothing is submitted.
    pub fn process(&mut self, frame: &Frame) -> Result<()> {
        let now = now_ms();
        let observations = self.validator.validate_and_score_at(
            &frame.payload,
            frame.frame_time_delta,
            frame.fragment_start_time,
            now,
        )?;
        trace!(
            "frame {:?} scored with {} observations",
            self.validator.last_frame_index(),
            observations.len()
        );
        self.sink
            .submit(MetricBatch::new(self.namespace.clone(), now, observations));
        self.frames_processed += 1;
        Ok(())
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn validator(&self) -> &FrameValidator {
        &self.validator
    }
}
