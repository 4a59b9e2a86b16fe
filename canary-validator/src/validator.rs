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

//! The FrameValidator, which scores canary frames and tracks sequence continuity.

use canary_diagnostics::{now_ms, DimensionSet, MetricUnit, Observation};
use log::debug;

use crate::error::{FrameError, Result};
use crate::frame::CanaryFrame;

pub const FRAME_SIZE_MATCH: &str = "FrameSizeMatch";
pub const FRAME_DATA_MATCHES: &str = "FrameDataMatches";
pub const FRAME_TIME_MATCHES: &str = "FrameTimeMatchesProducerTimestamp";
pub const FRAME_DROPPED: &str = "FrameDropped";
pub const END_TO_END_LATENCY: &str = "EndToEndFrameLatency";

/// Scores one stream's canary frames.
///
/// One instance per consumption session. It is not meant to be shared between
/// concurrent callers: the drop check reads and then overwrites
/// `last_frame_index` with no synchronization.
#[derive(Debug)]
pub struct FrameValidator {
    dimensions: DimensionSet,
    /// Index of the most recently processed frame, in or out of order.
    last_frame_index: Option<u32>,
}

impl FrameValidator {
    pub fn new(stream_name: &str, canary_label: &str) -> Self {
        Self {
            dimensions: DimensionSet::new(stream_name, canary_label),
            last_frame_index: None,
        }
    }

    pub fn last_frame_index(&self) -> Option<u32> {
        self.last_frame_index
    }

    /// Decode and check one frame, measuring latency against the wall clock.
    ///
    /// Returns 8 observations for the first frame of a session and 10 for every
    /// frame after it.
    pub fn validate_and_score(
        &mut self,
        payload: &[u8],
        frame_time_delta: i64,
        fragment_start_time: Option<i64>,
    ) -> Result<Vec<Observation>> {
        self.validate_and_score_at(payload, frame_time_delta, fragment_start_time, now_ms())
    }

    /// Same as [`Self::validate_and_score`] with an explicit processing time.
    pub fn validate_and_score_at(
        &mut self,
        payload: &[u8],
        frame_time_delta: i64,
        fragment_start_time: Option<i64>,
        now_ms: i64,
    ) -> Result<Vec<Observation>> {
        let fragment_start_time =
            fragment_start_time.ok_or(FrameError::MissingFragmentMetadata)?;
        let frame = CanaryFrame::decode(payload)?;

        let mut observations = Vec::with_capacity(10);
        self.push_check(&mut observations, FRAME_SIZE_MATCH, frame.size_matches());
        self.push_check(&mut observations, FRAME_DATA_MATCHES, frame.checksum_matches());
        self.push_check(
            &mut observations,
            FRAME_TIME_MATCHES,
            frame.timestamp_matches(fragment_start_time, frame_time_delta),
        );

        if let Some(last) = self.last_frame_index {
            let dropped = frame.frame_index != last.wrapping_add(1);
            if dropped {
                debug!(
                    "frame {} does not follow {} (dropped or reordered)",
                    frame.frame_index, last
                );
            }
            self.push_check(&mut observations, FRAME_DROPPED, dropped);
        }
        self.last_frame_index = Some(frame.frame_index);

        let latency_ms = (now_ms as f64) - (frame.timestamp_ms as f64);
        observations.extend(self.dimensions.expand(
            END_TO_END_LATENCY,
            latency_ms,
            MetricUnit::Milliseconds,
        ));

        Ok(observations)
    }

    fn push_check(&self, observations: &mut Vec<Observation>, name: &str, passed: bool) {
        let value = if passed { 1.0 } else { 0.0 };
        observations.extend(self.dimensions.expand(name, value, MetricUnit::None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{CANARY_METADATA_SIZE, CHECKSUM_OFFSET};

    fn payload(ts: i64, index: u32) -> Vec<u8> {
        let mut buf = vec![0xA5u8; 32];
        buf[0..8].copy_from_slice(&ts.to_be_bytes());
        buf[8..12].copy_from_slice(&index.to_be_bytes());
        buf[12..16].copy_from_slice(&32u32.to_be_bytes());
        let crc = CanaryFrame::checksum_for(&buf).unwrap();
        buf[CHECKSUM_OFFSET..CANARY_METADATA_SIZE].copy_from_slice(&crc.to_be_bytes());
        buf
    }

    fn value(observations: &[Observation], name: &str) -> Option<f64> {
        observations.iter().find(|o| o.name == name).map(|o| o.value)
    }

    #[test]
    fn first_frame_skips_drop_check() {
        let mut validator = FrameValidator::new("stream", "label");
        let obs = validator
            .validate_and_score_at(&payload(1_000, 17), 100, Some(900), 1_050)
            .unwrap();

        assert_eq!(obs.len(), 8);
        assert_eq!(value(&obs, FRAME_DROPPED), None);
        assert_eq!(validator.last_frame_index(), Some(17));
    }

    #[test]
    fn later_frames_add_the_drop_check_pair() {
        let mut validator = FrameValidator::new("stream", "label");
        validator
            .validate_and_score_at(&payload(1_000, 0), 0, Some(1_000), 1_000)
            .unwrap();
        let obs = validator
            .validate_and_score_at(&payload(1_033, 1), 33, Some(1_000), 1_040)
            .unwrap();

        assert_eq!(obs.len(), 10);
        assert_eq!(value(&obs, FRAME_DROPPED), Some(0.0));
    }

    #[test]
    fn observation_order_is_stable() {
        let mut validator = FrameValidator::new("stream", "label");
        validator
            .validate_and_score_at(&payload(1_000, 0), 0, Some(1_000), 1_000)
            .unwrap();
        let obs = validator
            .validate_and_score_at(&payload(1_000, 1), 0, Some(1_000), 1_000)
            .unwrap();
        let names: Vec<&str> = obs.iter().step_by(2).map(|o| o.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                FRAME_SIZE_MATCH,
                FRAME_DATA_MATCHES,
                FRAME_TIME_MATCHES,
                FRAME_DROPPED,
                END_TO_END_LATENCY
            ]
        );
    }

    #[test]
    fn out_of_order_frame_still_advances_marker() {
        let mut validator = FrameValidator::new("stream", "label");
        let mut dropped = Vec::new();
        for index in [0u32, 1, 3, 2, 3] {
            let obs = validator
                .validate_and_score_at(&payload(1_000, index), 0, Some(1_000), 1_000)
                .unwrap();
            dropped.push(value(&obs, FRAME_DROPPED));
        }

        assert_eq!(
            dropped,
            vec![None, Some(0.0), Some(1.0), Some(1.0), Some(0.0)]
        );
        assert_eq!(validator.last_frame_index(), Some(3));
    }

    #[test]
    fn index_wraps_around() {
        let mut validator = FrameValidator::new("stream", "label");
        validator
            .validate_and_score_at(&payload(1_000, u32::MAX), 0, Some(1_000), 1_000)
            .unwrap();
        let obs = validator
            .validate_and_score_at(&payload(1_000, 0), 0, Some(1_000), 1_000)
            .unwrap();
        assert_eq!(value(&obs, FRAME_DROPPED), Some(0.0));
    }

    #[test]
    fn timestamp_mismatch_is_reported_not_raised() {
        let mut validator = FrameValidator::new("stream", "label");
        let obs = validator
            .validate_and_score_at(&payload(1_000, 0), 10, Some(1_000), 1_000)
            .unwrap();
        assert_eq!(value(&obs, FRAME_TIME_MATCHES), Some(0.0));
        assert_eq!(value(&obs, FRAME_DATA_MATCHES), Some(1.0));
    }

    #[test]
    fn latency_uses_processing_time() {
        let mut validator = FrameValidator::new("stream", "label");
        let obs = validator
            .validate_and_score_at(&payload(1_000, 0), 0, Some(1_000), 1_250)
            .unwrap();
        let latency: Vec<&Observation> = obs
            .iter()
            .filter(|o| o.name == END_TO_END_LATENCY)
            .collect();

        assert_eq!(latency.len(), 2);
        assert!(latency.iter().all(|o| o.value == 250.0));
        assert!(latency.iter().all(|o| o.unit == MetricUnit::Milliseconds));
    }

    #[test]
    fn missing_fragment_metadata_is_fatal_and_keeps_state() {
        let mut validator = FrameValidator::new("stream", "label");
        let err = validator
            .validate_and_score_at(&payload(1_000, 4), 0, None, 1_000)
            .unwrap_err();

        assert_eq!(err, FrameError::MissingFragmentMetadata);
        assert_eq!(validator.last_frame_index(), None);
    }

    #[test]
    fn short_payload_is_fatal() {
        let mut validator = FrameValidator::new("stream", "label");
        let err = validator
            .validate_and_score_at(&[0u8; 10], 0, Some(0), 0)
            .unwrap_err();
        assert!(matches!(err, FrameError::TooShort { len: 10, .. }));
    }
}
