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

//! Metric observations for the stream canary and the sink they are handed to.
//!
//! The validator never talks to a monitoring backend directly. It builds
//! [`Observation`]s, packs them into a [`MetricBatch`] and hands the batch to a
//! [`MetricsSink`]. Submission is fire-and-forget: a sink never reports back.

pub mod observation;
pub mod publisher;
pub mod sink;

pub use observation::{Dimension, DimensionSet, MetricBatch, MetricUnit, Observation};
pub use publisher::LogPublisher;
pub use sink::{metrics_channel, ChannelSink, MetricsSink};

/// Namespace the canary metrics are published under.
pub const DEFAULT_NAMESPACE: &str = "KinesisVideoSDKCanary";

/// Dimension name scoping an observation to a single stream.
pub const STREAM_DIMENSION: &str = "ProducerSDKCanaryStreamName";

/// Dimension name scoping an observation to the aggregated canary category.
pub const CATEGORY_DIMENSION: &str = "ProducerSDKCanaryType";

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
