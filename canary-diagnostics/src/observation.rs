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

use serde::{Deserialize, Serialize};

use crate::{CATEGORY_DIMENSION, STREAM_DIMENSION};

/// Unit attached to an observation, named the way the monitoring backend expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    /// Dimensionless value, used for the 1.0 / 0.0 pass-fail checks.
    None,
    Milliseconds,
}

/// A monitoring key/value tag scoping an observation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single write-once metric record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub name: String,
    pub value: f64,
    pub unit: MetricUnit,
    pub dimension: Dimension,
}

/// The two dimensions every canary observation is reported under.
///
/// Built once per session and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionSet {
    per_stream: Dimension,
    aggregated: Dimension,
}

impl DimensionSet {
    pub fn new(stream_name: &str, canary_label: &str) -> Self {
        Self {
            per_stream: Dimension::new(STREAM_DIMENSION, stream_name),
            aggregated: Dimension::new(CATEGORY_DIMENSION, canary_label),
        }
    }

    /// Expand one measurement into its stream-scoped and aggregated records,
    /// in that order.
    pub fn expand(&self, name: &str, value: f64, unit: MetricUnit) -> [Observation; 2] {
        [&self.per_stream, &self.aggregated].map(|dimension| Observation {
            name: name.to_string(),
            value,
            unit,
            dimension: dimension.clone(),
        })
    }
}

/// Observations produced for one frame, as handed to a sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricBatch {
    pub namespace: String,
    /// Unix time in milliseconds when the batch was assembled.
    pub ts_ms: i64,
    pub observations: Vec<Observation>,
}

impl MetricBatch {
    pub fn new(namespace: impl Into<String>, ts_ms: i64, observations: Vec<Observation>) -> Self {
        Self {
            namespace: namespace.into(),
            ts_ms,
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
