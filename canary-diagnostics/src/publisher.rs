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

//! Drains submitted batches and publishes them as JSON log lines.

use flume::Receiver;
use log::{error, info};

use crate::observation::MetricBatch;

const METRICS_TARGET: &str = "canary::metrics";

/// Consumes batches from a [`crate::ChannelSink`] and writes each one as a
/// single JSON record under the `canary::metrics` log target.
pub struct LogPublisher {
    receiver: Receiver<MetricBatch>,
    published: u64,
}

impl LogPublisher {
    pub fn new(receiver: Receiver<MetricBatch>) -> Self {
        Self {
            receiver,
            published: 0,
        }
    }

    /// Publish until every sender has been dropped. Returns the number of
    /// batches published.
    pub async fn run(mut self) -> u64 {
        while let Ok(batch) = self.receiver.recv_async().await {
            self.publish(&batch);
        }
        info!("metrics publisher stopped after {} batches", self.published);
        self.published
    }

    fn publish(&mut self, batch: &MetricBatch) {
        match serde_json::to_string(batch) {
            Ok(line) => {
                info!(target: METRICS_TARGET, "{line}");
                self.published += 1;
            }
            Err(e) => error!("failed to serialize metric batch: {e}"),
        }
    }
}
