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

use std::sync::Arc;

use flume::{Receiver, Sender, TrySendError};
use log::warn;

use crate::observation::MetricBatch;

/// Capability used to hand a frame's observations off for emission.
///
/// `submit` must not block and has no result: delivery, retries and
/// buffering are the sink's concern, never the caller's.
pub trait MetricsSink: Send + Sync {
    fn submit(&self, batch: MetricBatch);
}

impl<S: MetricsSink + ?Sized> MetricsSink for Arc<S> {
    fn submit(&self, batch: MetricBatch) {
        (**self).submit(batch)
    }
}

impl<S: MetricsSink + ?Sized> MetricsSink for &S {
    fn submit(&self, batch: MetricBatch) {
        (**self).submit(batch)
    }
}

/// Sink backed by a flume channel. A publisher task drains the other end.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: Sender<MetricBatch>,
}

impl ChannelSink {
    pub fn new(sender: Sender<MetricBatch>) -> Self {
        Self { sender }
    }
}

impl MetricsSink for ChannelSink {
    fn submit(&self, batch: MetricBatch) {
        // Best-effort: a full or closed channel drops the batch.
        match self.sender.try_send(batch) {
            Ok(()) => {}
            Err(TrySendError::Full(batch)) => {
                warn!(
                    "metrics channel full, dropping batch of {} observations",
                    batch.len()
                );
            }
            Err(TrySendError::Disconnected(batch)) => {
                warn!(
                    "metrics publisher gone, dropping batch of {} observations",
                    batch.len()
                );
            }
        }
    }
}

/// Create a sink and the receiver its batches arrive on.
///
/// `None` gives an unbounded channel.
pub fn metrics_channel(capacity: Option<usize>) -> (ChannelSink, Receiver<MetricBatch>) {
    let (tx, rx) = match capacity {
        Some(cap) => flume::bounded(cap),
        None => flume::unbounded(),
    };
    (ChannelSink::new(tx), rx)
}
