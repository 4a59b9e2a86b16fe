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

use anyhow::Context;
use canary_consumer::config::{ConsumerConfig, InputSource, Opt};
use canary_consumer::session::run_session;
use canary_consumer::source::RecordReader;
use canary_diagnostics::{metrics_channel, LogPublisher};
use canary_validator::CanaryFrameProcessor;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish()
        .try_init()?;

    let config = ConsumerConfig::try_from(Opt::parse())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(consume(config));
    // A stdin read parked on a blocking thread cannot be cancelled; do not
    // wait for it once the session is over.
    runtime.shutdown_background();
    result
}

async fn consume(config: ConsumerConfig) -> anyhow::Result<()> {
    info!("Stream name {}", config.stream_name);
    info!(
        "region {}, run duration {:?}, fragment size {:?}",
        config.region, config.run_duration, config.fragment_size
    );

    let (sink, receiver) = metrics_channel(None);
    let publisher = tokio::spawn(LogPublisher::new(receiver).run());
    let mut processor = CanaryFrameProcessor::with_namespace(
        &config.stream_name,
        &config.canary_label,
        config.namespace.clone(),
        sink,
    );

    let result = match &config.input {
        InputSource::Stdin => {
            let mut source = RecordReader::new(tokio::io::stdin());
            run_session(&mut source, &mut processor, config.run_duration).await
        }
        InputSource::File(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening frame records {}", path.display()))?;
            let mut source = RecordReader::new(tokio::io::BufReader::new(file));
            run_session(&mut source, &mut processor, config.run_duration).await
        }
    };

    // Dropping the processor closes the metrics channel so the publisher can finish.
    drop(processor);
    let published = publisher.await?;

    match result {
        Ok(summary) => {
            info!(
                "canary session finished: {} frames, {} metric batches, timed out: {}",
                summary.frames_processed, published, summary.timed_out
            );
            Ok(())
        }
        Err(e) => {
            error!("stream {} is broken: {e}", config.stream_name);
            Err(e.into())
        }
    }
}
