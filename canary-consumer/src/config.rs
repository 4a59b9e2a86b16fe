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

use std::path::PathBuf;
use std::time::Duration;

use canary_diagnostics::DEFAULT_NAMESPACE;
use clap::Parser;
use thiserror::Error;

/// Canary consumer
///
/// Reads a canary stream, validates every frame and publishes integrity
/// metrics for the configured run duration.
#[derive(Parser, Debug, Clone)]
#[clap(name = "canary-consumer")]
pub struct Opt {
    /// Stream name prefix.
    #[clap(long = "stream-name", env = "CANARY_STREAM_NAME")]
    pub stream_name_prefix: String,

    #[clap(long = "canary-type", env = "CANARY_TYPE")]
    pub canary_type: String,

    /// Label used for the aggregated metric dimension.
    #[clap(long = "canary-label", env = "CANARY_LABEL")]
    pub canary_label: String,

    #[clap(
        long = "region",
        env = "AWS_DEFAULT_REGION",
        default_value = "us-west-2"
    )]
    pub region: String,

    /// How long to consume before stopping.
    #[clap(long = "duration-secs", env = "CANARY_DURATION_IN_SECONDS")]
    pub duration_secs: u64,

    #[clap(long = "fragment-size", env = "FRAGMENT_SIZE_IN_BYTES")]
    pub fragment_size: Option<u64>,

    #[clap(
        long = "namespace",
        env = "CANARY_METRICS_NAMESPACE",
        default_value = DEFAULT_NAMESPACE
    )]
    pub namespace: String,

    /// Frame record file to read. Reads stdin when omitted or `-`.
    #[clap(long = "input", short = 'i')]
    pub input: Option<PathBuf>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("run duration must be greater than zero")]
    ZeroDuration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    pub stream_name: String,
    pub canary_type: String,
    pub canary_label: String,
    pub region: String,
    pub run_duration: Duration,
    pub fragment_size: Option<u64>,
    pub namespace: String,
    pub input: InputSource,
}

impl TryFrom<Opt> for ConsumerConfig {
    type Error = ConfigError;

    fn try_from(opt: Opt) -> Result<Self, Self::Error> {
        for (name, value) in [
            ("CANARY_STREAM_NAME", &opt.stream_name_prefix),
            ("CANARY_TYPE", &opt.canary_type),
            ("CANARY_LABEL", &opt.canary_label),
            ("CANARY_METRICS_NAMESPACE", &opt.namespace),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }
        if opt.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }

        let input = match opt.input {
            Some(path) if path.as_os_str() != "-" => InputSource::File(path),
            _ => InputSource::Stdin,
        };

        Ok(ConsumerConfig {
            stream_name: stream_name(
                &opt.stream_name_prefix,
                &opt.canary_type,
                &opt.canary_label,
            ),
            canary_type: opt.canary_type,
            canary_label: opt.canary_label,
            region: opt.region,
            run_duration: Duration::from_secs(opt.duration_secs),
            fragment_size: opt.fragment_size,
            namespace: opt.namespace,
            input,
        })
    }
}

/// Name of the stream the producer writes to: `{prefix}-{type}-{label}`.
pub fn stream_name(prefix: &str, canary_type: &str, canary_label: &str) -> String {
    format!("{prefix}-{canary_type}-{canary_label}")
}
