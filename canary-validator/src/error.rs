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

use thiserror::Error;

/// Result type for frame validation.
pub type Result<T> = std::result::Result<T, FrameError>;

/// Fatal problems with a canary frame.
///
/// These mean the canary harness itself is broken. Integrity mismatches are
/// never errors; they are reported as observations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("canary frame too short: {len} bytes, need at least {required}")]
    TooShort { len: usize, required: usize },

    #[error("fragment metadata missing producer-side start timestamp")]
    MissingFragmentMetadata,
}
