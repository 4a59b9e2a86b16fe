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

//! Frame integrity validation for a synthetic-traffic video canary.
//!
//! A producer injects frames whose payload describes itself: capture time,
//! sequence index, size and a CRC32. [`FrameValidator`] decodes that header on
//! the consuming side, checks it against what actually arrived and reports the
//! result as [`canary_diagnostics::Observation`]s.

pub mod error;
pub mod frame;
pub mod processor;
pub mod validator;

pub use error::{FrameError, Result};
pub use frame::{CanaryFrame, Frame, CANARY_METADATA_SIZE};
pub use processor::CanaryFrameProcessor;
pub use validator::FrameValidator;
