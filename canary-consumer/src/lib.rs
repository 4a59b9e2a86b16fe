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

//! Bootstrap for a canary consumption session: configuration, the frame
//! source and the run loop that drives the validator.

pub mod config;
pub mod session;
pub mod source;

pub use config::{ConsumerConfig, InputSource, Opt};
pub use session::{run_session, SessionError, SessionSummary};
pub use source::{write_record, FrameSource, RecordReader};
