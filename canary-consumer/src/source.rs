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

//! Frame sources feeding the validator.
//!
//! The production stream reader lives outside this crate. [`RecordReader`]
//! replays frames from a simple record stream so a session can be driven from
//! stdin or a capture file. Each record is big-endian:
//!
//! ```text
//! [i64 fragment_start_time][i64 frame_time_delta][u32 len][len bytes payload]
//! ```
//!
//! A `fragment_start_time` of `i64::MIN` marks a frame without fragment metadata.

use std::future::Future;
use std::io;

use canary_validator::Frame;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Marker for a record whose fragment carried no producer timestamp.
pub const NO_FRAGMENT_START: i64 = i64::MIN;

/// Upper bound on a single payload, guards against corrupt length prefixes.
pub const MAX_RECORD_PAYLOAD: u32 = 64 * 1024 * 1024;

/// Pull-based source of frames.
pub trait FrameSource {
    /// Next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> impl Future<Output = io::Result<Option<Frame>>> + Send;
}

pub struct RecordReader<R> {
    reader: R,
}

impl<R: AsyncRead + Unpin + Send> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the first field. `None` on a clean end of stream.
    async fn read_fragment_start(&mut self) -> io::Result<Option<i64>> {
        let mut head = [0u8; 8];
        let mut filled = 0;
        while filled < head.len() {
            let n = self.reader.read(&mut head[filled..]).await?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "frame record truncated in header",
                ));
            }
            filled += n;
        }
        Ok(Some(i64::from_be_bytes(head)))
    }
}

impl<R: AsyncRead + Unpin + Send> FrameSource for RecordReader<R> {
    async fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        let Some(fragment_start) = self.read_fragment_start().await? else {
            return Ok(None);
        };
        let frame_time_delta = self.reader.read_i64().await?;
        let len = self.reader.read_u32().await?;
        if len > MAX_RECORD_PAYLOAD {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame record of {len} bytes exceeds {MAX_RECORD_PAYLOAD}"),
            ));
        }
        let mut payload = vec![0u8; len as usize];
        self.reader.read_exact(&mut payload).await?;

        let fragment_start_time = match fragment_start {
            NO_FRAGMENT_START => None,
            start => Some(start),
        };
        Ok(Some(Frame::new(payload, frame_time_delta, fragment_start_time)))
    }
}

/// Write `frame` as one record readable by [`RecordReader`].
pub async fn write_record<W: AsyncWrite + Unpin>(
    writer: &mut W,
    frame: &Frame,
) -> io::Result<()> {
    let len = u32::try_from(frame.payload.len())
        .ok()
        .filter(|len| *len <= MAX_RECORD_PAYLOAD)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "frame payload too large"))?;
    let fragment_start = frame.fragment_start_time.unwrap_or(NO_FRAGMENT_START);
    writer.write_i64(fragment_start).await?;
    writer.write_i64(frame.frame_time_delta).await?;
    writer.write_u32(len).await?;
    writer.write_all(&frame.payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_records_until_clean_eof() {
        let mut buf = Vec::new();
        write_record(&mut buf, &Frame::new(vec![1, 2, 3], 33, Some(1_000)))
            .await
            .unwrap();
        write_record(&mut buf, &Frame::new(vec![], -5, None))
            .await
            .unwrap();

        let mut reader = RecordReader::new(buf.as_slice());
        let first = reader.next_frame().await.unwrap().unwrap();
        assert_eq!(first.payload, vec![1, 2, 3]);
        assert_eq!(first.frame_time_delta, 33);
        assert_eq!(first.fragment_start_time, Some(1_000));

        let second = reader.next_frame().await.unwrap().unwrap();
        assert!(second.payload.is_empty());
        assert_eq!(second.fragment_start_time, None);

        assert!(reader.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn truncated_record_is_an_error() {
        let mut buf = Vec::new();
        write_record(&mut buf, &Frame::new(vec![9; 10], 0, Some(1)))
            .await
            .unwrap();
        buf.truncate(buf.len() - 4);

        let mut reader = RecordReader::new(buf.as_slice());
        let err = reader.next_frame().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn partial_header_is_an_error() {
        let data = [0u8; 5];
        let mut reader = RecordReader::new(&data[..]);
        let err = reader.next_frame().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn oversized_length_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0i64.to_be_bytes());
        buf.extend_from_slice(&0i64.to_be_bytes());
        buf.extend_from_slice(&(MAX_RECORD_PAYLOAD + 1).to_be_bytes());

        let mut reader = RecordReader::new(buf.as_slice());
        let err = reader.next_frame().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
