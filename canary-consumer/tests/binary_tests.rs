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

//! Runs the `canary-consumer` binary end to end.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

fn consumer() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_canary-consumer"));
    cmd.args([
        "--stream-name",
        "canary",
        "--canary-type",
        "realtime",
        "--canary-label",
        "ci",
        "--duration-secs",
        "1",
    ])
    .env("RUST_LOG", "warn")
    .stdout(Stdio::null())
    .stderr(Stdio::null());
    cmd
}

#[tokio::test]
async fn exits_after_run_duration_while_stdin_stays_open() {
    let mut child = consumer().stdin(Stdio::piped()).spawn().unwrap();
    // Keep the write end open so the consumer's stdin read never returns.
    let stdin = child.stdin.take().unwrap();

    let status = tokio::time::timeout(Duration::from_secs(15), child.wait())
        .await
        .expect("consumer kept running after its run duration")
        .unwrap();

    assert!(status.success());
    drop(stdin);
}

#[tokio::test]
async fn malformed_input_exits_with_failure() {
    let dir = std::env::temp_dir().join(format!("canary-consumer-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("short-frame.bin");
    let mut record = Vec::new();
    record.extend_from_slice(&1_000i64.to_be_bytes());
    record.extend_from_slice(&0i64.to_be_bytes());
    record.extend_from_slice(&3u32.to_be_bytes());
    record.extend_from_slice(&[1, 2, 3]);
    std::fs::write(&path, record).unwrap();

    let status = tokio::time::timeout(
        Duration::from_secs(15),
        consumer().arg("--input").arg(&path).stdin(Stdio::null()).status(),
    )
    .await
    .expect("consumer did not exit")
    .unwrap();

    assert!(!status.success());
    std::fs::remove_dir_all(&dir).ok();
}
