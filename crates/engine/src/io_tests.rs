// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn short_streams_are_not_truncated() {
    let combined = combine_truncated("hello", "world");
    assert_eq!(combined, format!("hello{ERROR_HEADER}world"));
}

#[test]
fn only_the_longer_stream_is_truncated_when_one_fits() {
    let stdout = "a".repeat(100);
    let stderr = "b".repeat(MAXIMUM_PLUGIN_OUTPUT_SIZE);
    let combined = combine_truncated(&stdout, &stderr);

    assert!(combined.contains(&stdout), "the short stream must be kept intact");
    assert!(combined.contains(OUTPUT_TRUNCATED_SUFFIX) || combined.contains(ERROR_TRUNCATED_SUFFIX));
}

#[test]
fn both_streams_are_truncated_to_half_when_both_exceed_half() {
    let stdout = "x".repeat(MAXIMUM_PLUGIN_OUTPUT_SIZE);
    let stderr = "y".repeat(MAXIMUM_PLUGIN_OUTPUT_SIZE);
    let combined = combine_truncated(&stdout, &stderr);

    assert!(combined.contains(OUTPUT_TRUNCATED_SUFFIX));
    assert!(combined.contains(ERROR_TRUNCATED_SUFFIX));

    let (out_part, err_part) = combined.split_once(ERROR_HEADER).unwrap();
    assert!(out_part.len() <= MAXIMUM_PLUGIN_OUTPUT_SIZE / 2 + OUTPUT_TRUNCATED_SUFFIX.len());
    assert!(err_part.len() <= MAXIMUM_PLUGIN_OUTPUT_SIZE / 2 + ERROR_TRUNCATED_SUFFIX.len());
}

#[test]
fn truncation_never_splits_a_utf8_character() {
    let stdout = "é".repeat(MAXIMUM_PLUGIN_OUTPUT_SIZE);
    let combined = combine_truncated(&stdout, "");
    assert!(combined.is_char_boundary(combined.len()));
}

#[tokio::test]
async fn init_creates_stdout_and_stderr_files_and_close_folds_output() {
    let dir = tempfile::tempdir().unwrap();
    let subpath = dir.path().join("plg-1");
    let handler = IoHandler::init(&subpath).await.unwrap();

    handler.append_info(b"out data").await;
    handler.append_error(b"err data").await;

    let output = handler.close().await;
    assert!(output.contains("out data"));
    assert!(output.contains("err data"));
    assert!(output.contains("ERROR"));

    assert_eq!(tokio::fs::read_to_string(subpath.join("stdout")).await.unwrap(), "out data");
    assert_eq!(tokio::fs::read_to_string(subpath.join("stderr")).await.unwrap(), "err data");
}

#[tokio::test]
async fn multi_writer_forwards_to_every_registered_sink() {
    let mut writer = DocumentIoMultiWriter::new();
    let buffer = writer.register_buffer();

    writer.write(b"hello").await;
    writer.close().await;

    assert_eq!(buffer.lock().as_slice(), b"hello");
}
