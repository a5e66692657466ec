// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_content_length_body() {
    let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}trailing";
    let resp = parse_response(raw).unwrap();
    assert_eq!(resp, HttpResponse { status: 200, body: "{}".into() });
}

#[test]
fn parses_chunked_body() {
    let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\n{\"a\"\r\n3;ext=1\r\n:1}\r\n0\r\n\r\n";
    let resp = parse_response(raw).unwrap();
    assert_eq!(resp.body, "{\"a\":1}");
}

#[test]
fn body_runs_to_eof_without_framing() {
    let raw = b"HTTP/1.1 404 Not Found\r\n\r\nmissing";
    let resp = parse_response(raw).unwrap();
    assert_eq!(resp.status, 404);
    assert_eq!(resp.body, "missing");
    assert!(matches!(resp.error_for_status(), Err(RobotError::Status { status: 404, .. })));
}

#[yare::parameterized(
    no_terminator = { b"HTTP/1.1 200 OK\r\nContent-Length: 2" },
    bad_status    = { b"garbage\r\n\r\n" },
    truncated     = { b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort" },
    bad_chunk     = { b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n" },
)]
fn malformed_responses_are_decode_errors(raw: &[u8]) {
    assert!(matches!(parse_response(raw), Err(RobotError::Decode(_))));
}

#[test]
fn request_format_includes_length_for_bodies() {
    let req = format_request("robot:31950", "POST", "/runs/r/actions", Some("{}"));
    assert!(req.starts_with("POST /runs/r/actions HTTP/1.1\r\n"));
    assert!(req.contains("Content-Length: 2\r\n"));
    assert!(req.ends_with("\r\n\r\n{}"));
}

#[tokio::test]
async fn connect_failure_is_reported() {
    // port 1 on localhost is reserved and refuses connections
    let err = request("127.0.0.1:1", "GET", "/health", None, Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(err, RobotError::Connect { .. } | RobotError::Timeout(_)));
}

#[tokio::test]
async fn read_bounded_accepts_response_at_limit() {
    let raw: &[u8] = b"HTTP/1.1 200 OK\r\n\r\n{}";
    let read = read_bounded(raw, raw.len() as u64).await.unwrap();
    assert_eq!(read, raw);
}

#[tokio::test]
async fn read_bounded_rejects_oversized_response() {
    let raw = vec![b'x'; 65];
    let err = read_bounded(raw.as_slice(), 64).await.unwrap_err();
    assert!(matches!(err, RobotError::Decode(msg) if msg.contains("64")));
}
