// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal HTTP/1.1 client over TCP for the robot's JSON API.
//!
//! One connection per request with `Connection: close`, so the response
//! body runs to EOF unless framed by `Content-Length` or chunked encoding.

use crate::robot::RobotError;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Largest response (headers and body) accepted from the robot.
pub(crate) const MAX_RESPONSE_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`RobotError::Status`].
    pub fn error_for_status(self) -> Result<Self, RobotError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(RobotError::Status { status: self.status, body: self.body })
        }
    }
}

/// Send one request and read the whole response, bounded by `timeout`.
pub async fn request(
    addr: &str,
    method: &str,
    path: &str,
    body: Option<&str>,
    timeout: Duration,
) -> Result<HttpResponse, RobotError> {
    let request = format_request(addr, method, path, body);
    tokio::time::timeout(timeout, send_request(addr, &request))
        .await
        .map_err(|_| RobotError::Timeout(timeout))?
}

fn format_request(addr: &str, method: &str, path: &str, body: Option<&str>) -> String {
    match body {
        Some(body) => format!(
            "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nAccept: application/json\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        ),
        None => format!(
            "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nAccept: application/json\r\n\r\n"
        ),
    }
}

async fn send_request(addr: &str, request: &str) -> Result<HttpResponse, RobotError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|e| RobotError::Connect { addr: addr.to_string(), reason: e.to_string() })?;
    stream.write_all(request.as_bytes()).await?;

    let raw = read_bounded(&mut stream, MAX_RESPONSE_BYTES).await?;
    parse_response(&raw)
}

/// Read to EOF, failing once more than `limit` bytes arrive.
pub(crate) async fn read_bounded<R: AsyncRead + Unpin>(
    reader: R,
    limit: u64,
) -> Result<Vec<u8>, RobotError> {
    let mut raw = Vec::new();
    reader.take(limit + 1).read_to_end(&mut raw).await?;
    if raw.len() as u64 > limit {
        return Err(RobotError::Decode(format!("response larger than {limit} bytes")));
    }
    Ok(raw)
}

pub(crate) fn parse_response(raw: &[u8]) -> Result<HttpResponse, RobotError> {
    let header_end = find(raw, b"\r\n\r\n")
        .ok_or_else(|| RobotError::Decode("missing header terminator".into()))?;
    let head = std::str::from_utf8(&raw[..header_end])
        .map_err(|e| RobotError::Decode(format!("non-utf8 headers: {e}")))?;

    let mut lines = head.split("\r\n");
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| RobotError::Decode("bad status line".into()))?;

    let mut chunked = false;
    let mut content_length = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "transfer-encoding" => chunked = value.trim().eq_ignore_ascii_case("chunked"),
            "content-length" => content_length = value.trim().parse::<usize>().ok(),
            _ => {}
        }
    }

    let rest = &raw[header_end + 4..];
    let body = if chunked {
        decode_chunked(rest)?
    } else if let Some(len) = content_length {
        rest.get(..len).ok_or_else(|| RobotError::Decode("truncated body".into()))?.to_vec()
    } else {
        rest.to_vec()
    };

    Ok(HttpResponse { status, body: String::from_utf8_lossy(&body).into_owned() })
}

fn decode_chunked(mut data: &[u8]) -> Result<Vec<u8>, RobotError> {
    let mut out = Vec::new();
    loop {
        let line_end =
            find(data, b"\r\n").ok_or_else(|| RobotError::Decode("truncated chunk size".into()))?;
        let size_line = std::str::from_utf8(&data[..line_end])
            .map_err(|e| RobotError::Decode(format!("bad chunk size: {e}")))?;
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|e| RobotError::Decode(format!("bad chunk size {size_hex:?}: {e}")))?;
        data = &data[line_end + 2..];
        if size == 0 {
            return Ok(out);
        }
        let chunk = data.get(..size).ok_or_else(|| RobotError::Decode("truncated chunk".into()))?;
        out.extend_from_slice(chunk);
        data = data.get(size + 2..).unwrap_or_default();
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
