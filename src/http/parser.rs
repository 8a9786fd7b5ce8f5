use std::fmt;

use crate::http::message::{find_ignore_case, Headers, Message};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// Blank line that ends the header block.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidHeader,
    InvalidContentLength,
    InvalidStatus,
    Incomplete,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::InvalidRequest => "malformed request line",
            ParseError::InvalidHeader => "malformed header line",
            ParseError::InvalidContentLength => "invalid Content-Length",
            ParseError::InvalidStatus => "malformed status line",
            ParseError::Incomplete => "incomplete message",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

/// Request line and headers, parsed before the body has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: Method,
    pub path: String,
    pub version: String,
    pub headers: Headers,
}

impl RequestHead {
    /// Number of body bytes that follow the head.
    ///
    /// Only POST carries a body; its length comes from `Content-Length`
    /// (0 when absent). GET and unrecognized methods never wait for a body.
    pub fn body_length(&self) -> Result<usize, ParseError> {
        if self.method != Method::POST {
            return Ok(0);
        }
        declared_length(&self.headers).map(|len| len.unwrap_or(0))
    }

    pub fn into_request(self, body: Vec<u8>) -> Request {
        Request::from_parts(
            self.method,
            self.path,
            Message::new(self.version, self.headers, body),
        )
    }
}

/// Parses the request line and headers at the start of `buf`.
///
/// Returns the head and the number of bytes it occupied, terminator
/// included. `ParseError::Incomplete` means the terminator has not arrived.
pub fn parse_head(buf: &[u8]) -> Result<(RequestHead, usize), ParseError> {
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let head = std::str::from_utf8(&buf[..headers_end]).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = head.split("\r\n");

    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let head = RequestHead {
        method: Method::parse(method),
        path: path.to_string(),
        version: version.to_string(),
        headers: parse_header_lines(lines)?,
    };

    Ok((head, headers_end + HEADER_TERMINATOR.len()))
}

/// Decodes one complete request from the start of `buf`.
///
/// Returns the request and the number of bytes consumed; anything after
/// that belongs to the next message.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let (head, head_len) = parse_head(buf)?;
    let body_len = head.body_length()?;

    let body_bytes = &buf[head_len..];
    if body_bytes.len() < body_len {
        return Err(ParseError::Incomplete);
    }

    let request = head.into_request(body_bytes[..body_len].to_vec());
    Ok((request, head_len + body_len))
}

/// Decodes one response as produced by [`crate::http::sender::serialize_response`].
///
/// Without a `Content-Length` header the rest of `buf` is taken as the body.
pub fn parse_http_response(buf: &[u8]) -> Result<(Response, usize), ParseError> {
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let head = std::str::from_utf8(&buf[..headers_end]).map_err(|_| ParseError::InvalidStatus)?;

    let mut lines = head.split("\r\n");
    let status_line = lines.next().ok_or(ParseError::InvalidStatus)?;
    let mut parts = status_line.splitn(3, ' ');

    let version = parts.next().ok_or(ParseError::InvalidStatus)?;
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .and_then(StatusCode::from_u16)
        .ok_or(ParseError::InvalidStatus)?;

    let headers = parse_header_lines(lines)?;
    let head_len = headers_end + HEADER_TERMINATOR.len();
    let body_bytes = &buf[head_len..];
    let body_len = declared_length(&headers)?.unwrap_or(body_bytes.len());

    if body_bytes.len() < body_len {
        return Err(ParseError::Incomplete);
    }

    let response = ResponseBuilder::new(status)
        .version(version)
        .headers(headers)
        .body(body_bytes[..body_len].to_vec())
        .build();

    Ok((response, head_len + body_len))
}

pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

fn parse_header_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Headers, ParseError> {
    let mut headers = Headers::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = split_header_line(line)?;
        headers.insert(key.to_string(), value.to_string());
    }

    Ok(headers)
}

/// Splits "Key: Value". Falls back to the first whitespace run when the
/// line carries no colon at all.
fn split_header_line(line: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = line
        .split_once(':')
        .or_else(|| line.split_once(char::is_whitespace))
        .ok_or(ParseError::InvalidHeader)?;

    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::InvalidHeader);
    }

    Ok((key, value.trim()))
}

fn declared_length(headers: &Headers) -> Result<Option<usize>, ParseError> {
    find_ignore_case(headers, "Content-Length")
        .map(|v| v.trim().parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()
}
