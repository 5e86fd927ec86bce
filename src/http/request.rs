//! The embedded per-connection request and the incremental parser that
//! drives it: REQ_LINE -> HEADERS -> BODY -> COMPLETE -> SENDING over
//! an index-pair body window (no sentinel, no raw pointers).

use crate::constants::{MAX_HEADERS, MAX_PARAMS, MAX_READ_BUFFER};
use crate::json::{self, Value};
use crate::urlutil::percent_decode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    ReqLine,
    Headers,
    Body,
    Complete,
    Sending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MalformedRequestLine,
    UnknownVersion,
    InvalidContentLength,
    /// `Content-Length` alone exceeds the read buffer's growth cap —
    /// rejected at the HEADERS -> BODY transition rather than waiting
    /// for bytes that will never be accepted.
    PayloadTooLarge,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedRequestLine => write!(f, "malformed request line"),
            ParseError::UnknownVersion => write!(f, "unsupported HTTP version"),
            ParseError::InvalidContentLength => write!(f, "invalid Content-Length"),
            ParseError::PayloadTooLarge => write!(f, "Content-Length exceeds read buffer cap"),
        }
    }
}

impl std::error::Error for ParseError {}

/// The request embedded in a connection. Reset in place between
/// requests rather than reallocated (`Request::reset`).
#[derive(Debug)]
pub struct Request {
    pub method: String,
    pub raw_uri: String,
    pub decoded_path: String,
    pub raw_query: Option<String>,
    pub decoded_query: Option<String>,
    pub minor_version: u8,
    pub keep_alive: bool,
    pub headers: Vec<(String, String)>,
    pub content_length: usize,
    /// `(offset, len)` window into the owning connection's read buffer.
    /// Never an owned copy; never a raw pointer.
    pub body: Option<(usize, usize)>,
    pub query_params: Vec<(String, String)>,
    pub body_params: Vec<(String, String)>,
    pub json: Option<Value>,
    pub authed_user: Option<String>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        Self {
            method: String::new(),
            raw_uri: String::new(),
            decoded_path: String::new(),
            raw_query: None,
            decoded_query: None,
            minor_version: 1,
            keep_alive: true,
            headers: Vec::new(),
            content_length: 0,
            body: None,
            query_params: Vec::new(),
            body_params: Vec::new(),
            json: None,
            authed_user: None,
        }
    }

    /// Zero-valued, matching construction, per the reset-for-next-request
    /// contract: all owned strings freed, arrays cleared, body nulled.
    pub fn reset(&mut self) {
        self.method.clear();
        self.raw_uri.clear();
        self.decoded_path.clear();
        self.raw_query = None;
        self.decoded_query = None;
        self.minor_version = 1;
        self.keep_alive = true;
        self.headers.clear();
        self.content_length = 0;
        self.body = None;
        self.query_params.clear();
        self.body_params.clear();
        self.json = None;
        self.authed_user = None;
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body bytes, looked up in the supplied read buffer. Callers must
    /// not retain this slice past the next reset-for-next-request.
    pub fn body_bytes<'a>(&self, read_buf: &'a [u8]) -> &'a [u8] {
        match self.body {
            Some((offset, len)) => &read_buf[offset..offset + len],
            None => &[],
        }
    }

    /// Populates `query_params` from `raw_query`, `body_params` from a
    /// urlencoded body, or `json` from a JSON body, per the dispatch
    /// contract. `content_type` is the raw header value, if any.
    pub fn populate_params(&mut self, read_buf: &[u8], content_type: Option<&str>) {
        if let Some(raw_query) = self.raw_query.clone() {
            self.query_params = split_urlencoded(&raw_query);
        }
        let body = self.body_bytes(read_buf).to_vec();
        match content_type {
            Some(ct) if ct.contains("application/x-www-form-urlencoded") => {
                let body_str = String::from_utf8_lossy(&body);
                self.body_params = split_urlencoded(&body_str);
            }
            Some(ct) if ct.contains("application/json") => {
                self.json = json::Value::parse(&body).ok();
            }
            _ => {}
        }
    }
}

fn split_urlencoded(raw: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for pair in raw.split('&') {
        if pair.is_empty() || out.len() >= MAX_PARAMS {
            continue;
        }
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        out.push((percent_decode(key), percent_decode(value)));
    }
    out
}

/// Scans `buf[from..limit]` for the first `\r\n` and returns its index
/// (pointing at `\r`). A lone `\n` is never accepted as a terminator.
fn find_crlf(buf: &[u8], from: usize, limit: usize) -> Option<usize> {
    if from >= limit {
        return None;
    }
    buf[from..limit]
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|i| from + i)
}

/// Drives the REQ_LINE -> HEADERS -> BODY -> COMPLETE transitions over
/// as much of `read_buf[..logical_len]` as is available, starting from
/// `*parse_cursor`. Idempotent and re-entrant: called again with more
/// bytes appended, it picks up where it left off. Returns `Ok(())` on
/// success (including "need more bytes", which just leaves state
/// unchanged) or a fatal `ParseError`.
pub fn advance(
    state: &mut ParseState,
    read_buf: &[u8],
    logical_len: usize,
    parse_cursor: &mut usize,
    request: &mut Request,
) -> Result<(), ParseError> {
    loop {
        match state {
            ParseState::ReqLine => {
                let Some(eol) = find_crlf(read_buf, *parse_cursor, logical_len) else {
                    return Ok(());
                };
                let line = std::str::from_utf8(&read_buf[*parse_cursor..eol])
                    .map_err(|_| ParseError::MalformedRequestLine)?;
                let mut fields = line.split(' ').filter(|s| !s.is_empty());
                let method = fields.next().ok_or(ParseError::MalformedRequestLine)?;
                let target = fields.next().ok_or(ParseError::MalformedRequestLine)?;
                let version = fields.next().ok_or(ParseError::MalformedRequestLine)?;
                if fields.next().is_some() {
                    return Err(ParseError::MalformedRequestLine);
                }
                let minor_version = match version {
                    "HTTP/1.0" => 0,
                    "HTTP/1.1" => 1,
                    _ => return Err(ParseError::UnknownVersion),
                };
                request.method = method.to_string();
                request.minor_version = minor_version;
                request.keep_alive = minor_version == 1;

                match target.split_once('?') {
                    Some((path, query)) => {
                        request.raw_uri = path.to_string();
                        request.decoded_path = percent_decode(path);
                        request.raw_query = Some(query.to_string());
                        request.decoded_query = Some(percent_decode(query));
                    }
                    None => {
                        request.raw_uri = target.to_string();
                        request.decoded_path = percent_decode(target);
                    }
                }

                *parse_cursor = eol + 2;
                *state = ParseState::Headers;
            }
            ParseState::Headers => {
                let Some(eol) = find_crlf(read_buf, *parse_cursor, logical_len) else {
                    return Ok(());
                };
                if eol == *parse_cursor {
                    *parse_cursor = eol + 2;
                    if request.content_length > MAX_READ_BUFFER {
                        return Err(ParseError::PayloadTooLarge);
                    }
                    *state = if request.content_length > 0 {
                        ParseState::Body
                    } else {
                        ParseState::Complete
                    };
                    continue;
                }
                let line = String::from_utf8_lossy(&read_buf[*parse_cursor..eol]).into_owned();
                if let Some((name, value)) = line.split_once(':') {
                    let name = name.trim();
                    let value = value.trim_start_matches(' ');
                    if name.eq_ignore_ascii_case("content-length") {
                        request.content_length = value
                            .trim()
                            .parse::<usize>()
                            .map_err(|_| ParseError::InvalidContentLength)?;
                    } else if name.eq_ignore_ascii_case("connection") {
                        if value.eq_ignore_ascii_case("close") {
                            request.keep_alive = false;
                        } else if value.eq_ignore_ascii_case("keep-alive") {
                            request.keep_alive = true;
                        }
                    }
                    if request.headers.len() < MAX_HEADERS {
                        request.headers.push((name.to_string(), value.to_string()));
                    }
                }
                *parse_cursor = eol + 2;
            }
            ParseState::Body => {
                if logical_len - *parse_cursor < request.content_length {
                    return Ok(());
                }
                request.body = Some((*parse_cursor, request.content_length));
                *parse_cursor += request.content_length;
                *state = ParseState::Complete;
            }
            ParseState::Complete | ParseState::Sending => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &[u8]) -> (ParseState, usize, Request, Result<(), ParseError>) {
        let mut state = ParseState::ReqLine;
        let mut cursor = 0usize;
        let mut request = Request::new();
        let result = advance(&mut state, input, input.len(), &mut cursor, &mut request);
        (state, cursor, request, result)
    }

    #[test]
    fn parses_simple_get_with_no_body() {
        let (state, cursor, request, result) = run(b"GET / HTTP/1.0\r\n\r\n");
        result.unwrap();
        assert_eq!(state, ParseState::Complete);
        assert_eq!(request.method, "GET");
        assert_eq!(request.decoded_path, "/");
        assert_eq!(request.minor_version, 0);
        assert!(!request.keep_alive);
        assert_eq!(cursor, 19);
    }

    #[test]
    fn http_11_defaults_to_keep_alive() {
        let (_, _, request, result) = run(b"GET /a HTTP/1.1\r\nHost: x\r\n\r\n");
        result.unwrap();
        assert!(request.keep_alive);
    }

    #[test]
    fn connection_close_overrides_default() {
        let (_, _, request, result) =
            run(b"GET /a HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n");
        result.unwrap();
        assert!(!request.keep_alive);
    }

    #[test]
    fn splits_query_from_path_and_decodes() {
        let (_, _, mut request, result) =
            run(b"GET /search?key1=my%20file&key2=foo%26bar HTTP/1.1\r\nHost: x\r\n\r\n");
        result.unwrap();
        assert_eq!(request.decoded_path, "/search");
        request.populate_params(&[], None);
        assert!(request.query_params.contains(&("key1".to_string(), "my file".to_string())));
        assert!(request.query_params.contains(&("key2".to_string(), "foo&bar".to_string())));
    }

    #[test]
    fn malformed_request_line_is_fatal() {
        let (_, _, _, result) = run(b"GET\r\n\r\n");
        assert_eq!(result, Err(ParseError::MalformedRequestLine));
    }

    #[test]
    fn unknown_version_is_fatal() {
        let (_, _, _, result) = run(b"GET / HTTP/2.0\r\n\r\n");
        assert_eq!(result, Err(ParseError::UnknownVersion));
    }

    #[test]
    fn content_length_over_cap_is_rejected_before_buffering_body() {
        let input = b"POST /x HTTP/1.1\r\nContent-Length: 99999999999\r\n\r\n";
        let (_, _, _, result) = run(input);
        assert_eq!(result, Err(ParseError::PayloadTooLarge));
    }

    #[test]
    fn waits_for_more_bytes_when_request_line_incomplete() {
        let (state, cursor, _, result) = run(b"GET / HTTP/1.1\r\n");
        result.unwrap();
        assert_eq!(state, ParseState::Headers);
        assert_eq!(cursor, 16);
    }

    #[test]
    fn body_is_an_index_pair_not_a_copy() {
        let input = b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let (state, _, request, result) = run(input);
        result.unwrap();
        assert_eq!(state, ParseState::Complete);
        assert_eq!(request.body_bytes(input), b"hello");
    }

    #[test]
    fn body_waits_until_fully_buffered() {
        let input = b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel";
        let (state, _, request, result) = run(input);
        result.unwrap();
        assert_eq!(state, ParseState::Body);
        assert_eq!(request.body, None);
    }

    #[test]
    fn duplicate_content_length_last_wins() {
        let input = b"POST /x HTTP/1.1\r\nContent-Length: 1\r\nContent-Length: 5\r\n\r\nhello";
        let (_, _, request, result) = run(input);
        result.unwrap();
        assert_eq!(request.content_length, 5);
    }

    #[test]
    fn header_without_colon_is_skipped() {
        let input = b"GET / HTTP/1.1\r\nnocolon\r\nHost: x\r\n\r\n";
        let (_, _, request, result) = run(input);
        result.unwrap();
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("host"), Some("x"));
    }

    #[test]
    fn headers_past_cap_are_dropped_but_parsing_continues() {
        let mut input = String::from("GET / HTTP/1.1\r\n");
        for i in 0..40 {
            input.push_str(&format!("X-{i}: v\r\n"));
        }
        input.push_str("\r\n");
        let (state, _, request, result) = run(input.as_bytes());
        result.unwrap();
        assert_eq!(state, ParseState::Complete);
        assert_eq!(request.headers.len(), MAX_HEADERS);
    }

    #[test]
    fn parses_across_split_chunks_identically() {
        let whole = b"GET /a HTTP/1.1\r\nHost: x\r\n\r\n";
        let (_, _, whole_request, _) = run(whole);

        let mut state = ParseState::ReqLine;
        let mut cursor = 0usize;
        let mut request = Request::new();
        let mut logical_len = 0usize;
        let mut buf = Vec::new();
        for chunk in [&whole[..5], &whole[5..15], &whole[15..]] {
            buf.extend_from_slice(chunk);
            logical_len += chunk.len();
            advance(&mut state, &buf, logical_len, &mut cursor, &mut request).unwrap();
        }
        assert_eq!(request.method, whole_request.method);
        assert_eq!(request.decoded_path, whole_request.decoded_path);
        assert_eq!(request.headers, whole_request.headers);
    }
}
