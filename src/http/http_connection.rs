//! Per-connection state: owned read/write buffers, parse state, and
//! the embedded request. One document root, no subprocess handlers.

use crate::constants::{INITIAL_BUF_SIZE, MAX_READ_BUFFER};
use crate::http::request::{self, ParseError, ParseState, Request};
use mio::net::TcpStream;
use std::io::{ErrorKind, Read, Write};

pub struct Connection {
    pub stream: TcpStream,
    pub client_ip: String,
    read_buf: Vec<u8>,
    read_len: usize,
    parse_cursor: usize,
    write_buf: Vec<u8>,
    write_len: usize,
    send_cursor: usize,
    pub state: ParseState,
    pub request: Request,
}

/// Outcome of draining the socket into the read buffer.
pub enum ReadOutcome {
    /// `read` returned `WouldBlock`; the readable edge has been consumed.
    Drained,
    /// `read` returned 0: the peer closed its write half.
    PeerClosed,
    /// `read` returned an error other than would-block.
    IoError,
    /// The read buffer would have to grow past `MAX_READ_BUFFER`.
    CapacityExceeded,
}

/// Outcome of flushing the write buffer to the socket.
pub enum WriteOutcome {
    /// Fully drained: `send_cursor == write_len`.
    Drained,
    /// `write` returned `WouldBlock`; wait for the next writable edge.
    WouldBlock,
    /// `write` returned an error other than would-block.
    IoError,
}

impl Connection {
    pub fn new(stream: TcpStream, client_ip: String) -> Self {
        Self {
            stream,
            client_ip,
            read_buf: vec![0u8; INITIAL_BUF_SIZE],
            read_len: 0,
            parse_cursor: 0,
            write_buf: vec![0u8; INITIAL_BUF_SIZE],
            write_len: 0,
            send_cursor: 0,
            state: ParseState::ReqLine,
            request: Request::new(),
        }
    }

    pub fn read_buf(&self) -> &[u8] {
        &self.read_buf[..self.read_len]
    }

    /// Frees the request's owned data, compacts unconsumed (pipelined)
    /// bytes to offset 0, clears the write buffer, and rearms the
    /// parser at REQ_LINE.
    pub fn reset_for_next_request(&mut self) {
        self.request.reset();
        self.read_buf.copy_within(self.parse_cursor..self.read_len, 0);
        self.read_len -= self.parse_cursor;
        self.parse_cursor = 0;
        self.write_len = 0;
        self.send_cursor = 0;
        self.state = ParseState::ReqLine;
    }

    pub fn has_pipelined_bytes(&self) -> bool {
        self.read_len > 0
    }

    /// Drains the socket into the read buffer until `WouldBlock`, EOF,
    /// or capacity is exhausted. Never blocks past a single edge.
    pub fn read_into_buffer(&mut self) -> ReadOutcome {
        let mut scratch = [0u8; 4096];
        loop {
            match self.stream.read(&mut scratch) {
                Ok(0) => return ReadOutcome::PeerClosed,
                Ok(n) => {
                    if !self.append_to_read_buf(&scratch[..n]) {
                        return ReadOutcome::CapacityExceeded;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return ReadOutcome::Drained,
                Err(_) => return ReadOutcome::IoError,
            }
        }
    }

    /// Appends `data`, growing `read_buf` by doubling. Returns `false`
    /// if the grown capacity would exceed `MAX_READ_BUFFER`.
    fn append_to_read_buf(&mut self, data: &[u8]) -> bool {
        if needed_exceeds_cap(self.read_len, data.len()) {
            return false;
        }
        let needed = self.read_len + data.len();
        let mut capacity = self.read_buf.len().max(1);
        while capacity < needed {
            capacity *= 2;
        }
        if capacity > self.read_buf.len() {
            self.read_buf.resize(capacity, 0);
        }
        self.read_buf[self.read_len..needed].copy_from_slice(data);
        self.read_len = needed;
        true
    }

    /// Runs the incremental parser over whatever is unconsumed in the
    /// read buffer.
    pub fn advance_parser(&mut self) -> Result<(), ParseError> {
        request::advance(
            &mut self.state,
            &self.read_buf,
            self.read_len,
            &mut self.parse_cursor,
            &mut self.request,
        )
    }

    /// Appends bytes to the write buffer, growing by doubling. Multiple
    /// calls before a flush accumulate.
    pub fn queue(&mut self, bytes: &[u8]) {
        let needed = self.write_len + bytes.len();
        let mut capacity = self.write_buf.len().max(1);
        while capacity < needed {
            capacity *= 2;
        }
        if capacity > self.write_buf.len() {
            self.write_buf.resize(capacity, 0);
        }
        self.write_buf[self.write_len..needed].copy_from_slice(bytes);
        self.write_len = needed;
    }

    pub fn has_pending_write(&self) -> bool {
        self.write_len > self.send_cursor
    }

    /// Flushes `write_buf[send_cursor..write_len]` until drained or the
    /// socket would block.
    pub fn drain_write(&mut self) -> WriteOutcome {
        while self.write_len > self.send_cursor {
            match self.stream.write(&self.write_buf[self.send_cursor..self.write_len]) {
                Ok(0) => return WriteOutcome::IoError,
                Ok(n) => self.send_cursor += n,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return WriteOutcome::WouldBlock,
                Err(_) => return WriteOutcome::IoError,
            }
        }
        WriteOutcome::Drained
    }
}

pub fn io_error_is_fatal(kind: ErrorKind) -> bool {
    !matches!(kind, ErrorKind::WouldBlock)
}

fn needed_exceeds_cap(read_len: usize, additional: usize) -> bool {
    read_len + additional > MAX_READ_BUFFER
}
