//! The event loop: one thread, one `mio::Poll`, one accept socket.
//! Accepts until would-block, then dispatches readable/writable events
//! to each connection in turn.

use crate::config::Config;
use crate::dispatch;
use crate::error::Result;
use crate::http::http_connection::{Connection, ReadOutcome, WriteOutcome};
use crate::router::Router;
use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::Arc;

const LISTENER_TOKEN: Token = Token(0);
const EVENTS_CAPACITY: usize = 1024;

pub struct Server {
    poll: Poll,
    listener: TcpListener,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    router: Arc<Router>,
    config: Config,
}

impl Server {
    pub fn new(config: Config, router: Arc<Router>) -> Result<Self> {
        let poll = Poll::new()?;
        let addr = format!("0.0.0.0:{}", config.listen_port).parse()?;
        let mut listener = TcpListener::bind(addr)?;
        poll.registry()
            .register(&mut listener, LISTENER_TOKEN, Interest::READABLE)?;

        Ok(Self {
            poll,
            listener,
            connections: HashMap::new(),
            next_token: 1,
            router,
            config,
        })
    }

    /// The address actually bound, including the OS-assigned port when
    /// `config.listen_port` was 0. Useful for tests driving a real socket.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the wait loop forever. Returns only on a fatal poll error.
    pub fn run(&mut self) -> Result<()> {
        let mut events = Events::with_capacity(EVENTS_CAPACITY);
        loop {
            self.poll.poll(&mut events, None)?;
            for event in events.iter() {
                let token = event.token();
                if token == LISTENER_TOKEN {
                    self.accept_all();
                    continue;
                }

                // A single edge-triggered event can report both
                // readiness kinds at once; draining only one would
                // leave the other un-drained with no further edge to
                // notify us, so both run independently this pass.
                if event.is_readable() {
                    self.handle_readable(token);
                }

                if event.is_writable() && self.connections.contains_key(&token) {
                    self.handle_writable(token);
                }

                if event.is_error() || (event.is_read_closed() && !event.is_readable()) {
                    self.terminate(token);
                }
            }
        }
    }

    fn accept_all(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((mut stream, addr)) => {
                    let token = Token(self.next_token);
                    self.next_token += 1;
                    if self
                        .poll
                        .registry()
                        .register(
                            &mut stream,
                            token,
                            Interest::READABLE,
                        )
                        .is_err()
                    {
                        continue;
                    }
                    let conn = Connection::new(stream, addr.ip().to_string());
                    self.connections.insert(token, conn);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(_) => break,
            }
        }
    }

    fn handle_readable(&mut self, token: Token) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };

        match conn.read_into_buffer() {
            ReadOutcome::PeerClosed | ReadOutcome::IoError => {
                self.terminate(token);
                return;
            }
            ReadOutcome::CapacityExceeded => {
                self.fail_with_413(token);
                return;
            }
            ReadOutcome::Drained => {}
        }

        if let Err(parse_error) = conn.advance_parser() {
            self.fail_parse(token, parse_error);
            return;
        }

        if conn.state == crate::http::request::ParseState::Complete {
            self.run_dispatch(token);
            self.rearm_for_write(token);
        }
    }

    /// A parse-fatal error normally destroys the connection with no
    /// response. `PayloadTooLarge` is the one exception: it queues a
    /// 413 and closes only after that response has flushed.
    fn fail_parse(&mut self, token: Token, error: crate::http::request::ParseError) {
        if error != crate::http::request::ParseError::PayloadTooLarge {
            self.terminate(token);
            return;
        }
        self.fail_with_413(token);
    }

    /// Queues a 413 and marks the connection to close once it flushes,
    /// rather than being kept alive for another request.
    fn fail_with_413(&mut self, token: Token) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };
        conn.queue(&crate::http::response::error_response(413).to_bytes());
        conn.state = crate::http::request::ParseState::Sending;
        conn.request.keep_alive = false;
        self.rearm_for_write(token);
    }

    fn handle_writable(&mut self, token: Token) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };

        match conn.drain_write() {
            WriteOutcome::IoError => {
                self.terminate(token);
                return;
            }
            WriteOutcome::WouldBlock => return,
            WriteOutcome::Drained => {}
        }

        self.on_write_drained(token);
    }

    /// The keep-alive decision, run once the write buffer is fully
    /// drained.
    fn on_write_drained(&mut self, token: Token) {
        let keep_alive = match self.connections.get(&token) {
            Some(conn) => conn.request.keep_alive,
            None => return,
        };

        if !keep_alive {
            self.terminate(token);
            return;
        }

        if self
            .poll
            .registry()
            .reregister(
                &mut self.connections.get_mut(&token).unwrap().stream,
                token,
                Interest::READABLE,
            )
            .is_err()
        {
            self.terminate(token);
            return;
        }

        let conn = self.connections.get_mut(&token).unwrap();
        conn.reset_for_next_request();

        // Mandatory synchronous re-entry: under edge-triggered
        // notification the readability edge for already-buffered
        // pipelined bytes has already been consumed.
        if conn.has_pipelined_bytes() {
            if let Err(parse_error) = conn.advance_parser() {
                self.fail_parse(token, parse_error);
                return;
            }
            if self.connections.get(&token).map(|c| c.state) == Some(crate::http::request::ParseState::Complete) {
                self.run_dispatch(token);
                self.rearm_for_write(token);
            }
        }
    }

    fn run_dispatch(&mut self, token: Token) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };
        dispatch::dispatch(conn, &self.router, &self.config);
    }

    fn rearm_for_write(&mut self, token: Token) {
        if let Some(conn) = self.connections.get_mut(&token) {
            let _ = self.poll.registry().reregister(
                &mut conn.stream,
                token,
                Interest::READABLE | Interest::WRITABLE,
            );
        }
    }

    fn terminate(&mut self, token: Token) {
        if let Some(mut conn) = self.connections.remove(&token) {
            let _ = self.poll.registry().deregister(&mut conn.stream);
        }
    }
}
