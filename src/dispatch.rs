//! Request dispatch: the post-parse hook run once a connection's
//! parser reaches COMPLETE. Routes to a handler on an exact match,
//! falls back to the static-file responder for GET/HEAD on a miss, and
//! answers 501 for any other unrouted method.
//!
//! The request's body is an `(offset, len)` window and every handler
//! below takes it as a plain byte slice — there is no NUL-terminated
//! C-string view to maintain.

use crate::config::Config;
use crate::http::http_connection::Connection;
use crate::http::response::{error_response, HttpResponse};
use crate::router::Router;
use crate::static_file;

pub fn dispatch(conn: &mut Connection, router: &Router, config: &Config) {
    let content_type = conn.request.header("Content-Type").map(str::to_string);
    conn.request.populate_params(conn.read_buf(), content_type.as_deref());

    let method = conn.request.method.clone();
    let path = conn.request.decoded_path.clone();

    let response = match router.find(&method, &path) {
        Ok(handler) => handler(&conn.request, conn.read_buf(), config),
        Err(_) if method == "GET" || method == "HEAD" => {
            static_file::serve(&config.document_root, &path, config.mime_enabled)
        }
        Err(_) => error_response(501),
    };

    logging::log_access!(&conn.client_ip, &method, &conn.request.raw_uri, response.status_code);

    queue_response(conn, response);
    conn.state = crate::http::request::ParseState::Sending;
}

fn queue_response(conn: &mut Connection, response: HttpResponse) {
    conn.queue(&response.to_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HTTP_OK;
    use crate::http::request::Request;
    use crate::router::RouterBuilder;
    use mio::net::TcpListener;

    fn stub_handler(_req: &Request, _body: &[u8], _cfg: &Config) -> HttpResponse {
        HttpResponse::new(HTTP_OK, "OK")
    }

    fn test_connection() -> Connection {
        let mut listener = TcpListener::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let client = std::net::TcpStream::connect(addr).unwrap();
        client.set_nonblocking(true).unwrap();
        let (server_stream, _) = loop {
            match listener.accept() {
                Ok(pair) => break pair,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
                Err(e) => panic!("{e}"),
            }
        };
        std::mem::forget(client);
        Connection::new(server_stream, "127.0.0.1".to_string())
    }

    #[test]
    fn routed_path_invokes_handler() {
        let router = RouterBuilder::new().route("GET", "/a", stub_handler).build();
        let config = Config::default();
        let mut conn = test_connection();
        conn.request.method = "GET".to_string();
        conn.request.decoded_path = "/a".to_string();
        dispatch(&mut conn, &router, &config);
        assert!(conn.has_pending_write());
    }

    #[test]
    fn unrouted_non_get_is_not_implemented() {
        let router = RouterBuilder::new().build();
        let config = Config::default();
        let mut conn = test_connection();
        conn.request.method = "DELETE".to_string();
        conn.request.decoded_path = "/x".to_string();
        dispatch(&mut conn, &router, &config);
        assert!(conn.has_pending_write());
    }
}
