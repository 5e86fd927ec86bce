//! Static-file responder: queues bytes only through the write queue,
//! emits a response line plus `Content-Length` and a MIME
//! `Content-Type`, and never touches the socket directly.

use crate::http::response::{error_response, mime_for_path, HttpResponse};
use std::path::{Component, Path, PathBuf};

/// Resolves `decoded_path` under `document_root` and builds the
/// response. `/` maps to `index.html`. Paths containing a `..`
/// component are rejected as traversal attempts (403), matching the
/// original's `strstr(filepath, "..")` guard.
pub fn serve(document_root: &Path, decoded_path: &str, mime_enabled: bool) -> HttpResponse {
    let relative = decoded_path.trim_start_matches('/');
    let relative = if relative.is_empty() {
        "index.html"
    } else {
        relative
    };

    let requested = PathBuf::from(relative);
    if requested
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return error_response(403);
    }

    let full_path = document_root.join(&requested);
    match std::fs::read(&full_path) {
        Ok(body) => {
            let mime = mime_for_path(&full_path, mime_enabled);
            let mut response = HttpResponse::new(200, "OK");
            response.set_body(body, mime);
            response
        }
        Err(_) => error_response(404),
    }
}
