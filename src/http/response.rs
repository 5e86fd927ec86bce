use crate::constants::*;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u16, status_text: &str) -> Self {
        Self {
            status_code,
            status_text: status_text.to_string(),
            headers: HashMap::from([("Content-Length".to_string(), "0".to_string())]),
            body: Vec::new(),
        }
    }

    pub fn set_header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_body(&mut self, body: Vec<u8>, content_type: &str) -> &mut Self {
        self.headers
            .insert("Content-Length".to_string(), body.len().to_string());
        self.headers
            .insert("Content-Type".to_string(), content_type.to_string());
        self.body = body;
        self
    }

    pub fn set_status_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.status_text = status_text(code).to_string();
        self
    }

    /// Response line + headers + body. Always includes `Content-Length`.
    /// Never emits `Connection: close` itself — handlers may add it via
    /// `set_header`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res =
            format!("HTTP/1.1 {} {}\r\n", self.status_code, self.status_text).into_bytes();

        for (key, val) in &self.headers {
            res.extend_from_slice(format!("{}: {}\r\n", to_pascal_case(key), val).as_bytes());
        }
        res.extend_from_slice(b"\r\n");
        res.extend_from_slice(&self.body);
        res
    }
}

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        _ => "Unknown",
    }
}

fn to_pascal_case(s: &str) -> String {
    s.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

pub fn get_mime_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

pub fn mime_for_path(path: &Path, mime_enabled: bool) -> &'static str {
    if !mime_enabled {
        return "application/octet-stream";
    }
    get_mime_type(path.extension().and_then(|s| s.to_str()))
}

/// Builds a plain-text error response for the given status code.
pub fn error_response(code: u16) -> HttpResponse {
    let mut response = HttpResponse::new(code, status_text(code));
    let body = format!("{} {}", code, status_text(code));
    response.set_body(body.into_bytes(), "text/plain");
    response
}
