//! `POST /api/login`: validate `username`/`password` from the body
//! against the CSV store, issue a token on success.

use crate::config::Config;
use crate::http::request::Request;
use crate::http::response::HttpResponse;
use crate::json::Value;
use crate::jwt;
use crate::users;

pub fn login(req: &Request, _read_buf: &[u8], config: &Config) -> HttpResponse {
    let username = req
        .body_params
        .iter()
        .find(|(k, _)| k == "username")
        .map(|(_, v)| v.as_str());
    let password = req
        .body_params
        .iter()
        .find(|(k, _)| k == "password")
        .map(|(_, v)| v.as_str());

    let (username, password) = match (username, password) {
        (Some(u), Some(p)) => (u, p),
        _ => return json_response(error_body("Missing username or password.")),
    };

    logging::log_system!(logging::LogLevel::Info, "login attempt: user={username}");

    if !users::validate_credentials(&config.document_root, username, password) {
        return json_response(error_body("Invalid credentials."));
    }

    let token = jwt::encode(username, &config.jwt_secret, config.jwt_enabled);
    json_response(Value::Object(vec![
        ("status".to_string(), Value::String("success".to_string())),
        ("token".to_string(), Value::String(token)),
    ]))
}

fn error_body(message: &str) -> Value {
    Value::Object(vec![
        ("status".to_string(), Value::String("error".to_string())),
        ("message".to_string(), Value::String(message.to_string())),
    ])
}

fn json_response(value: Value) -> HttpResponse {
    let mut response = HttpResponse::new(200, "OK");
    response.set_body(value.to_string().into_bytes(), "application/json");
    response
}
