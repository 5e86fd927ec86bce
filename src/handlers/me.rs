//! `GET /api/me`: validate the `Authorization: Bearer <token>` header
//! and echo the authenticated username.

use crate::config::Config;
use crate::http::request::Request;
use crate::http::response::{error_response, HttpResponse};
use crate::json::Value;
use crate::jwt;

pub fn me(req: &Request, _read_buf: &[u8], config: &Config) -> HttpResponse {
    let Some(auth) = req.header("Authorization") else {
        return error_response(401);
    };
    let Some(token) = auth.strip_prefix("Bearer ") else {
        return error_response(401);
    };

    match jwt::decode(token, &config.jwt_secret, config.jwt_enabled) {
        Ok(username) => {
            let body = Value::Object(vec![
                ("status".to_string(), Value::String("success".to_string())),
                (
                    "user".to_string(),
                    Value::Object(vec![(
                        "username".to_string(),
                        Value::String(username),
                    )]),
                ),
            ]);
            let mut response = HttpResponse::new(200, "OK");
            response.set_body(body.to_string().into_bytes(), "application/json");
            response
        }
        Err(_) => error_response(401),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.jwt_enabled = false;
        config
    }

    #[test]
    fn valid_bearer_token_returns_username() {
        let mut req = Request::new();
        req.headers.push(("Authorization".to_string(), "Bearer alice".to_string()));
        let response = me(&req, &[], &config());
        assert_eq!(response.status_code, 200);
        let body = String::from_utf8(response.body).unwrap();
        assert!(body.contains("\"username\":\"alice\""));
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let req = Request::new();
        let response = me(&req, &[], &config());
        assert_eq!(response.status_code, 401);
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        let mut req = Request::new();
        req.headers.push(("Authorization".to_string(), "Basic xyz".to_string()));
        let response = me(&req, &[], &config());
        assert_eq!(response.status_code, 401);
    }
}
