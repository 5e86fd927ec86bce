//! `GET /api/search`: `key1` names a file under `<DocumentRoot>/data`,
//! `key2` is a substring to grep for, line by line.

use crate::config::Config;
use crate::http::request::Request;
use crate::http::response::HttpResponse;

pub fn search(req: &Request, _read_buf: &[u8], config: &Config) -> HttpResponse {
    let key1 = req.query_params.iter().find(|(k, _)| k == "key1").map(|(_, v)| v.as_str());
    let key2 = req.query_params.iter().find(|(k, _)| k == "key2").map(|(_, v)| v.as_str());

    let body = match (key1, key2) {
        (Some(filename_key), Some(search_key)) => match read_and_search(config, filename_key, search_key) {
            Ok(matches) if !matches.is_empty() => matches,
            Ok(_) => "No results found.".to_string(),
            Err(message) => message,
        },
        _ => "Missing key1 or key2.".to_string(),
    };

    let mut response = HttpResponse::new(200, "OK");
    response.set_body(body.into_bytes(), "text/plain; charset=utf-8");
    response
}

fn read_and_search(config: &Config, filename_key: &str, search_key: &str) -> Result<String, String> {
    if filename_key.contains("..") {
        return Err("Invalid filename.".to_string());
    }
    let path = config
        .document_root
        .join("data")
        .join(format!("{filename_key}.txt"));
    let contents = std::fs::read_to_string(&path)
        .map_err(|_| format!("File not found: {filename_key}.txt"))?;
    Ok(contents
        .lines()
        .filter(|line| line.contains(search_key))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_with_notes(dir: &std::path::Path, contents: &str) -> Config {
        std::fs::create_dir_all(dir.join("data")).unwrap();
        let mut f = std::fs::File::create(dir.join("data").join("notes.txt")).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        let mut config = Config::default();
        config.document_root = dir.to_path_buf();
        config
    }

    fn request_with_query(key1: &str, key2: &str) -> Request {
        let mut req = Request::new();
        req.query_params = vec![
            ("key1".to_string(), key1.to_string()),
            ("key2".to_string(), key2.to_string()),
        ];
        req
    }

    #[test]
    fn finds_matching_lines() {
        let dir = std::env::temp_dir().join("edge_httpd_search_test_match");
        let config = config_with_notes(&dir, "alpha\nbeta\nalphabet\n");
        let req = request_with_query("notes", "alpha");
        let response = search(&req, &[], &config);
        let body = String::from_utf8(response.body).unwrap();
        assert_eq!(body, "alpha\nalphabet");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_reports_not_found() {
        let dir = std::env::temp_dir().join("edge_httpd_search_test_missing");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let config = {
            let mut c = Config::default();
            c.document_root = dir.clone();
            c
        };
        let req = request_with_query("nope", "x");
        let response = search(&req, &[], &config);
        let body = String::from_utf8(response.body).unwrap();
        assert_eq!(body, "File not found: nope.txt");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_path_traversal_in_filename() {
        let config = Config::default();
        let req = request_with_query("../../etc/passwd", "x");
        let response = search(&req, &[], &config);
        let body = String::from_utf8(response.body).unwrap();
        assert_eq!(body, "Invalid filename.");
    }

    #[test]
    fn missing_params_reports_missing() {
        let config = Config::default();
        let req = Request::new();
        let response = search(&req, &[], &config);
        let body = String::from_utf8(response.body).unwrap();
        assert_eq!(body, "Missing key1 or key2.");
    }
}
