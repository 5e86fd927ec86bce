//! CSV-backed credential lookup. Format: header line, then `user,pass`
//! lines.

use std::path::Path;

pub fn validate_credentials(document_root: &Path, username: &str, password: &str) -> bool {
    let path = document_root.join("data").join("users.csv");
    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            logging::log_system!(logging::LogLevel::Error, "could not open {}: {e}", path.display());
            return false;
        }
    };

    contents
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(','))
        .any(|(user, pass)| user == username && pass.trim() == password)
}
