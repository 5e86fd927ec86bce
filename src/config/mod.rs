mod display;
mod validate;

pub use validate::validate;

use logging::LogLevel;
use logging::LogTarget;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_JWT_SECRET: &str = "a-very-secret-and-long-key-that-is-at-least-32-bytes";

/// Server configuration, loaded from a flat `key = value` file.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_port: u16,
    pub document_root: PathBuf,
    pub log_path: PathBuf,
    pub log_level: LogLevel,
    pub log_target: LogTarget,
    pub jwt_enabled: bool,
    pub jwt_secret: String,
    pub mime_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_port: 8080,
            document_root: PathBuf::from("www"),
            log_path: PathBuf::from("log"),
            log_level: LogLevel::Info,
            log_target: LogTarget::File,
            jwt_enabled: true,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            mime_enabled: true,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults for
    /// any key it doesn't find — and entirely if `path` is `None` or
    /// unreadable. Comments (`#`) and blank lines are skipped.
    pub fn load(path: Option<&Path>) -> Config {
        let mut config = Config::default();

        let Some(path) = path else {
            return config;
        };

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return config,
        };

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            apply(&mut config, key, value);
        }

        config
    }
}

fn apply(config: &mut Config, key: &str, value: &str) {
    match key {
        "ListenPort" => {
            if let Ok(port) = value.parse() {
                config.listen_port = port;
            }
        }
        "DocumentRoot" => config.document_root = PathBuf::from(value),
        "LogPath" => config.log_path = PathBuf::from(value),
        "LogLevel" => {
            if let Ok(level) = value.parse() {
                config.log_level = level;
            }
        }
        "LogTarget" => {
            if let Ok(target) = value.parse() {
                config.log_target = target;
            }
        }
        "JwtEnabled" => config.jwt_enabled = value != "0",
        "JwtSecret" => config.jwt_secret = value.to_string(),
        "MimeEnabled" => config.mime_enabled = value != "0",
        _ => {}
    }
}
