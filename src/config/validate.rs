use super::Config;
use crate::error::ServerError;

/// Rejects configurations that would fail later anyway, before the
/// listener ever binds.
pub fn validate(config: &Config) -> Result<(), ServerError> {
    if config.listen_port == 0 {
        return Err("ListenPort must be a non-zero port number".into());
    }
    if config.document_root.as_os_str().is_empty() {
        return Err("DocumentRoot must not be empty".into());
    }
    if config.jwt_enabled && config.jwt_secret.len() < 16 {
        return Err("JwtSecret must be at least 16 bytes when JwtEnabled=1".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_port() {
        let mut config = Config::default();
        config.listen_port = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_short_secret_when_jwt_enabled() {
        let mut config = Config::default();
        config.jwt_secret = "short".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn accepts_short_secret_when_jwt_disabled() {
        let mut config = Config::default();
        config.jwt_secret = "short".to_string();
        config.jwt_enabled = false;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate(&Config::default()).is_ok());
    }
}
