use super::Config;
use std::fmt;

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  \x1b[38;5;244m───────────────────────────────────────────────\x1b[0m"
        )?;
        writeln!(
            f,
            "  \x1b[1;34m⦿\x1b[0m \x1b[1;37mListen:\x1b[0m       \x1b[32m0.0.0.0:{}\x1b[0m",
            self.listen_port
        )?;
        writeln!(
            f,
            "  \x1b[1;34m⦿\x1b[0m \x1b[1;37mDocumentRoot:\x1b[0m \x1b[36m{}\x1b[0m",
            self.document_root.display()
        )?;
        writeln!(
            f,
            "  \x1b[1;34m⦿\x1b[0m \x1b[1;37mLogging:\x1b[0m      \x1b[33m{:?}\x1b[0m → {} ({})",
            self.log_level,
            self.log_path.display(),
            if self.log_target == logging::LogTarget::Stdout {
                "stdout"
            } else {
                "file"
            }
        )?;
        writeln!(
            f,
            "  \x1b[1;34m⦿\x1b[0m \x1b[1;37mJWT:\x1b[0m          \x1b[{}m{}\x1b[0m",
            if self.jwt_enabled { "32" } else { "31" },
            if self.jwt_enabled { "enabled" } else { "mock" }
        )?;
        writeln!(
            f,
            "  \x1b[1;34m⦿\x1b[0m \x1b[1;37mMIME lookup:\x1b[0m  \x1b[{}m{}\x1b[0m",
            if self.mime_enabled { "32" } else { "31" },
            if self.mime_enabled { "on" } else { "off" }
        )?;
        write!(
            f,
            "  \x1b[38;5;244m───────────────────────────────────────────────\x1b[0m"
        )
    }
}
