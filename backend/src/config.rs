//! Runtime settings, read from `ACADEMY_*` environment variables.

use log::warn;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding every collection.
    pub database: PathBuf,
    /// Directory with the TTF files used for PDF output.
    pub fonts_dir: PathBuf,
    /// Font family name as laid out in `fonts_dir` (`<Family>-Regular.ttf`, ...).
    pub font_family: String,
    /// Root of the issued certificates, one sub-directory per job.
    pub issued_dir: PathBuf,
    /// Where application attachments are written.
    pub uploads_dir: PathBuf,
    pub open_browser: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: PathBuf::from("academy.sqlite"),
            fonts_dir: PathBuf::from("./fonts"),
            font_family: "LiberationSans".to_string(),
            issued_dir: PathBuf::from("./issued"),
            uploads_dir: PathBuf::from("./uploads"),
            open_browser: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset or unparsable values
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(host) = lookup("ACADEMY_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("ACADEMY_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("Ignoring invalid ACADEMY_PORT `{}`", port),
            }
        }
        if let Some(path) = lookup("ACADEMY_DB") {
            config.database = PathBuf::from(path);
        }
        if let Some(path) = lookup("ACADEMY_FONTS_DIR") {
            config.fonts_dir = PathBuf::from(path);
        }
        if let Some(family) = lookup("ACADEMY_FONT_FAMILY") {
            config.font_family = family;
        }
        if let Some(path) = lookup("ACADEMY_ISSUED_DIR") {
            config.issued_dir = PathBuf::from(path);
        }
        if let Some(path) = lookup("ACADEMY_UPLOADS_DIR") {
            config.uploads_dir = PathBuf::from(path);
        }
        if let Some(flag) = lookup("ACADEMY_OPEN_BROWSER") {
            config.open_browser = !matches!(flag.to_ascii_lowercase().as_str(), "0" | "false" | "no");
        }
        config
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.url(), "http://127.0.0.1:8080");
        assert!(config.open_browser);
    }

    #[test]
    fn overrides_and_bad_values() {
        let env: HashMap<&str, &str> = [
            ("ACADEMY_PORT", "not-a-port"),
            ("ACADEMY_DB", "/tmp/a.sqlite"),
            ("ACADEMY_OPEN_BROWSER", "false"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.port, 8080);
        assert_eq!(config.database, PathBuf::from("/tmp/a.sqlite"));
        assert!(!config.open_browser);
    }
}
