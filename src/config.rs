use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::{Error, Result};

/// Run configuration. Defaults come from the crate constants, every field can be
/// overridden through the environment (or a `.env` file).
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub browser_endpoint: String,
    pub max_workers: usize,
    pub form_timeout: Duration,
    pub navigation_timeout: Duration,
    pub fetch_timeout: Duration,
    pub urls_file: PathBuf,
    pub failures_file: PathBuf,
    pub html_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub page_info_file: PathBuf,
    pub summary_file: PathBuf,
    pub emag_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: crate::BASE_URL.to_string(),
            browser_endpoint: crate::BROWSER_URL.to_string(),
            max_workers: crate::MAX_WORKERS,
            form_timeout: Duration::from_millis(crate::FORM_TIMEOUT_MS),
            navigation_timeout: Duration::from_millis(crate::NAV_TIMEOUT_MS),
            fetch_timeout: Duration::from_millis(crate::FETCH_TIMEOUT_MS),
            urls_file: crate::URLS_FILE.into(),
            failures_file: crate::FAILURES_FILE.into(),
            html_dir: crate::HTML_DIR.into(),
            logs_dir: crate::LOGS_DIR.into(),
            page_info_file: crate::PAGE_INFO_FILE.into(),
            summary_file: crate::SUMMARY_FILE.into(),
            emag_file: crate::EMAG_FILE.into(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv();
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = var("ASES_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = var("ASES_BROWSER_URL") {
            self.browser_endpoint = v;
        }
        if let Some(v) = var("ASES_MAX_WORKERS") {
            self.max_workers = parse_var("ASES_MAX_WORKERS", &v)?;
        }
        if let Some(v) = var("ASES_FORM_TIMEOUT_MS") {
            self.form_timeout = Duration::from_millis(parse_var("ASES_FORM_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = var("ASES_NAV_TIMEOUT_MS") {
            self.navigation_timeout = Duration::from_millis(parse_var("ASES_NAV_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = var("ASES_FETCH_TIMEOUT_MS") {
            self.fetch_timeout = Duration::from_millis(parse_var("ASES_FETCH_TIMEOUT_MS", &v)?);
        }

        let paths = [
            ("ASES_URLS_FILE", &mut self.urls_file),
            ("ASES_FAILURES_FILE", &mut self.failures_file),
            ("ASES_HTML_DIR", &mut self.html_dir),
            ("ASES_LOGS_DIR", &mut self.logs_dir),
            ("ASES_PAGE_INFO_FILE", &mut self.page_info_file),
            ("ASES_SUMMARY_FILE", &mut self.summary_file),
            ("ASES_EMAG_FILE", &mut self.emag_file),
        ];
        for (key, field) in paths {
            if let Some(v) = var(key) {
                *field = v.into();
            }
        }

        if self.max_workers == 0 {
            return Err(Error::Config("ASES_MAX_WORKERS must be at least 1".into()));
        }
        Ok(self)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a valid number, got {value:?}")))
}
