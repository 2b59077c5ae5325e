//! ASES SCRAPER
//! Submits pages to the ASES accessibility evaluator through a remote browser and
//! stores the evaluation results as CSV.

pub mod browser;
pub mod cache;
pub mod chrome;
pub mod config;
pub mod csv;
pub mod document;
pub mod extract;
pub mod failure;
pub mod log;
mod macros;
pub mod model;
pub mod process;
pub mod request;
pub mod workflow;

mod error;
pub use error::{Error, Result};

pub const BASE_URL: &str = "https://asesweb.governoeletronico.gov.br/";
/// DevTools endpoint of the remote browser. `http://` endpoints are resolved to a websocket url.
pub const BROWSER_URL: &str = "http://localhost:9222";
pub const MAX_WORKERS: usize = 10;
/// How long to wait for the evaluator's form to show up.
pub const FORM_TIMEOUT_MS: u64 = 2_000;
pub const NAV_TIMEOUT_MS: u64 = 30_000;
/// Limit for fetching a page straight from its origin.
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

pub const URLS_FILE: &str = "urls.txt";
pub const FAILURES_FILE: &str = "broken_urls.txt";
pub const HTML_DIR: &str = "html_files";
pub const LOGS_DIR: &str = "logs";
pub const PAGE_INFO_FILE: &str = "data/page_info.csv";
pub const SUMMARY_FILE: &str = "data/err_warn_summary.csv";
pub const EMAG_FILE: &str = "data/emag_summary.csv";
