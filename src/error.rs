use std::time::Duration;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is missing. Selector: {0}")]
    MissingSelector(String),
    #[error("Required field is missing from the result page: {0}")]
    MissingField(&'static str),
    #[error("Malformed table {table}: expected {expected} cells, found {found}")]
    MalformedTable {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Timed out after {waited:?} waiting for: {selector}")]
    Timeout { selector: String, waited: Duration },
    #[error("Browser session was already closed")]
    SessionClosed,
    #[error("URL can't be encoded as a cache file name: {0}")]
    UnencodableUrl(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Browser Error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Couldn't parse integer: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
    #[error("Couldn't parse number: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}
