use std::path::PathBuf;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tokio::fs;
use tracing::info;

use crate::{Error, Result};

const SCHEMES: [&str; 2] = ["https://", "http://"];

/// Local copies of pages that had to be uploaded to the evaluator.
#[derive(Debug, Clone)]
pub struct HtmlCache {
    dir: PathBuf,
}

impl HtmlCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, url: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.html", encode_url(url)?)))
    }

    /// Writes `markup` for `url` and returns the file's absolute path.
    pub async fn store(&self, url: &str, markup: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(url)?;
        fs::write(&path, markup.trim_start_matches('\u{feff}')).await?;
        let path = fs::canonicalize(&path).await?;

        let size = fs::metadata(&path).await?.len();
        info!(url, path = %path.display(), "cached html ({:.2}KB)", size as f64 / 1_000.0);
        Ok(path)
    }
}

/// Cache file name for `url`: url-safe base64 of its Latin-1 bytes, scheme dropped.
pub fn encode_url(url: &str) -> Result<String> {
    let bare = strip_scheme(url);
    let bytes = bare
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| Error::UnencodableUrl(url.into()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn strip_scheme(url: &str) -> &str {
    SCHEMES
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
        .unwrap_or(url)
}
