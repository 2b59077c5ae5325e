use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::Result;

/// Urls that couldn't be evaluated, persisted one per line so a later pass can retry them.
#[derive(Debug)]
pub struct FailureQueue {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl FailureQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file, or empties it if it exists.
    pub async fn reset(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::File::create(&self.path).await?;
        Ok(())
    }

    /// Appends `url` as a single line, flushed before returning.
    pub async fn enqueue(&self, url: &str) -> Result<()> {
        let line = format!("{url}\n");

        let _guard = self.append_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Takes every queued url and empties the queue.
    pub async fn drain(&self) -> Result<Vec<String>> {
        let _guard = self.append_lock.lock().await;
        let urls = match fs::read_to_string(&self.path).await {
            Ok(text) => parse_lines(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        fs::File::create(&self.path).await?;
        Ok(urls)
    }
}

/// Non-empty, trimmed lines of a url list. Repeats are dropped, the first occurrence keeps its place.
pub fn parse_lines(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && seen.insert(*l))
        .map(String::from)
        .collect()
}
