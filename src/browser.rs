use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Opens a fresh browser session per evaluation.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}

/// The handful of browser actions needed to drive the evaluator's forms.
/// Selectors are CSS selectors.
#[async_trait]
pub trait BrowserSession: Send {
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Waits until `selector` matches, failing with [`crate::Error::Timeout`] after `timeout`.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Clears the text field and types `text` into it.
    async fn fill(&mut self, selector: &str, text: &str) -> Result<()>;

    /// Points a file input at `path`.
    async fn upload(&mut self, selector: &str, path: &Path) -> Result<()>;

    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Moves the pointer over the element before clicking it. Some controls ignore
    /// clicks that don't come with a hover.
    async fn hover_click(&mut self, selector: &str) -> Result<()>;

    /// The currently rendered markup.
    async fn content(&mut self) -> Result<String>;

    async fn close(&mut self) -> Result<()>;
}
