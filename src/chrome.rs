use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::{Browser, Element, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browser::{BrowserSession, SessionFactory};
use crate::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Connects to an already running Chrome over the DevTools protocol.
/// Each session is its own connection with a single tab.
pub struct ChromeConnector {
    endpoint: String,
    navigation_timeout: Duration,
}

impl ChromeConnector {
    pub fn new(endpoint: impl Into<String>, navigation_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            navigation_timeout,
        }
    }
}

#[async_trait]
impl SessionFactory for ChromeConnector {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let (browser, mut handler) =
            tokio::time::timeout(self.navigation_timeout, Browser::connect(self.endpoint.clone()))
                .await
                .map_err(|_| Error::Timeout {
                    selector: self.endpoint.clone(),
                    waited: self.navigation_timeout,
                })??;

        // The handler drives the websocket, it has to be polled for the whole session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match tokio::time::timeout(self.navigation_timeout, browser.new_page("about:blank")).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                handler_task.abort();
                return Err(e.into());
            }
            Err(_) => {
                handler_task.abort();
                return Err(Error::Timeout {
                    selector: "about:blank".into(),
                    waited: self.navigation_timeout,
                });
            }
        };
        debug!(endpoint = %self.endpoint, "opened browser session");

        Ok(Box::new(ChromeSession {
            _browser: browser,
            page: Some(page),
            handler_task,
            navigation_timeout: self.navigation_timeout,
        }))
    }
}

pub struct ChromeSession {
    _browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromeSession {
    fn page(&self) -> Result<&Page> {
        self.page.as_ref().ok_or(Error::SessionClosed)
    }

    async fn find(&self, selector: &str) -> Result<Element> {
        Ok(self.page()?.find_element(selector).await?)
    }

    /// Clicks usually submit a form; give the resulting navigation a chance to finish.
    async fn settle(&self) -> Result<()> {
        let page = self.page()?;
        if tokio::time::timeout(self.navigation_timeout, page.wait_for_navigation())
            .await
            .is_err()
        {
            warn!("no navigation finished within {:?}", self.navigation_timeout);
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        let page = self.page()?;
        tokio::time::timeout(self.navigation_timeout, page.goto(url))
            .await
            .map_err(|_| Error::Timeout {
                selector: url.into(),
                waited: self.navigation_timeout,
            })??;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let page = self.page()?;
        tokio::time::timeout(timeout, async {
            while page.find_element(selector).await.is_err() {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| Error::Timeout {
            selector: selector.into(),
            waited: timeout,
        })
    }

    async fn fill(&mut self, selector: &str, text: &str) -> Result<()> {
        let input = self.find(selector).await?;
        input
            .call_js_fn("function() { this.value = ''; }", false)
            .await?;
        input.focus().await?;
        input.type_str(text).await?;
        Ok(())
    }

    async fn upload(&mut self, selector: &str, path: &Path) -> Result<()> {
        let input = self.find(selector).await?;
        let mut params = SetFileInputFilesParams::new(vec![path.display().to_string()]);
        params.backend_node_id = Some(input.backend_node_id.clone());
        self.page()?.execute(params).await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.find(selector).await?.click().await?;
        self.settle().await
    }

    async fn hover_click(&mut self, selector: &str) -> Result<()> {
        let button = self.find(selector).await?;
        button.hover().await?;
        button.click().await?;
        self.settle().await
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.page()?.content().await?)
    }

    async fn close(&mut self) -> Result<()> {
        let closed = match self.page.take() {
            Some(page) => match tokio::time::timeout(self.navigation_timeout, page.close()).await {
                Ok(closed) => closed.map_err(Error::from),
                Err(_) => Err(Error::Timeout {
                    selector: "page close".into(),
                    waited: self.navigation_timeout,
                }),
            },
            None => Ok(()),
        };
        self.handler_task.abort();
        closed
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
