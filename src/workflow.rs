//! Drives one target through the evaluator.
//!
//! ```text
//! Init -> SubmitByUrl -> Accepted
//!              |
//!              v
//!        NeedsFallback -> Accepted
//!              |
//!              v
//!            Failed
//! ```
//!
//! Any error on the way lands in `Failed` as well. A target that fails is written to
//! the [`FailureQueue`] before [`Workflow::evaluate`] returns, so callers only ever
//! see an [`Evaluation`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::browser::{BrowserSession, SessionFactory};
use crate::cache::HtmlCache;
use crate::document::{is_evaluated, Evaluation, ResultDocument};
use crate::failure::FailureQueue;
use crate::request::PageFetcher;
use crate::Result;

/// Present once the evaluator's start page is usable.
pub const FORM_READY: &str = "div.containerTab";
pub const URL_INPUT: &str = "input#url";
pub const URL_SUBMIT: &str = "input#input_tab_1.submit";
pub const UPLOAD_MODE: &str = "label#validacaoPeloArquivo.rarios";
pub const FILE_INPUT: &str = "input#up_file";
pub const FILE_SUBMIT: &str = "input#input_tab_2.submit";

#[derive(Debug)]
enum Step {
    Init,
    SubmitByUrl,
    NeedsFallback,
    Accepted(String),
    Failed,
}

pub struct Workflow {
    sessions: Arc<dyn SessionFactory>,
    fetcher: Arc<dyn PageFetcher>,
    cache: HtmlCache,
    failures: Arc<FailureQueue>,
    base_url: String,
    form_timeout: Duration,
}

impl Workflow {
    pub fn new(
        sessions: Arc<dyn SessionFactory>,
        fetcher: Arc<dyn PageFetcher>,
        cache: HtmlCache,
        failures: Arc<FailureQueue>,
        base_url: impl Into<String>,
        form_timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            fetcher,
            cache,
            failures,
            base_url: base_url.into(),
            form_timeout,
        }
    }

    pub fn failures(&self) -> &FailureQueue {
        &self.failures
    }

    /// Opens and closes one session, so an unreachable browser is noticed before any work starts.
    pub async fn check_backend(&self) -> Result<()> {
        let mut session = self.sessions.open().await?;
        session.close().await
    }

    /// Runs `target` to `Accepted` or `Failed`. Never returns an error: failures are
    /// logged and queued for the next pass.
    pub async fn evaluate(&self, target: String) -> Evaluation {
        let mut session = match self.sessions.open().await {
            Ok(session) => session,
            Err(e) => {
                error!(url = %target, "couldn't open a browser session: {e}");
                return self.fail(target).await;
            }
        };

        let outcome = self.drive(session.as_mut(), &target).await;
        if let Err(e) = session.close().await {
            warn!(url = %target, "couldn't close the browser session: {e}");
        }

        match outcome {
            Ok(Some(markup)) => Evaluation::Accepted(ResultDocument::new(target, markup)),
            Ok(None) => self.fail(target).await,
            Err(e) => {
                error!(url = %target, "{e}");
                self.fail(target).await
            }
        }
    }

    async fn drive(&self, session: &mut dyn BrowserSession, target: &str) -> Result<Option<String>> {
        let mut step = Step::Init;
        loop {
            step = match step {
                Step::Init => {
                    self.open_form(session).await?;
                    Step::SubmitByUrl
                }
                Step::SubmitByUrl => {
                    session.fill(URL_INPUT, target).await?;
                    session.click(URL_SUBMIT).await?;

                    let markup = session.content().await?;
                    let ok = is_evaluated(&markup);
                    info!(url = target, ok, "submitted by url");
                    if ok {
                        Step::Accepted(markup)
                    } else {
                        Step::NeedsFallback
                    }
                }
                Step::NeedsFallback => {
                    info!(url = target, "retrieving html");
                    let page = self.fetcher.fetch(target).await?;
                    let html_file = self.cache.store(target, &page).await?;

                    self.open_form(session).await?;
                    session.click(UPLOAD_MODE).await?;
                    session.upload(FILE_INPUT, &html_file).await?;
                    session.hover_click(FILE_SUBMIT).await?;

                    let markup = session.content().await?;
                    let ok = is_evaluated(&markup);
                    info!(url = target, ok, "submitted by file");
                    if ok {
                        Step::Accepted(markup)
                    } else {
                        Step::Failed
                    }
                }
                Step::Accepted(markup) => return Ok(Some(markup)),
                Step::Failed => return Ok(None),
            };
        }
    }

    async fn open_form(&self, session: &mut dyn BrowserSession) -> Result<()> {
        session.goto(&self.base_url).await?;
        session.wait_for(FORM_READY, self.form_timeout).await
    }

    async fn fail(&self, target: String) -> Evaluation {
        if let Err(e) = self.failures.enqueue(&target).await {
            error!(url = %target, "couldn't record failure: {e}");
        }
        Evaluation::Failed { target }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::cache::encode_url;

    const EVALUATED: &str = "<h2>Página Avaliada</h2><p>result</p>";

    #[tokio::test]
    async fn accepted_on_first_try() {
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeBrowser::new([("http://example.com", Script::accepts_url(EVALUATED))]);
        let (workflow, failures) = workflow(&browser, FakeFetcher::default(), dir.path());

        let evaluation = workflow.evaluate("http://example.com".into()).await;

        assert_eq!(
            evaluation,
            Evaluation::Accepted(ResultDocument::new("http://example.com", EVALUATED))
        );
        assert!(failures.drain().await.unwrap().is_empty());
        assert!(!dir.path().join("html_files").exists());
        assert_eq!(
            browser.actions(),
            vec![
                "goto https://asesweb.example/",
                "wait div.containerTab",
                "fill input#url http://example.com",
                "click input#input_tab_1.submit",
            ]
        );
    }

    #[tokio::test]
    async fn falls_back_to_uploading_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeBrowser::new([("http://example.com", Script::accepts_file(EVALUATED))]);
        let (workflow, failures) = workflow(&browser, FakeFetcher::default(), dir.path());

        let evaluation = workflow.evaluate("http://example.com".into()).await;

        assert_eq!(evaluation.document().unwrap().markup(), EVALUATED);
        assert!(failures.drain().await.unwrap().is_empty());

        let cached = dir
            .path()
            .join("html_files")
            .join(format!("{}.html", encode_url("http://example.com").unwrap()));
        assert_eq!(
            std::fs::read_to_string(cached).unwrap(),
            "<html><body>copy of http://example.com</body></html>"
        );
        assert_eq!(
            browser.actions()[4..],
            [
                "goto https://asesweb.example/",
                "wait div.containerTab",
                "click label#validacaoPeloArquivo.rarios",
                "upload input#up_file",
                "hover_click input#input_tab_2.submit",
            ]
        );
    }

    #[tokio::test]
    async fn rejected_twice_is_recorded_once() {
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeBrowser::new([("http://example.com", Script::rejects())]);
        let (workflow, failures) = workflow(&browser, FakeFetcher::default(), dir.path());

        let evaluation = workflow.evaluate("http://example.com".into()).await;

        assert_eq!(
            evaluation,
            Evaluation::Failed {
                target: "http://example.com".into()
            }
        );
        assert_eq!(failures.drain().await.unwrap(), vec!["http://example.com"]);

        let cached = dir
            .path()
            .join("html_files")
            .join(format!("{}.html", encode_url("http://example.com").unwrap()));
        assert!(cached.is_file());
        assert_eq!(
            browser.actions()[4..],
            [
                "goto https://asesweb.example/",
                "wait div.containerTab",
                "click label#validacaoPeloArquivo.rarios",
                "upload input#up_file",
                "hover_click input#input_tab_2.submit",
            ]
        );
        let log = browser.log.lock().unwrap();
        assert_eq!((log.opened, log.closed), (1, 1));
    }

    #[tokio::test]
    async fn form_timeout_fails_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeBrowser::new([("http://example.com", Script::accepts_url(EVALUATED))])
            .with_broken_form();
        let (workflow, failures) = workflow(&browser, FakeFetcher::default(), dir.path());

        let evaluation = workflow.evaluate("http://example.com".into()).await;

        assert!(evaluation.document().is_none());
        assert_eq!(failures.drain().await.unwrap(), vec!["http://example.com"]);
        assert_eq!(browser.log.lock().unwrap().closed, 1);
    }

    #[tokio::test]
    async fn fetch_error_during_fallback_fails() {
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeBrowser::new([("http://example.com", Script::accepts_file(EVALUATED))]);
        let fetcher = FakeFetcher { unreachable: true };
        let (workflow, failures) = workflow(&browser, fetcher, dir.path());

        let evaluation = workflow.evaluate("http://example.com".into()).await;

        assert!(evaluation.document().is_none());
        assert_eq!(failures.drain().await.unwrap(), vec!["http://example.com"]);
    }

    #[tokio::test]
    async fn backend_check_opens_and_closes_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeBrowser::new(Vec::new());
        let (workflow, _) = workflow(&browser, FakeFetcher::default(), dir.path());

        workflow.check_backend().await.unwrap();

        let log = browser.log.lock().unwrap();
        assert_eq!((log.opened, log.closed), (1, 1));
    }
}
