use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::debug;

use crate::cache::HtmlCache;
use crate::chrome::ChromeConnector;
use crate::config::Config;
use crate::csv::Sinks;
use crate::document::Evaluation;
use crate::extract::extract_all;
use crate::failure::{parse_lines, FailureQueue};
use crate::request::HttpFetcher;
use crate::workflow::Workflow;
use crate::{info_time, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub targets: usize,
    pub accepted: usize,
    pub failed: usize,
    /// Rows written across all three sinks.
    pub rows: usize,
}

/// Sets up the output files and the browser connection, then runs both passes.
pub async fn process_site(config: &Config) -> Result<()> {
    let start_time = Local::now();

    tokio::fs::create_dir_all(&config.html_dir).await?;
    let failures = Arc::new(FailureQueue::new(&config.failures_file));
    failures.reset().await?;
    let mut sinks = Sinks::create(
        &config.page_info_file,
        &config.summary_file,
        &config.emag_file,
    )?;

    let workflow = Arc::new(Workflow::new(
        Arc::new(ChromeConnector::new(
            &config.browser_endpoint,
            config.navigation_timeout,
        )),
        Arc::new(HttpFetcher::new(config.fetch_timeout)?),
        HtmlCache::new(&config.html_dir),
        failures,
        &config.base_url,
        config.form_timeout,
    ));
    workflow.check_backend().await?;

    run(&workflow, &config.urls_file, config.max_workers, &mut sinks).await?;
    info_time!(start_time, "Finished PROCESSING ALL passes.");

    Ok(())
}

/// First pass over the targets in `urls_file`, second pass over whatever failed in the first.
pub async fn run(
    workflow: &Arc<Workflow>,
    urls_file: &Path,
    max_workers: usize,
    sinks: &mut Sinks,
) -> Result<[PassStats; 2]> {
    let targets = parse_lines(&tokio::fs::read_to_string(urls_file).await?);
    let first = run_pass(&urls_file.display().to_string(), workflow, targets, max_workers, sinks).await?;

    let failures = workflow.failures();
    let retries = failures.drain().await?;
    let second = run_pass(
        &failures.path().display().to_string(),
        workflow,
        retries,
        max_workers,
        sinks,
    )
    .await?;

    Ok([first, second])
}

/// Evaluates every target with at most `max_workers` at a time, then extracts and stores
/// the accepted ones one by one.
///
/// Extraction errors are returned as is: they mean the evaluator's markup changed.
pub async fn run_pass(
    label: &str,
    workflow: &Arc<Workflow>,
    targets: Vec<String>,
    max_workers: usize,
    sinks: &mut Sinks,
) -> Result<PassStats> {
    let start_time = Local::now();
    info_time!("[{}] Starting processing {} urls.", label, targets.len());

    let mut stats = PassStats {
        targets: targets.len(),
        ..Default::default()
    };
    if targets.is_empty() {
        info_time!("[{}] Nothing to process.", label);
        return Ok(stats);
    }

    let evaluations = evaluate_all(workflow, targets, max_workers).await?;
    for evaluation in &evaluations {
        let Some(doc) = evaluation.document() else {
            debug!(url = evaluation.target(), "left for the next pass");
            stats.failed += 1;
            continue;
        };
        let extracted = extract_all(&doc.parse(), &doc.target)?;
        stats.rows += sinks.store(&extracted)?;
        stats.accepted += 1;
    }

    info_time!(
        start_time,
        "[{}] Finished processing all urls: {} accepted, {} failed, {} rows.",
        label,
        stats.accepted,
        stats.failed,
        stats.rows
    );
    Ok(stats)
}

/// Results come back in completion order, not input order.
async fn evaluate_all(
    workflow: &Arc<Workflow>,
    targets: Vec<String>,
    max_workers: usize,
) -> Result<Vec<Evaluation>> {
    let semaphore = Arc::new(Semaphore::new(max_workers));
    let mut task_set = JoinSet::new();

    for target in targets {
        task_set.spawn({
            // Both are Arcs, cheap to clone.
            let workflow = workflow.clone();
            let semaphore = semaphore.clone();

            async move {
                let _permit = semaphore.acquire().await;
                workflow.evaluate(target).await
            }
        });
    }

    let mut evaluations = Vec::with_capacity(task_set.len());
    while let Some(task) = task_set.join_next().await {
        evaluations.push(task?);
    }
    Ok(evaluations)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::extract::fixtures::result_page;
    use crate::workflow::testing::{workflow, FakeBrowser, FakeFetcher, Script};

    struct Fixture {
        dir: tempfile::TempDir,
        workflow: Arc<Workflow>,
        sinks: Sinks,
    }

    impl Fixture {
        fn new(browser: &FakeBrowser, urls: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("urls.txt"), urls).unwrap();
            let (workflow, failures) = workflow(browser, FakeFetcher::default(), dir.path());
            std::fs::File::create(failures.path()).unwrap();

            let data = dir.path().join("data");
            let sinks = Sinks::create(
                &data.join("page_info.csv"),
                &data.join("err_warn_summary.csv"),
                &data.join("emag_summary.csv"),
            )
            .unwrap();

            Self {
                dir,
                workflow: Arc::new(workflow),
                sinks,
            }
        }

        fn csv_lines(&self, name: &str) -> Vec<String> {
            std::fs::read_to_string(self.dir.path().join("data").join(name))
                .unwrap()
                .lines()
                .skip(1)
                .map(String::from)
                .collect()
        }

        fn failed(&self) -> Vec<String> {
            parse_lines(&std::fs::read_to_string(self.workflow.failures().path()).unwrap())
        }
    }

    #[tokio::test]
    async fn every_target_is_stored_or_failed() {
        let emag = r#"<table class="error_behavior"><tr>
            <td>1.1</td><td>2</td><td>10, 12</td>
            <td>1.2</td><td>1</td><td>5</td></tr></table>"#;
        let by_url = result_page(Some("http://a.example"), emag);
        let by_file = result_page(None, "");
        let browser = FakeBrowser::new([
            ("http://a.example", Script::accepts_url(&by_url)),
            ("http://b.example", Script::accepts_file(&by_file)),
            ("http://c.example", Script::rejects()),
        ]);
        let mut fx = Fixture::new(&browser, "http://a.example\n\nhttp://b.example\nhttp://c.example\n");

        let urls = fx.dir.path().join("urls.txt");
        let [first, second] = run(&fx.workflow, &urls, 2, &mut fx.sinks).await.unwrap();

        assert_eq!(
            first,
            PassStats {
                targets: 3,
                accepted: 2,
                failed: 1,
                rows: 6,
            }
        );
        assert_eq!(
            second,
            PassStats {
                targets: 1,
                accepted: 0,
                failed: 1,
                rows: 0,
            }
        );

        let stored: HashSet<String> = fx
            .csv_lines("page_info.csv")
            .iter()
            .map(|l| l.split(',').next().unwrap().to_string())
            .collect();
        let failed = fx.failed();
        assert_eq!(stored, HashSet::from(["http://a.example".into(), "http://b.example".into()]));
        assert_eq!(failed, vec!["http://c.example"]);

        assert_eq!(fx.csv_lines("err_warn_summary.csv").len(), 2);
        assert_eq!(
            fx.csv_lines("emag_summary.csv"),
            vec![
                "http://a.example,error,behavior,1.1,2,\"10,12\"",
                "http://a.example,error,behavior,1.2,1,5",
            ]
        );
    }

    #[tokio::test]
    async fn retry_pass_recovers_a_target_that_failed_once() {
        let browser = FakeBrowser::new([("http://a.example", Script::rejects())]);
        let mut fx = Fixture::new(&browser, "http://a.example\n");

        let urls = fx.dir.path().join("urls.txt");
        let [first, second] = run(&fx.workflow, &urls, 1, &mut fx.sinks).await.unwrap();

        assert_eq!((first.failed, second.targets, second.failed), (1, 1, 1));
        assert_eq!(fx.failed(), vec!["http://a.example"]);
        assert!(fx.csv_lines("page_info.csv").is_empty());
    }

    #[tokio::test]
    async fn repeated_target_is_evaluated_and_recorded_once() {
        let browser = FakeBrowser::new([("http://a.example", Script::rejects())]);
        let mut fx = Fixture::new(&browser, "http://a.example\nhttp://a.example\n  http://a.example\n");

        let urls = fx.dir.path().join("urls.txt");
        let [first, second] = run(&fx.workflow, &urls, 3, &mut fx.sinks).await.unwrap();

        assert_eq!((first.targets, first.failed), (1, 1));
        assert_eq!((second.targets, second.failed), (1, 1));
        assert_eq!(browser.log.lock().unwrap().opened, 2);
        let raw = std::fs::read_to_string(fx.workflow.failures().path()).unwrap();
        assert_eq!(raw, "http://a.example\n");
    }

    #[tokio::test]
    async fn empty_retry_pass_is_a_no_op() {
        let browser = FakeBrowser::new(Vec::new());
        let mut fx = Fixture::new(&browser, "");

        let stats = run_pass("broken_urls.txt", &fx.workflow, Vec::new(), 4, &mut fx.sinks)
            .await
            .unwrap();

        assert_eq!(stats, PassStats::default());
        assert_eq!(browser.log.lock().unwrap().opened, 0);
        assert!(fx.csv_lines("page_info.csv").is_empty());
        assert!(fx.failed().is_empty());
    }

    #[tokio::test]
    async fn malformed_result_page_stops_the_run() {
        let browser = FakeBrowser::new([(
            "http://a.example",
            Script::accepts_url("<h2>Página Avaliada</h2><div class=\"tile\"></div>"),
        )]);
        let mut fx = Fixture::new(&browser, "http://a.example\n");

        let urls = fx.dir.path().join("urls.txt");
        let err = run(&fx.workflow, &urls, 1, &mut fx.sinks).await.unwrap_err();

        assert!(matches!(err, crate::Error::MissingField(_)));
    }
}
