use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::Result;

/// Installs the global subscriber: console output plus a fresh log file for this run.
/// Returns the path of the log file.
pub fn init(logs_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir)?;
    let path = logs_dir.join(format!("log_{}.log", Local::now().format("%Y%m%d%H%M%S")));
    let file = File::options().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(path)
}
