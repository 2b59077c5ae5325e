use ases_scrap::{config::Config, info_time, log, process::process_site, Result};
use chrono::Local;

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Local::now();
    let config = Config::from_env()?;
    let log_file = log::init(&config.logs_dir)?;
    info_time!("Logging to {}", log_file.display());

    process_site(&config).await?;
    info_time!(start_time, "Full program time:");

    Ok(())
}
