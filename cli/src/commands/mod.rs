pub mod add;
pub mod cli;
pub mod edit;
pub mod index;
pub mod list;

use std::path::Path;

use tasktrack_core::api::{AppConfig, CliError, IndexingSummary};
use tasktrack_plugins::factory::{build_services, Services};

use crate::progress::IndexProgress;

/// Build the services for `root` and run one full indexing pass.
pub async fn indexed_services(
    cfg: &AppConfig,
    root: &Path,
    show_progress: bool,
) -> Result<(Services, IndexingSummary), CliError> {
    let services = build_services(cfg, root)?;

    let progress = IndexProgress::new(show_progress).follow(services.indexing.subscribe());
    let summary = match services.indexing.start_indexing().await {
        Ok(Some(summary)) => {
            // Every finished pass ends with `Completed`, which stops the bar.
            let _ = progress.await;
            summary
        }
        Ok(None) => {
            progress.abort();
            return Err(CliError::Command(
                "an indexing pass is already running".to_string(),
            ));
        }
        Err(e) => {
            progress.abort();
            return Err(e.into());
        }
    };
    tracing::info!(
        total = summary.total,
        processed = summary.processed,
        errors = summary.errors,
        elapsed_ms = summary.elapsed_ms,
        "index ready"
    );
    Ok((services, summary))
}
