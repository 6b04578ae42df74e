//! End-to-end audit run: assemble the report, write artifacts, push summary rows.

use std::sync::Arc;

use crate::config::AuditConfig;
use crate::domain::models::AuditReport;
use crate::error::Result;
use crate::service::report::{write_artifacts, Artifacts};
use crate::service::{
    publish, BestEffortSink, HttpPageScanner, LighthouseScorer, PageScanner, ReportAssembler,
    Scorer, WebhookSink,
};

#[derive(Debug)]
pub struct RunOutcome {
    pub report: AuditReport,
    pub artifacts: Artifacts,
    /// `None` when no webhook is configured.
    pub webhook_delivered: Option<bool>,
}

/// Run with the production collaborators built from `config`.
pub async fn run_audit(config: &AuditConfig) -> Result<RunOutcome> {
    let scorer: Arc<dyn Scorer> = Arc::new(LighthouseScorer::new(
        config.lighthouse_path.as_deref(),
        config.chrome_path.as_deref(),
    ));
    let scanner: Arc<dyn PageScanner> = Arc::new(HttpPageScanner::new()?);
    let sink = match config.webhook_url.as_deref() {
        Some(url) => Some(WebhookSink::new(url)?),
        None => None,
    };

    run_with(
        config,
        scorer,
        scanner,
        sink.as_ref().map(|s| s as &dyn BestEffortSink),
    )
    .await
}

/// Run with injected collaborators.
///
/// Any assembly failure returns before artifacts are written. The sink only
/// sees the report after both artifacts are on disk, and its outcome never
/// fails the run.
pub async fn run_with(
    config: &AuditConfig,
    scorer: Arc<dyn Scorer>,
    scanner: Arc<dyn PageScanner>,
    sink: Option<&dyn BestEffortSink>,
) -> Result<RunOutcome> {
    let report = ReportAssembler::from_config(config, scorer, scanner)
        .assemble()
        .await?;

    let artifacts = write_artifacts(&report, &config.output_dir).await?;

    let webhook_delivered = match sink {
        Some(sink) => Some(publish(sink, &report).await),
        None => {
            log::debug!("[WEBHOOK] No webhook configured, skipping push");
            None
        }
    };

    Ok(RunOutcome {
        report,
        artifacts,
        webhook_delivered,
    })
}
