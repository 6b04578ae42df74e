//! Report renderers and artifact persistence.

mod html;
mod json;

pub use html::{finding_line, render_html, HtmlReport, PageRow, NO_FINDINGS};
pub use json::{parse_json, render_json};

use std::path::{Path, PathBuf};

use crate::domain::models::AuditReport;
use crate::error::{AuditError, Result};

pub const JSON_ARTIFACT: &str = "gritaudit-report.json";
pub const HTML_ARTIFACT: &str = "gritaudit-report.html";

/// Paths of the files written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Write the JSON and HTML artifacts, creating `dir` if needed.
pub async fn write_artifacts(report: &AuditReport, dir: &Path) -> Result<Artifacts> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| AuditError::Artifact {
            path: dir.to_path_buf(),
            source,
        })?;

    let artifacts = Artifacts {
        json: dir.join(JSON_ARTIFACT),
        html: dir.join(HTML_ARTIFACT),
    };

    write_file(&artifacts.json, render_json(report)?).await?;
    write_file(&artifacts.html, render_html(report)).await?;

    log::info!(
        "[REPORT] Wrote {} and {}",
        artifacts.json.display(),
        artifacts.html.display()
    );
    Ok(artifacts)
}

async fn write_file(path: &Path, contents: String) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| AuditError::Artifact {
            path: path.to_path_buf(),
            source,
        })
}
