//! Lighthouse scorer - runs the `lighthouse` CLI against a private headless Chrome.
//!
//! Each call launches its own browser, points Lighthouse at the browser's
//! DevTools port, then closes the browser before the result is inspected.

use super::Scorer;
use crate::domain::models::{CategoryScores, DeviceProfile, Metrics, ScoreReport};
use crate::error::{AuditError, Result};
use crate::service::browser::ChromeInstance;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

const CATEGORIES: &str = "--only-categories=performance,accessibility,best-practices,seo";

/// Scorer backed by the Lighthouse CLI.
///
/// Provides per profile:
/// - Performance, accessibility, best-practices and SEO category scores
/// - Core Web Vitals lab metrics (LCP, CLS, TBT, Speed Index)
///
/// Trade-off: ~10-20 seconds per call due to a cold Chrome start.
pub struct LighthouseScorer {
    lighthouse_path: PathBuf,
    chrome_path: PathBuf,
}

impl LighthouseScorer {
    pub fn new(lighthouse_path: Option<&Path>, chrome_path: Option<&Path>) -> Self {
        let lighthouse_path = Self::find_lighthouse_path(lighthouse_path);
        let chrome_path = ChromeInstance::find_executable(chrome_path);
        log::info!("[SCORER] Lighthouse path: {:?}", lighthouse_path);
        log::info!("[SCORER] Chrome path: {:?}", chrome_path);
        Self {
            lighthouse_path,
            chrome_path,
        }
    }

    fn find_lighthouse_path(configured: Option<&Path>) -> PathBuf {
        if let Some(path) = configured {
            return path.to_path_buf();
        }

        let binary_name = if cfg!(target_os = "windows") {
            "lighthouse.cmd"
        } else {
            "lighthouse"
        };

        // Try a project-local install first
        let local_path = PathBuf::from("node_modules").join(".bin").join(binary_name);
        if local_path.exists() {
            return local_path;
        }

        // Try next to the binary
        let exe_path = std::env::current_exe().unwrap_or_default();
        let exe_dir = exe_path.parent().unwrap_or(Path::new("."));
        let bundled_path = exe_dir.join(binary_name);
        if bundled_path.exists() {
            return bundled_path;
        }

        // Fallback - assume lighthouse is in PATH
        PathBuf::from(binary_name)
    }

    /// Emulation flags for the given profile.
    pub fn profile_args(profile: DeviceProfile) -> &'static [&'static str] {
        match profile {
            DeviceProfile::Mobile => &["--form-factor=mobile"],
            DeviceProfile::Desktop => &["--preset=desktop"],
        }
    }

    async fn run_lighthouse(
        &self,
        url: &str,
        profile: DeviceProfile,
        port: u16,
    ) -> anyhow::Result<LighthouseReport> {
        let start_time = std::time::Instant::now();

        let output = Command::new(&self.lighthouse_path)
            .arg(url)
            .arg(format!("--port={}", port))
            .args(["--output=json", "--output-path=stdout", "--quiet", CATEGORIES])
            .args(Self::profile_args(profile))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to spawn lighthouse")?;

        log::debug!(
            "[SCORER] Lighthouse ({}) finished in {:.2}ms",
            profile,
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !stderr.is_empty() {
            log::debug!("[SCORER] stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            anyhow::bail!(
                "Lighthouse failed ({}): {}",
                output.status,
                if !stderr.is_empty() { stderr.trim().to_string() } else { "Unknown error".into() }
            );
        }

        let report = LighthouseReport::parse(&stdout)?;
        if let Some(requested) = report.requested_url.as_deref().filter(|r| *r != url) {
            log::debug!("[SCORER] Lighthouse normalized {} to {}", url, requested);
        }

        if let Some(err) = &report.runtime_error {
            anyhow::bail!("Lighthouse runtime error {}: {}", err.code, err.message);
        }

        Ok(report)
    }
}

#[async_trait]
impl Scorer for LighthouseScorer {
    async fn score(&self, url: &str, profile: DeviceProfile) -> Result<ScoreReport> {
        log::info!("[SCORER] Starting {} run: {}", profile, url);
        let start_time = std::time::Instant::now();

        let browser = ChromeInstance::launch(&self.chrome_path)
            .await
            .map_err(|e| AuditError::scoring(url, profile, format!("{:#}", e)))?;

        let outcome = self.run_lighthouse(url, profile, browser.port()).await;
        browser.close().await;

        let report = outcome
            .map_err(|e| AuditError::scoring(url, profile, format!("{:#}", e)))?
            .to_score_report();

        log::info!(
            "[SCORER] Complete {} - perf: {}, lcp: {:?}ms, cls: {:?}, took {:.2}ms",
            profile,
            report.scores.performance,
            report.metrics.lcp_ms,
            report.metrics.cls,
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        Ok(report)
    }

    fn name(&self) -> &'static str {
        "Lighthouse"
    }
}

// ============================================================================
// Lighthouse result (LHR) subset
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseReport {
    #[serde(default)]
    pub requested_url: Option<String>,
    #[serde(default)]
    runtime_error: Option<RuntimeError>,
    #[serde(default)]
    categories: HashMap<String, LighthouseCategory>,
    #[serde(default)]
    audits: HashMap<String, LighthouseAudit>,
}

#[derive(Debug, Deserialize)]
struct RuntimeError {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct LighthouseCategory {
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LighthouseAudit {
    numeric_value: Option<f64>,
}

impl LighthouseReport {
    pub fn parse(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse lighthouse output")
    }

    /// Missing category scores become 0; missing metrics stay `None`.
    pub fn to_score_report(&self) -> ScoreReport {
        ScoreReport {
            scores: CategoryScores {
                performance: self.category_score("performance"),
                accessibility: self.category_score("accessibility"),
                best_practices: self.category_score("best-practices"),
                seo: self.category_score("seo"),
            },
            metrics: Metrics {
                lcp_ms: self.metric("largest-contentful-paint"),
                cls: self.metric("cumulative-layout-shift"),
                tbt_ms: self.metric("total-blocking-time"),
                speed_index_ms: self.metric("speed-index"),
            },
        }
    }

    fn category_score(&self, key: &str) -> u8 {
        self.categories
            .get(key)
            .and_then(|c| c.score)
            .filter(|s| s.is_finite())
            .map(|s| (s * 100.0).round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0)
    }

    fn metric(&self, key: &str) -> Option<f64> {
        self.audits
            .get(key)
            .and_then(|a| a.numeric_value)
            .filter(|v| v.is_finite() && *v >= 0.0)
    }
}
