//! Audit data model - scores, scan signals, findings and the report root.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Images kept in a scan result; counts always cover the full page.
pub const MAX_RECORDED_IMAGES: usize = 40;

// ====== Enums ======

/// Emulation mode used while scoring a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    Mobile,
    Desktop,
}

impl DeviceProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceProfile::Mobile => "mobile",
            DeviceProfile::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MED")]
    Med,
    #[serde(rename = "LOW")]
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Med => "MED",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ====== Scores ======

/// Category scores, each an integer 0-100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
}

/// Lab metrics. `None` means unmeasured; zero is a real measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub lcp_ms: Option<f64>,
    pub cls: Option<f64>,
    pub tbt_ms: Option<f64>,
    #[serde(rename = "speedIndex_ms")]
    pub speed_index_ms: Option<f64>,
}

/// Normalized output of one scorer call for a (URL, profile) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub scores: CategoryScores,
    pub metrics: Metrics,
}

// ====== Scan ======

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub loading: Option<String>,
}

impl ImageRecord {
    pub fn is_missing_alt(&self) -> bool {
        self.alt.as_deref().map(|a| a.trim().is_empty()).unwrap_or(true)
    }

    pub fn is_lazy(&self) -> bool {
        self.loading
            .as_deref()
            .map(|l| l.to_lowercase() == "lazy")
            .unwrap_or(false)
    }
}

/// Structural signals scraped from one page's HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub image_count: usize,
    pub missing_alt_count: usize,
    pub lazy_count: usize,
    pub has_search: bool,
    pub has_add_to_cart: bool,
    pub has_price: bool,
    pub has_shipping_text: bool,
    pub images: Vec<ImageRecord>,
}

// ====== Findings ======

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: String,
    pub recommendation: String,
}

impl Finding {
    pub fn new(severity: Severity, kind: &str, recommendation: impl Into<String>) -> Self {
        Self {
            severity,
            kind: kind.to_string(),
            recommendation: recommendation.into(),
        }
    }

    /// `[SEVERITY] type`, as pushed to the summary sheet.
    pub fn label(&self) -> String {
        format!("[{}] {}", self.severity, self.kind)
    }
}

// ====== Report ======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub mobile: ScoreReport,
    pub desktop: ScoreReport,
    pub scan: ScanResult,
    pub findings: Vec<Finding>,
}

/// Root artifact of one run. Pages keep the configured URL order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub pages: Vec<PageRecord>,
}

impl AuditReport {
    pub fn new(generated_at: DateTime<Utc>, pages: Vec<PageRecord>) -> Self {
        Self { generated_at, pages }
    }

    pub fn finding_count(&self) -> usize {
        self.pages.iter().map(|p| p.findings.len()).sum()
    }
}

/// One flattened row per page for the spreadsheet webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub date: String,
    pub url: String,
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
    #[serde(rename = "lcp_ms")]
    pub lcp_ms: Option<f64>,
    pub cls: Option<f64>,
    pub top_findings: String,
}

impl SummaryRow {
    const TOP_FINDINGS: usize = 2;

    pub fn from_page(page: &PageRecord, generated_at: &DateTime<Utc>) -> Self {
        let mobile = &page.mobile;
        let top_findings = page
            .findings
            .iter()
            .take(Self::TOP_FINDINGS)
            .map(Finding::label)
            .collect::<Vec<_>>()
            .join(" | ");

        Self {
            date: generated_at.format("%Y-%m-%d").to_string(),
            url: page.url.clone(),
            performance: mobile.scores.performance,
            accessibility: mobile.scores.accessibility,
            best_practices: mobile.scores.best_practices,
            seo: mobile.scores.seo,
            lcp_ms: mobile.metrics.lcp_ms,
            cls: mobile.metrics.cls,
            top_findings,
        }
    }
}

/// Webhook body: `{"rows": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub rows: Vec<SummaryRow>,
}

impl SummaryPayload {
    pub fn from_report(report: &AuditReport) -> Self {
        Self {
            rows: report
                .pages
                .iter()
                .map(|p| SummaryRow::from_page(p, &report.generated_at))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page_with_findings(findings: Vec<Finding>) -> PageRecord {
        PageRecord {
            url: "https://shop.example/".to_string(),
            mobile: ScoreReport {
                scores: CategoryScores { performance: 41, accessibility: 88, best_practices: 92, seo: 100 },
                metrics: Metrics { lcp_ms: Some(4100.0), cls: Some(0.02), tbt_ms: None, speed_index_ms: None },
            },
            desktop: ScoreReport::default(),
            scan: ScanResult::default(),
            findings,
        }
    }

    #[test]
    fn image_record_alt_and_loading_rules() {
        let img = ImageRecord { src: "a.jpg".into(), alt: Some("   ".into()), width: None, height: None, loading: Some("LAZY".into()) };
        assert!(img.is_missing_alt());
        assert!(img.is_lazy());

        let img = ImageRecord { src: "b.jpg".into(), alt: Some("Boots".into()), width: None, height: None, loading: Some("eager".into()) };
        assert!(!img.is_missing_alt());
        assert!(!img.is_lazy());
    }

    #[test]
    fn summary_row_keeps_first_two_findings() {
        let generated_at = Utc.with_ymd_and_hms(2026, 10, 19, 6, 30, 0).unwrap();
        let page = page_with_findings(vec![
            Finding::new(Severity::High, "Performance", "a"),
            Finding::new(Severity::Med, "UX-Layout", "b"),
            Finding::new(Severity::Low, "Trust-Conversion", "c"),
        ]);

        let row = SummaryRow::from_page(&page, &generated_at);
        assert_eq!(row.date, "2026-10-19");
        assert_eq!(row.performance, 41);
        assert_eq!(row.lcp_ms, Some(4100.0));
        assert_eq!(row.top_findings, "[HIGH] Performance | [MED] UX-Layout");
    }

    #[test]
    fn summary_row_serializes_sheet_keys() {
        let generated_at = Utc.with_ymd_and_hms(2026, 10, 19, 6, 30, 0).unwrap();
        let row = SummaryRow::from_page(&page_with_findings(vec![]), &generated_at);
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(value["bestPractices"], 92);
        assert_eq!(value["lcp_ms"], 4100.0);
        assert_eq!(value["topFindings"], "");
    }

    #[test]
    fn metrics_use_snake_case_sheet_names() {
        let metrics = Metrics { lcp_ms: Some(1.0), cls: None, tbt_ms: Some(0.0), speed_index_ms: Some(2.0) };
        let value = serde_json::to_value(metrics).unwrap();
        assert_eq!(value["speedIndex_ms"], 2.0);
        assert_eq!(value["tbt_ms"], 0.0);
        assert!(value["cls"].is_null());
    }
}
