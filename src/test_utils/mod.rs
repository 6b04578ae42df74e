//! Shared fixtures and stub collaborators for unit and integration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::models::{DeviceProfile, ScanResult, ScoreReport};
use crate::error::{AuditError, Result};
use crate::service::scanner::PageScanner;
use crate::service::scorer::Scorer;

pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::domain::models::{
        AuditReport, CategoryScores, Finding, ImageRecord, Metrics, PageRecord, ScanResult,
        ScoreReport, Severity,
    };

    /// Score report with uniform category scores and the given vitals.
    pub fn score_report(score: u8, lcp_ms: Option<f64>, cls: Option<f64>) -> ScoreReport {
        ScoreReport {
            scores: CategoryScores {
                performance: score,
                accessibility: score,
                best_practices: score,
                seo: score,
            },
            metrics: Metrics {
                lcp_ms,
                cls,
                tbt_ms: Some(150.0),
                speed_index_ms: Some(3200.0),
            },
        }
    }

    pub fn storefront_scan() -> ScanResult {
        ScanResult {
            image_count: 2,
            missing_alt_count: 1,
            lazy_count: 1,
            has_search: true,
            has_add_to_cart: true,
            has_price: true,
            has_shipping_text: false,
            images: vec![
                ImageRecord {
                    src: "https://shop.example/boot.jpg".to_string(),
                    alt: Some("Trail boot".to_string()),
                    width: Some("800".to_string()),
                    height: Some("600".to_string()),
                    loading: Some("lazy".to_string()),
                },
                ImageRecord {
                    src: "https://shop.example/sole.jpg".to_string(),
                    alt: None,
                    width: None,
                    height: None,
                    loading: None,
                },
            ],
        }
    }

    /// Two-page report with findings on the first page only.
    pub fn sample_report() -> AuditReport {
        let generated_at = Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap();
        AuditReport::new(
            generated_at,
            vec![
                PageRecord {
                    url: "https://shop.example/".to_string(),
                    mobile: score_report(42, Some(4210.6), Some(0.125)),
                    desktop: score_report(88, Some(1300.0), Some(0.0)),
                    scan: storefront_scan(),
                    findings: vec![
                        Finding::new(Severity::High, "Performance", "Mobile LCP is 4211ms."),
                        Finding::new(Severity::Med, "UX-Layout", "Mobile CLS is 0.125."),
                        Finding::new(Severity::Low, "Trust-Conversion", "Add shipping copy."),
                    ],
                },
                PageRecord {
                    url: "https://shop.example/pages/about?ref=a&b=<c>".to_string(),
                    mobile: score_report(97, None, None),
                    desktop: score_report(99, None, None),
                    scan: ScanResult::default(),
                    findings: vec![],
                },
            ],
        )
    }
}

/// Scorer returning canned reports, optionally slow or failing per URL.
#[derive(Default)]
pub struct StubScorer {
    mobile: ScoreReport,
    desktop: ScoreReport,
    delays: HashMap<String, Duration>,
    failing: Option<(String, DeviceProfile)>,
    calls: Mutex<Vec<(String, DeviceProfile)>>,
}

impl StubScorer {
    pub fn new(mobile: ScoreReport, desktop: ScoreReport) -> Self {
        Self {
            mobile,
            desktop,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn failing_on(mut self, url: &str, profile: DeviceProfile) -> Self {
        self.failing = Some((url.to_string(), profile));
        self
    }

    pub fn calls(&self) -> Vec<(String, DeviceProfile)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scorer for StubScorer {
    async fn score(&self, url: &str, profile: DeviceProfile) -> Result<ScoreReport> {
        self.calls.lock().unwrap().push((url.to_string(), profile));
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if let Some((failing_url, failing_profile)) = &self.failing {
            if failing_url == url && *failing_profile == profile {
                return Err(AuditError::scoring(url, profile, "stubbed scoring failure"));
            }
        }
        Ok(match profile {
            DeviceProfile::Mobile => self.mobile,
            DeviceProfile::Desktop => self.desktop,
        })
    }

    fn name(&self) -> &'static str {
        "Stub"
    }
}

/// Scanner returning a canned scan per URL.
#[derive(Default)]
pub struct StubScanner {
    default_scan: ScanResult,
    scans: HashMap<String, ScanResult>,
    delays: HashMap<String, Duration>,
    failing_url: Option<String>,
}

impl StubScanner {
    pub fn new(default_scan: ScanResult) -> Self {
        Self {
            default_scan,
            ..Default::default()
        }
    }

    pub fn with_scan(mut self, url: &str, scan: ScanResult) -> Self {
        self.scans.insert(url.to_string(), scan);
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing_url = Some(url.to_string());
        self
    }
}

#[async_trait]
impl PageScanner for StubScanner {
    async fn scan(&self, url: &str) -> Result<ScanResult> {
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_url.as_deref() == Some(url) {
            return Err(AuditError::fetch(url, "stubbed connection reset"));
        }
        Ok(self
            .scans
            .get(url)
            .cloned()
            .unwrap_or_else(|| self.default_scan.clone()))
    }
}
