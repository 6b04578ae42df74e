//! ReportAssembler - runs the scorers and scanner per page and builds the report.
//!
//! Pages are processed one after another. Within a page the mobile score,
//! desktop score and scan run concurrently and are awaited together.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::config::AuditConfig;
use crate::domain::models::{AuditReport, DeviceProfile, PageRecord, ScanResult, ScoreReport};
use crate::error::{AuditError, Result};
use crate::service::findings::derive_findings;
use crate::service::scanner::PageScanner;
use crate::service::scorer::Scorer;

pub struct ReportAssembler {
    scorer: Arc<dyn Scorer>,
    scanner: Arc<dyn PageScanner>,
    pages: Vec<String>,
    page_timeout: Option<Duration>,
}

impl ReportAssembler {
    pub fn new(
        scorer: Arc<dyn Scorer>,
        scanner: Arc<dyn PageScanner>,
        pages: Vec<String>,
    ) -> Self {
        Self {
            scorer,
            scanner,
            pages,
            page_timeout: None,
        }
    }

    pub fn from_config(
        config: &AuditConfig,
        scorer: Arc<dyn Scorer>,
        scanner: Arc<dyn PageScanner>,
    ) -> Self {
        Self::new(scorer, scanner, config.pages.clone()).with_page_timeout(config.page_timeout)
    }

    pub fn with_page_timeout(mut self, page_timeout: Option<Duration>) -> Self {
        self.page_timeout = page_timeout;
        self
    }

    /// Audit every configured page in order. The first page failure aborts the run.
    pub async fn assemble(&self) -> Result<AuditReport> {
        log::info!(
            "[REPORT] Auditing {} pages with {}",
            self.pages.len(),
            self.scorer.name()
        );

        let mut pages = Vec::with_capacity(self.pages.len());
        for (idx, url) in self.pages.iter().enumerate() {
            log::info!("[REPORT] Page {}/{}: {}", idx + 1, self.pages.len(), url);
            let page = self.audit_page(url).await.inspect_err(|e| {
                log::error!("[REPORT] Aborting run at {}: {}", url, e);
            })?;
            pages.push(page);
        }

        let report = AuditReport::new(Utc::now(), pages);
        log::info!(
            "[REPORT] Assembled {} pages with {} findings",
            report.pages.len(),
            report.finding_count()
        );
        Ok(report)
    }

    /// Score (mobile + desktop) and scan one page, then derive its findings.
    #[tracing::instrument(name = "page", skip(self))]
    pub async fn audit_page(&self, url: &str) -> Result<PageRecord> {
        let start_time = std::time::Instant::now();

        let (mobile, desktop, scan) = match self.page_timeout {
            Some(limit) => tokio::time::timeout(limit, self.collect(url))
                .await
                .map_err(|_| AuditError::Timeout {
                    url: url.to_string(),
                    secs: limit.as_secs(),
                })??,
            None => self.collect(url).await?,
        };

        let findings = derive_findings(&mobile, &scan);

        log::info!(
            "[REPORT] {} done in {}ms - mobile perf {}, desktop perf {}, {} findings",
            url,
            start_time.elapsed().as_millis(),
            mobile.scores.performance,
            desktop.scores.performance,
            findings.len()
        );

        Ok(PageRecord {
            url: url.to_string(),
            mobile,
            desktop,
            scan,
            findings,
        })
    }

    /// Run all three calls to completion, then surface the first failure.
    async fn collect(&self, url: &str) -> Result<(ScoreReport, ScoreReport, ScanResult)> {
        let (mobile, desktop, scan) = tokio::join!(
            self.scorer.score(url, DeviceProfile::Mobile),
            self.scorer.score(url, DeviceProfile::Desktop),
            self.scanner.scan(url),
        );
        Ok((mobile?, desktop?, scan?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Severity;
    use crate::test_utils::fixtures::{score_report, storefront_scan};
    use crate::test_utils::{StubScanner, StubScorer};

    const HOME: &str = "https://shop.example/";
    const PRODUCT: &str = "https://shop.example/products/boot";
    const CART: &str = "https://shop.example/cart";

    fn assembler(scorer: StubScorer, scanner: StubScanner, pages: &[&str]) -> ReportAssembler {
        ReportAssembler::new(
            Arc::new(scorer),
            Arc::new(scanner),
            pages.iter().map(|p| p.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn pages_follow_configured_order_despite_latency() {
        let scorer = StubScorer::new(score_report(50, None, None), score_report(90, None, None))
            .with_delay(HOME, Duration::from_millis(60))
            .with_delay(CART, Duration::from_millis(5));
        let scanner = StubScanner::new(storefront_scan()).with_delay(PRODUCT, Duration::from_millis(30));

        let report = assembler(scorer, scanner, &[HOME, PRODUCT, CART])
            .assemble()
            .await
            .unwrap();

        let urls: Vec<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec![HOME, PRODUCT, CART]);
    }

    #[tokio::test]
    async fn findings_come_from_the_mobile_report() {
        let scorer = StubScorer::new(
            score_report(30, Some(6000.0), Some(0.02)),
            score_report(95, Some(900.0), Some(0.5)),
        );
        let scanner = StubScanner::new(Default::default());

        let page = assembler(scorer, scanner, &[HOME]).audit_page(HOME).await.unwrap();

        assert_eq!(page.mobile.scores.performance, 30);
        assert_eq!(page.desktop.scores.performance, 95);
        assert_eq!(page.findings.len(), 1);
        assert_eq!(page.findings[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn each_page_keeps_its_own_scan() {
        let scorer = StubScorer::new(score_report(90, None, None), score_report(90, None, None));
        let scanner = StubScanner::new(Default::default()).with_scan(PRODUCT, storefront_scan());

        let report = assembler(scorer, scanner, &[HOME, PRODUCT])
            .assemble()
            .await
            .unwrap();

        assert_eq!(report.pages[0].scan, ScanResult::default());
        assert!(report.pages[0].findings.is_empty());
        assert_eq!(report.pages[1].scan, storefront_scan());
        let kinds: Vec<&str> = report.pages[1].findings.iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Accessibility-SEO", "Trust-Conversion"]);
    }

    #[tokio::test]
    async fn each_page_scores_both_profiles() {
        let scorer = Arc::new(StubScorer::new(Default::default(), Default::default()));
        let scanner = Arc::new(StubScanner::new(Default::default()));
        let assembler = ReportAssembler::new(
            scorer.clone(),
            scanner,
            vec![HOME.to_string(), CART.to_string()],
        );

        assembler.assemble().await.unwrap();

        let mut calls = scorer.calls();
        calls.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.as_str().cmp(b.1.as_str())));
        assert_eq!(
            calls,
            vec![
                (HOME.to_string(), DeviceProfile::Desktop),
                (HOME.to_string(), DeviceProfile::Mobile),
                (CART.to_string(), DeviceProfile::Desktop),
                (CART.to_string(), DeviceProfile::Mobile),
            ]
        );
    }

    #[tokio::test]
    async fn scoring_failure_aborts_remaining_pages() {
        let scorer = Arc::new(
            StubScorer::new(Default::default(), Default::default())
                .failing_on(PRODUCT, DeviceProfile::Desktop),
        );
        let assembler = ReportAssembler::new(
            scorer.clone(),
            Arc::new(StubScanner::new(Default::default())),
            vec![HOME.to_string(), PRODUCT.to_string(), CART.to_string()],
        );

        let err = assembler.assemble().await.unwrap_err();

        assert!(matches!(err, AuditError::Scoring { ref url, .. } if url == PRODUCT));
        assert!(scorer.calls().iter().all(|(url, _)| url != CART));
    }

    #[tokio::test]
    async fn scan_failure_fails_the_page() {
        let scorer = StubScorer::new(Default::default(), Default::default());
        let scanner = StubScanner::new(Default::default()).failing_on(HOME);

        let err = assembler(scorer, scanner, &[HOME]).assemble().await.unwrap_err();
        assert!(matches!(err, AuditError::Fetch { .. }));
    }

    #[tokio::test]
    async fn page_timeout_aborts_slow_page() {
        let scorer = StubScorer::new(Default::default(), Default::default())
            .with_delay(HOME, Duration::from_secs(5));
        let assembler = assembler(scorer, StubScanner::new(Default::default()), &[HOME])
            .with_page_timeout(Some(Duration::from_millis(20)));

        let err = assembler.assemble().await.unwrap_err();
        assert!(matches!(err, AuditError::Timeout { ref url, .. } if url == HOME));
    }
}
