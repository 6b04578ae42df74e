//! Findings engine - fixed threshold rules over one page's mobile score and scan.
//!
//! Rules run in table order and each fires at most once. The output keeps
//! that order; it is not re-sorted by severity.

use crate::domain::models::{Finding, ScanResult, ScoreReport, Severity};

// Thresholds
const LCP_LIMIT_MS: f64 = 3500.0;
const LCP_TARGET_MS: u32 = 2500;
const CLS_LIMIT: f64 = 0.1;
const MANY_IMAGES: usize = 25;
const MIN_LAZY_RATIO: f64 = 0.5;

const TRUST_RECOMMENDATION: &str = "Add shipping, returns and guarantee copy near the \
     add-to-cart button to reduce purchase hesitation.";

/// One threshold rule.
pub struct Rule {
    pub id: &'static str,
    pub evaluate: fn(&ScoreReport, &ScanResult) -> Option<Finding>,
}

/// Evaluation order is significant.
pub const RULES: [Rule; 5] = [
    Rule { id: "slow-lcp", evaluate: slow_lcp },
    Rule { id: "layout-shift", evaluate: layout_shift },
    Rule { id: "missing-alt", evaluate: missing_alt },
    Rule { id: "eager-images", evaluate: eager_images },
    Rule { id: "missing-trust-copy", evaluate: missing_trust_copy },
];

/// Derive the ordered findings for one page.
pub fn derive_findings(mobile: &ScoreReport, scan: &ScanResult) -> Vec<Finding> {
    RULES
        .iter()
        .filter_map(|rule| (rule.evaluate)(mobile, scan))
        .collect()
}

fn slow_lcp(mobile: &ScoreReport, _scan: &ScanResult) -> Option<Finding> {
    let lcp = mobile.metrics.lcp_ms.filter(|lcp| *lcp > LCP_LIMIT_MS)?;
    Some(Finding::new(
        Severity::High,
        "Performance",
        format!(
            "Mobile LCP is {}ms; target is under {}ms. Compress and preload the hero image \
             and defer non-critical scripts.",
            lcp.round(),
            LCP_TARGET_MS
        ),
    ))
}

fn layout_shift(mobile: &ScoreReport, _scan: &ScanResult) -> Option<Finding> {
    let cls = mobile.metrics.cls.filter(|cls| *cls > CLS_LIMIT)?;
    Some(Finding::new(
        Severity::Med,
        "UX-Layout",
        format!(
            "Mobile CLS is {:.3}; target is 0.10 or lower. Reserve space for images, \
             banners and embeds with explicit dimensions.",
            cls
        ),
    ))
}

fn missing_alt(_mobile: &ScoreReport, scan: &ScanResult) -> Option<Finding> {
    if scan.missing_alt_count == 0 {
        return None;
    }
    Some(Finding::new(
        Severity::Med,
        "Accessibility-SEO",
        format!(
            "{} images are missing alt text. Describe each product image in its alt attribute.",
            scan.missing_alt_count
        ),
    ))
}

fn eager_images(_mobile: &ScoreReport, scan: &ScanResult) -> Option<Finding> {
    let min_lazy = (scan.image_count as f64 * MIN_LAZY_RATIO).floor() as usize;
    if scan.image_count <= MANY_IMAGES || scan.lazy_count >= min_lazy {
        return None;
    }
    Some(Finding::new(
        Severity::Med,
        "Images",
        format!(
            "Only {} of {} images use loading=\"lazy\". Lazy-load images below the fold.",
            scan.lazy_count, scan.image_count
        ),
    ))
}

fn missing_trust_copy(_mobile: &ScoreReport, scan: &ScanResult) -> Option<Finding> {
    if !scan.has_add_to_cart || scan.has_shipping_text {
        return None;
    }
    Some(Finding::new(
        Severity::Low,
        "Trust-Conversion",
        TRUST_RECOMMENDATION,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Metrics;

    fn mobile(lcp_ms: Option<f64>, cls: Option<f64>) -> ScoreReport {
        ScoreReport {
            metrics: Metrics { lcp_ms, cls, ..Default::default() },
            ..Default::default()
        }
    }

    fn scan(image_count: usize, missing_alt_count: usize, lazy_count: usize) -> ScanResult {
        ScanResult { image_count, missing_alt_count, lazy_count, ..Default::default() }
    }

    fn kinds(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.kind.as_str()).collect()
    }

    #[test]
    fn all_rules_fire_in_table_order() {
        let mut scan = scan(30, 4, 2);
        scan.has_add_to_cart = true;
        scan.has_shipping_text = false;

        let findings = derive_findings(&mobile(Some(5200.4), Some(0.25)), &scan);

        let severities: Vec<Severity> = findings.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::High, Severity::Med, Severity::Med, Severity::Med, Severity::Low]
        );
        assert_eq!(
            kinds(&findings),
            vec!["Performance", "UX-Layout", "Accessibility-SEO", "Images", "Trust-Conversion"]
        );
    }

    #[test]
    fn quiet_page_has_no_findings() {
        let findings = derive_findings(&mobile(Some(1000.0), Some(0.01)), &scan(0, 0, 0));
        assert!(findings.is_empty());
    }

    #[test]
    fn lcp_threshold_is_exclusive() {
        assert!(derive_findings(&mobile(Some(3500.0), None), &scan(0, 0, 0)).is_empty());

        let findings = derive_findings(&mobile(Some(3501.0), None), &scan(0, 0, 0));
        assert_eq!(kinds(&findings), vec!["Performance"]);
        assert!(findings[0].recommendation.contains("3501ms"));
        assert!(findings[0].recommendation.contains("2500ms"));
    }

    #[test]
    fn cls_threshold_is_exclusive() {
        assert!(derive_findings(&mobile(None, Some(0.1)), &scan(0, 0, 0)).is_empty());

        let findings = derive_findings(&mobile(None, Some(0.1001)), &scan(0, 0, 0));
        assert_eq!(kinds(&findings), vec!["UX-Layout"]);
        assert!(findings[0].recommendation.contains("0.100"));
        assert!(findings[0].recommendation.contains("0.10 or lower"));
    }

    #[test]
    fn unmeasured_metrics_never_fire() {
        assert!(derive_findings(&mobile(None, None), &scan(0, 0, 0)).is_empty());
    }

    #[test]
    fn lazy_ratio_boundary() {
        let findings = derive_findings(&mobile(None, None), &scan(26, 0, 12));
        assert_eq!(kinds(&findings), vec!["Images"]);
        assert!(findings[0].recommendation.contains("12 of 26"));

        assert!(derive_findings(&mobile(None, None), &scan(26, 0, 13)).is_empty());
    }

    #[test]
    fn small_galleries_are_not_flagged() {
        assert!(derive_findings(&mobile(None, None), &scan(25, 0, 0)).is_empty());
    }

    #[test]
    fn missing_alt_reports_count() {
        let findings = derive_findings(&mobile(None, None), &scan(3, 2, 0));
        assert_eq!(findings[0].severity, Severity::Med);
        assert!(findings[0].recommendation.starts_with("2 images"));
    }

    #[test]
    fn trust_copy_only_matters_with_a_cart() {
        let mut page = scan(0, 0, 0);
        page.has_add_to_cart = true;
        page.has_shipping_text = true;
        assert!(derive_findings(&mobile(None, None), &page).is_empty());

        page.has_shipping_text = false;
        let findings = derive_findings(&mobile(None, None), &page);
        assert_eq!(findings, vec![Finding::new(Severity::Low, "Trust-Conversion", TRUST_RECOMMENDATION)]);
    }

    #[test]
    fn derivation_is_deterministic() {
        let mut page = scan(40, 5, 1);
        page.has_add_to_cart = true;
        let report = mobile(Some(4000.0), Some(0.3));

        let first = derive_findings(&report, &page);
        let _ = derive_findings(&mobile(None, None), &scan(0, 0, 0));
        let second = derive_findings(&report, &page);
        assert_eq!(first, second);
    }

    #[test]
    fn rule_ids_are_unique() {
        let mut ids: Vec<&str> = RULES.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), RULES.len());
    }
}
