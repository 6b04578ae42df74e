use crate::domain::models::AuditReport;
use crate::error::Result;

/// Pretty-printed report. Key order follows the struct field order.
pub fn render_json(report: &AuditReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn parse_json(json: &str) -> Result<AuditReport> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::sample_report;

    #[test]
    fn report_round_trips() {
        let report = sample_report();
        let parsed = parse_json(&render_json(&report).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn long_mantissa_metrics_round_trip_exactly() {
        let mut report = sample_report();
        let template = report.pages[0].clone();
        report.pages.clear();

        // xorshift64, fixed seed
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 53) as f64
        };

        for _ in 0..2000 {
            let mut page = template.clone();
            page.mobile.metrics.lcp_ms = Some(next() * 20000.0);
            page.mobile.metrics.cls = Some(next());
            page.mobile.metrics.tbt_ms = Some(next() * 5000.0);
            page.desktop.metrics.speed_index_ms = Some(next() * 20000.0);
            report.pages.push(page);
        }
        report.pages[0].mobile.metrics.lcp_ms = Some(11801.793343883843);

        let parsed = parse_json(&render_json(&report).unwrap()).unwrap();
        assert_eq!(parsed.pages[0].mobile.metrics.lcp_ms, Some(11801.793343883843));
        assert_eq!(parsed, report);
    }

    #[test]
    fn uses_artifact_key_names() {
        let json = render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["generatedAt"], "2026-10-19T06:00:00Z");
        let page = &value["pages"][0];
        assert_eq!(page["mobile"]["scores"]["bestPractices"], 42);
        assert_eq!(page["mobile"]["metrics"]["lcp_ms"], 4210.6);
        assert_eq!(page["mobile"]["metrics"]["speedIndex_ms"], 3200.0);
        assert_eq!(page["scan"]["missingAltCount"], 1);
        assert_eq!(page["scan"]["hasAddToCart"], true);
        assert!(page["scan"]["images"][1]["alt"].is_null());
        assert_eq!(page["findings"][0]["severity"], "HIGH");
        assert_eq!(page["findings"][0]["type"], "Performance");
        assert!(value["pages"][1]["mobile"]["metrics"]["lcp_ms"].is_null());
    }

    #[test]
    fn top_level_keys_are_stable() {
        let json = render_json(&sample_report()).unwrap();
        let generated = json.find("\"generatedAt\"").unwrap();
        let pages = json.find("\"pages\"").unwrap();
        assert!(generated < pages);
    }
}
