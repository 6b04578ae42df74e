//! Static HTML report.
//!
//! [`HtmlReport`] is a view model built from an [`AuditReport`]; all
//! formatting decisions live there so they can be tested without comparing
//! markup. [`HtmlReport::render`] only wraps the prepared strings in tags.

use std::fmt::Write;

use crate::domain::models::{AuditReport, Finding, PageRecord};

pub const NO_FINDINGS: &str = "No findings. Nice.";
const MISSING: &str = "-";

/// One table row (mobile scores and vitals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    pub url: String,
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
    pub lcp: String,
    pub cls: String,
}

impl PageRow {
    fn from_page(page: &PageRecord) -> Self {
        let mobile = &page.mobile;
        Self {
            url: page.url.clone(),
            performance: mobile.scores.performance,
            accessibility: mobile.scores.accessibility,
            best_practices: mobile.scores.best_practices,
            seo: mobile.scores.seo,
            lcp: mobile
                .metrics
                .lcp_ms
                .map(|v| format!("{}", v.round()))
                .unwrap_or_else(|| MISSING.to_string()),
            cls: mobile
                .metrics
                .cls
                .map(|v| format!("{:.3}", v))
                .unwrap_or_else(|| MISSING.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlReport {
    pub generated_at: String,
    pub rows: Vec<PageRow>,
    /// Flattened across pages; a single placeholder when there are none.
    pub findings: Vec<String>,
}

impl HtmlReport {
    pub fn from_report(report: &AuditReport) -> Self {
        let rows = report.pages.iter().map(PageRow::from_page).collect();

        let mut findings: Vec<String> = report
            .pages
            .iter()
            .flat_map(|page| page.findings.iter().map(move |f| finding_line(&page.url, f)))
            .collect();
        if findings.is_empty() {
            findings.push(NO_FINDINGS.to_string());
        }

        Self {
            generated_at: report.generated_at.to_rfc3339(),
            rows,
            findings,
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::with_capacity(4096);
        html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>GritAudit Report</title>\n");
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n<h1>GritAudit Report</h1>\n");
        let _ = writeln!(html, "<p class=\"meta\">Generated {}</p>", escape(&self.generated_at));

        html.push_str("<h2>Mobile scores</h2>\n<table>\n<thead><tr>");
        for header in ["URL", "Perf", "A11y", "Best", "SEO", "LCP (ms)", "CLS"] {
            let _ = write!(html, "<th>{}</th>", header);
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.rows {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&row.url),
                row.performance,
                row.accessibility,
                row.best_practices,
                row.seo,
                escape(&row.lcp),
                escape(&row.cls),
            );
        }
        html.push_str("</tbody>\n</table>\n");

        html.push_str("<h2>Findings</h2>\n<ul>\n");
        for item in &self.findings {
            let _ = writeln!(html, "<li>{}</li>", escape(item));
        }
        html.push_str("</ul>\n</body>\n</html>\n");
        html
    }
}

/// `[SEVERITY] url — type: recommendation`
pub fn finding_line(url: &str, finding: &Finding) -> String {
    format!(
        "[{}] {} \u{2014} {}: {}",
        finding.severity, url, finding.kind, finding.recommendation
    )
}

pub fn render_html(report: &AuditReport) -> String {
    HtmlReport::from_report(report).render()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "<style>
body { font-family: system-ui, sans-serif; margin: 2rem; color: #222; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 6px 8px; text-align: left; }
th { background: #f4f4f4; }
.meta { color: #666; }
</style>
";
