//! Page scanner - fetches a page's HTML and extracts structural signals.

use async_trait::async_trait;
use rquest::Client;

use crate::domain::models::ScanResult;
use crate::error::{AuditError, Result};
use crate::extractor::PageExtractor;
use crate::service::http::{create_client, ClientType};

#[async_trait]
pub trait PageScanner: Send + Sync {
    /// Fetch `url` and scan whatever body comes back.
    async fn scan(&self, url: &str) -> Result<ScanResult>;
}

/// Scanner using direct HTTP fetching.
///
/// Non-2xx responses are still scanned; only network-level failures are errors.
pub struct HttpPageScanner {
    client: Client,
}

impl HttpPageScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_client(ClientType::HeavyEmulation)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AuditError::fetch(url, e.to_string()))?;

        let status_code = response.status().as_u16();
        if status_code >= 400 {
            log::warn!("[SCAN] {} returned HTTP {}, scanning body anyway", url, status_code);
        }

        response
            .text()
            .await
            .map_err(|e| AuditError::fetch(url, e.to_string()))
    }
}

#[async_trait]
impl PageScanner for HttpPageScanner {
    async fn scan(&self, url: &str) -> Result<ScanResult> {
        log::info!("[SCAN] Starting scan: {}", url);
        let start_time = std::time::Instant::now();

        let html = self.fetch_html(url).await?;
        let content_size = html.len();
        let scan = PageExtractor::scan_html(&html);

        log::info!(
            "[SCAN] Complete - size: {} bytes, images: {} ({} missing alt, {} lazy), took {:.2}ms",
            content_size,
            scan.image_count,
            scan.missing_alt_count,
            scan.lazy_count,
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> HttpPageScanner {
        HttpPageScanner::with_client(create_client(ClientType::Standard).unwrap())
    }

    #[tokio::test]
    async fn scans_fetched_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/boot")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(
                r#"<html><body>
                    <img src="/boot.jpg" alt="Trail boot" loading="lazy">
                    <img src="/sole.jpg">
                    <p>$189.00 - free shipping</p>
                </body></html>"#,
            )
            .create_async()
            .await;

        let url = format!("{}/products/boot", server.url());
        let scan = scanner().scan(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(scan.image_count, 2);
        assert_eq!(scan.missing_alt_count, 1);
        assert_eq!(scan.lazy_count, 1);
        assert!(scan.has_price);
        assert!(scan.has_shipping_text);
    }

    #[tokio::test]
    async fn error_status_is_still_scanned() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone")
            .with_status(404)
            .with_body(r#"<html><body><img src="/404.png"><input type="search"></body></html>"#)
            .create_async()
            .await;

        let url = format!("{}/gone", server.url());
        let scan = scanner().scan(&url).await.unwrap();

        assert_eq!(scan.image_count, 1);
        assert!(scan.has_search);
    }

    #[tokio::test]
    async fn network_failure_is_a_fetch_error() {
        // Port 9 (discard) is closed on test hosts.
        let err = scanner().scan("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, AuditError::Fetch { ref url, .. } if url == "http://127.0.0.1:9/"));
    }
}
