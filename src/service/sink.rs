//! Best-effort sinks for the per-page summary rows.
//!
//! A sink reports success or failure to [`publish`], which logs failures and
//! never hands them back to the run.

use async_trait::async_trait;
use rquest::Client;

use crate::domain::models::{AuditReport, SummaryPayload};
use crate::error::{AuditError, Result};
use crate::service::http::{create_client, ClientType};

#[async_trait]
pub trait BestEffortSink: Send + Sync {
    async fn deliver(&self, payload: &SummaryPayload) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// POSTs `{"rows": [...]}` as JSON to a spreadsheet webhook.
pub struct WebhookSink {
    client: Client,
    endpoint: String,
}

impl WebhookSink {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(create_client(ClientType::Standard)?, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl BestEffortSink for WebhookSink {
    async fn deliver(&self, payload: &SummaryPayload) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|e| AuditError::webhook(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::webhook(format!("endpoint returned HTTP {}", status)));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

/// Push one summary row per page. Returns whether delivery succeeded.
pub async fn publish(sink: &dyn BestEffortSink, report: &AuditReport) -> bool {
    let payload = SummaryPayload::from_report(report);
    match sink.deliver(&payload).await {
        Ok(()) => {
            log::info!("[WEBHOOK] Pushed {} rows to {}", payload.rows.len(), sink.name());
            true
        }
        Err(e) => {
            log::warn!("[WEBHOOK] Push to {} failed: {}", sink.name(), e);
            false
        }
    }
}
