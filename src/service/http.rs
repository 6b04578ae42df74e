use anyhow::{Context, Result};
use rquest::Client;
use rquest_util::Emulation;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub enum ClientType {
    /// Plain client for API calls such as the summary webhook.
    Standard,
    /// Browser-impersonating client for fetching storefront HTML.
    HeavyEmulation,
}

/// Factory for creating an HTTP client based on the desired level of stealth/performance.
pub fn create_client(client_type: ClientType) -> Result<Client> {
    let builder = Client::builder().timeout(REQUEST_TIMEOUT);

    match client_type {
        ClientType::HeavyEmulation => builder
            .emulation(Emulation::Firefox136)
            .build()
            .context("Failed to build heavy impersonated rquest client"),
        ClientType::Standard => builder
            .build()
            .context("Failed to build standard rquest client"),
    }
}
