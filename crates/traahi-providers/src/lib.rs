//! Outbound collaborators: the payment-order provider and the SMS gateway.
//! Both are traits so the API and the reminder job can be driven by fakes.

pub mod payment;
pub mod sms;

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} credentials are not configured")]
    NotConfigured(&'static str),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Shared HTTP client with a bounded per-request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

async fn rejected(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Rejected { status, body }
}
