use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ProviderError, rejected};

/// Every order is placed in this currency.
pub const CURRENCY: &str = "INR";

/// Largest single donation accepted, in major units.
pub const MAX_AMOUNT: f64 = 10_000_000.0;

/// Order as sent to the provider. `amount` is in minor units (paise).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

impl NewOrder {
    /// Convert a donation in major units into a provider order.
    pub fn from_major_units(amount: f64, receipt_millis: i64) -> Result<Self, ProviderError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ProviderError::InvalidRequest(format!(
                "amount must be a positive number, got {amount}"
            )));
        }
        if amount > MAX_AMOUNT {
            return Err(ProviderError::InvalidRequest(format!(
                "amount must not exceed {MAX_AMOUNT}, got {amount}"
            )));
        }
        let paise = (amount * 100.0).round() as i64;
        if paise < 1 {
            return Err(ProviderError::InvalidRequest(format!(
                "amount is below the smallest unit, got {amount}"
            )));
        }
        Ok(Self {
            amount: paise,
            currency: CURRENCY.to_string(),
            receipt: format!("receipt_order_{receipt_millis}"),
        })
    }
}

/// Order as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_order(&self, order: &NewOrder) -> Result<PaymentOrder, ProviderError>;
}

/// Razorpay Orders API client.
pub struct Razorpay {
    http: reqwest::Client,
    api_url: String,
    key_id: String,
    key_secret: String,
}

impl Razorpay {
    pub fn new(http: reqwest::Client, api_url: &str, key_id: &str, key_secret: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
        }
    }
}

#[async_trait]
impl PaymentProvider for Razorpay {
    async fn create_order(&self, order: &NewOrder) -> Result<PaymentOrder, ProviderError> {
        if self.key_id.is_empty() || self.key_secret.is_empty() {
            return Err(ProviderError::NotConfigured("Razorpay"));
        }

        let response = self
            .http
            .post(format!("{}/orders", self.api_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(order)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let created: PaymentOrder = response.json().await?;
        debug!("Created payment order {} for {} {}", created.id, created.amount, created.currency);
        Ok(created)
    }
}
