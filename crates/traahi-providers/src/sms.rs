use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{ProviderError, rejected};

#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send one text message. `to` must be in E.164 form, e.g. `+919876543210`.
    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError>;
}

/// Twilio Programmable Messaging client.
pub struct Twilio {
    http: reqwest::Client,
    api_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

#[derive(Deserialize)]
struct MessageCreated {
    sid: String,
}

impl Twilio {
    pub fn new(
        http: reqwest::Client,
        api_url: &str,
        account_sid: &str,
        auth_token: &str,
        from: &str,
    ) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from: from.to_string(),
        }
    }
}

#[async_trait]
impl SmsSender for Twilio {
    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        let url = format!("{}/Accounts/{}/Messages.json", self.api_url, self.account_sid);
        let response = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from.as_str()), ("Body", body)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let created: MessageCreated = response.json().await?;
        debug!("Twilio accepted message {}", created.sid);
        Ok(())
    }
}
