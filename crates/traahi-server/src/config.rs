use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveTime;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub upload_dir: PathBuf,
    pub public_url: Option<String>,
    pub reminder_time: NaiveTime,
    pub gateway_timeout: Duration,
    pub razorpay: RazorpayConfig,
    pub twilio: Option<TwilioConfig>,
}

pub struct RazorpayConfig {
    pub api_url: String,
    pub key_id: String,
    pub key_secret: String,
}

pub struct TwilioConfig {
    pub api_url: String,
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup so tests don't have to touch the process env.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = get("TRAAHI_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("TRAAHI_JWT_SECRET is unset or still a placeholder");
        }

        let port: u16 = var("TRAAHI_PORT", "3000")
            .parse()
            .context("TRAAHI_PORT must be a port number")?;
        let token_ttl: u64 = var("TRAAHI_TOKEN_TTL_SECS", "3600")
            .parse()
            .context("TRAAHI_TOKEN_TTL_SECS must be a number of seconds")?;
        let gateway_timeout: u64 = var("TRAAHI_GATEWAY_TIMEOUT_SECS", "15")
            .parse()
            .context("TRAAHI_GATEWAY_TIMEOUT_SECS must be a number of seconds")?;
        let reminder_time = NaiveTime::parse_from_str(&var("TRAAHI_REMINDER_TIME", "09:00"), "%H:%M")
            .context("TRAAHI_REMINDER_TIME must be HH:MM")?;

        let twilio = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from))
                if !account_sid.is_empty() && !auth_token.is_empty() && !from.is_empty() =>
            {
                Some(TwilioConfig {
                    api_url: var("TWILIO_API_URL", "https://api.twilio.com/2010-04-01"),
                    account_sid,
                    auth_token,
                    from,
                })
            }
            _ => None,
        };

        Ok(Self {
            host: var("TRAAHI_HOST", "0.0.0.0"),
            port,
            db_path: var("TRAAHI_DB_PATH", "traahi.db").into(),
            jwt_secret,
            token_ttl: Duration::from_secs(token_ttl),
            upload_dir: var("TRAAHI_UPLOAD_DIR", "./uploads").into(),
            public_url: get("TRAAHI_PUBLIC_URL").filter(|u| !u.is_empty()),
            reminder_time,
            gateway_timeout: Duration::from_secs(gateway_timeout),
            razorpay: RazorpayConfig {
                api_url: var("RAZORPAY_API_URL", "https://api.razorpay.com/v1"),
                key_id: var("RAZORPAY_KEY_ID", ""),
                key_secret: var("RAZORPAY_KEY_SECRET", ""),
            },
            twilio,
        })
    }
}
