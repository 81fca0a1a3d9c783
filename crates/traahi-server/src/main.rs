mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use traahi_api::reminders::run_reminder_loop;
use traahi_api::router::build_router;
use traahi_api::{AppState, AppStateInner};
use traahi_db::Database;
use traahi_providers::http_client;
use traahi_providers::payment::{PaymentProvider, Razorpay};
use traahi_providers::sms::{SmsSender, Twilio};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traahi=debug,traahi_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    // Outbound providers share one client with a bounded timeout
    let http = http_client(config.gateway_timeout)?;
    if config.razorpay.key_id.is_empty() || config.razorpay.key_secret.is_empty() {
        warn!("Razorpay credentials missing; payment orders will fail");
    }
    let payments: Arc<dyn PaymentProvider> = Arc::new(Razorpay::new(
        http.clone(),
        &config.razorpay.api_url,
        &config.razorpay.key_id,
        &config.razorpay.key_secret,
    ));

    let shutdown = CancellationToken::new();

    let scheduler = match &config.twilio {
        Some(twilio) => {
            let sms: Arc<dyn SmsSender> = Arc::new(Twilio::new(
                http.clone(),
                &twilio.api_url,
                &twilio.account_sid,
                &twilio.auth_token,
                &twilio.from,
            ));
            info!("Reminder scheduler firing daily at {}", config.reminder_time);
            Some(tokio::spawn(run_reminder_loop(
                db.clone(),
                sms,
                config.reminder_time,
                shutdown.clone(),
            )))
        }
        None => {
            warn!("Twilio credentials missing; SMS reminders are disabled");
            None
        }
    };

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        token_ttl: config.token_ttl,
        payments,
        upload_dir: config.upload_dir.clone(),
        public_url: config.public_url.clone(),
    });

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Traahi backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    if let Some(handle) = scheduler {
        shutdown.cancel();
        handle.await.ok();
    }

    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    token.cancel();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
    token.cancel();
}
