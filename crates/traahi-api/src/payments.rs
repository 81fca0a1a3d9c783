use axum::{Json, extract::State};
use tracing::{error, info};

use traahi_providers::ProviderError;
use traahi_providers::payment::{NewOrder, PaymentOrder};
use traahi_types::api::OrderRequest;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;

/// POST /payment/order: turn a donation amount into a provider order.
/// No local retry; a provider failure goes straight back to the client.
pub async fn create_order(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<OrderRequest>,
) -> ApiResult<Json<PaymentOrder>> {
    let order = NewOrder::from_major_units(req.amount, chrono::Utc::now().timestamp_millis())?;

    let created = state.payments.create_order(&order).await.map_err(|e| match e {
        ProviderError::InvalidRequest(msg) => ApiError::Validation(msg),
        other => {
            error!("Payment order failed: {}", other);
            ApiError::Gateway("Could not create payment order.".into())
        }
    })?;

    info!("Payment order {} created for {} paise", created.id, created.amount);
    Ok(Json(created))
}
