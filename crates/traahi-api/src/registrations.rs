use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use traahi_types::api::{MessageResponse, SignupRequest};

use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::{AppState, db_call};

/// POST /register: public volunteer signup.
///
/// The campaign is named by `campaignId` when present, otherwise by
/// `campaignTitle`. Titles are not unique; the oldest matching campaign wins.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let full_name = req.full_name.trim().to_string();
    let email = req.email.trim().to_string();
    let title = req
        .campaign_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    if full_name.is_empty() || email.is_empty() {
        return Err(missing_fields());
    }

    let phone = req
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let campaign_id = match (req.campaign_id, title) {
        (Some(id), _) => id,
        (None, Some(title)) => db_call(&state, move |db| db.find_campaign_id_by_title(&title))
            .await?
            .ok_or_else(campaign_not_found)?,
        (None, None) => return Err(missing_fields()),
    };

    let name = full_name.clone();
    let row = db_call(&state, move |db| {
        db.register_volunteer(campaign_id, &name, &email, phone.as_deref())
    })
    .await
    .map_err(|e| match e {
        ApiError::Conflict(_) => ApiError::Conflict(
            "You have already registered for this event with this email address.".into(),
        ),
        ApiError::NotFound(_) => campaign_not_found(),
        other => other,
    })?;

    info!("Registration {} recorded for campaign {}", row.id, campaign_id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Thank you, {full_name}, for registering!"),
        }),
    ))
}

fn missing_fields() -> ApiError {
    ApiError::Validation("Missing required fields.".into())
}

fn campaign_not_found() -> ApiError {
    ApiError::NotFound("Campaign not found.".into())
}
