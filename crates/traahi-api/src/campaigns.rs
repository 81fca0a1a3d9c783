use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use traahi_db::models::CampaignInput;
use traahi_types::api::{CampaignFields, Claims, ReportFields};
use traahi_types::models::{Campaign, Partition};

use crate::error::{ApiError, ApiResult};
use crate::extract::{JsonBody, PathParam};
use crate::lifecycle::{partition, today};
use crate::{AppState, db_call};

/// GET /campaigns: every campaign, split into upcoming and conducted.
pub async fn list_campaigns(State(state): State<AppState>) -> ApiResult<Json<Partition>> {
    let rows = db_call(&state, |db| db.list_campaigns()).await?;
    Ok(Json(partition(rows.into_iter().map(Campaign::from), today())))
}

/// GET /my-campaigns: the caller's campaigns only.
pub async fn my_campaigns(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Partition>> {
    let ngo_id = require_ngo(&state, &claims).await?;
    let rows = db_call(&state, move |db| db.list_campaigns_by_ngo(ngo_id)).await?;
    Ok(Json(partition(rows.into_iter().map(Campaign::from), today())))
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(fields): JsonBody<CampaignFields>,
) -> ApiResult<impl IntoResponse> {
    let ngo_id = require_ngo(&state, &claims).await?;
    let input = validate(fields)?;

    let row = db_call(&state, move |db| db.insert_campaign(ngo_id, &input)).await?;
    info!("NGO {} created campaign {}", ngo_id, row.id);

    Ok((StatusCode::CREATED, Json(Campaign::from(row))))
}

pub async fn update_campaign(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    Extension(claims): Extension<Claims>,
    JsonBody(fields): JsonBody<CampaignFields>,
) -> ApiResult<Json<Campaign>> {
    let ngo_id = owning_ngo(&state, &claims).await?;
    let input = validate(fields)?;

    let row = db_call(&state, move |db| db.update_campaign(ngo_id, id, &input))
        .await?
        .ok_or(ApiError::NotFoundOrForbidden)?;

    Ok(Json(Campaign::from(row)))
}

pub async fn update_report(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    Extension(claims): Extension<Claims>,
    JsonBody(report): JsonBody<ReportFields>,
) -> ApiResult<Json<Campaign>> {
    let ngo_id = owning_ngo(&state, &claims).await?;

    let row = db_call(&state, move |db| {
        db.update_campaign_report(
            ngo_id,
            id,
            report.impact_report.as_deref(),
            report.gallery_images.as_deref(),
        )
    })
    .await?
    .ok_or(ApiError::NotFoundOrForbidden)?;

    Ok(Json(Campaign::from(row)))
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<StatusCode> {
    let ngo_id = owning_ngo(&state, &claims).await?;

    let deleted = db_call(&state, move |db| db.delete_campaign(ngo_id, id)).await?;
    if !deleted {
        return Err(ApiError::NotFoundOrForbidden);
    }

    info!("NGO {} deleted campaign {}", ngo_id, id);
    Ok(StatusCode::NO_CONTENT)
}

async fn lookup_ngo(state: &AppState, claims: &Claims) -> ApiResult<Option<i64>> {
    let user_id = claims.sub;
    db_call(state, move |db| db.get_ngo_id_for_user(user_id)).await
}

/// NGO for read/create paths; absent NGO is a 404.
async fn require_ngo(state: &AppState, claims: &Claims) -> ApiResult<i64> {
    lookup_ngo(state, claims)
        .await?
        .ok_or_else(|| ApiError::NotFound("Associated NGO not found.".into()))
}

/// NGO for mutations of an existing campaign; absent NGO is a 403.
async fn owning_ngo(state: &AppState, claims: &Claims) -> ApiResult<i64> {
    lookup_ngo(state, claims)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Forbidden".into()))
}

fn validate(fields: CampaignFields) -> ApiResult<CampaignInput> {
    let missing = fields.missing();
    let Some(event_date) = fields.event_date.filter(|_| missing.is_empty()) else {
        return Err(ApiError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    };

    Ok(CampaignInput {
        title: fields.title.trim().to_string(),
        description: fields.description,
        short_summary: fields.short_summary,
        cover_image_url: fields.cover_image_url,
        city: fields.city.trim().to_string(),
        kind: fields.kind.trim().to_string(),
        event_date,
    })
}
