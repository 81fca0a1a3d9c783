use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

// -- JWT Claims --

/// Session token claims. `sub` is the user id; the NGO name is embedded so
/// handlers can label responses without another lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    #[serde(rename = "ngoName")]
    pub ngo_name: String,
    pub exp: usize,
}

// -- Common --

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub ngo_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub ngo_name: String,
}

// -- Campaigns --

/// Editable campaign fields, used for both create and full update.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignFields {
    #[serde(default, alias = "campaignTitle")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_summary: String,
    #[serde(default)]
    pub cover_image_url: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "event_date_opt")]
    pub event_date: Option<NaiveDate>,
}

impl CampaignFields {
    /// Names of required fields that are blank or absent.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("short_summary", &self.short_summary),
            ("cover_image_url", &self.cover_image_url),
            ("city", &self.city),
            ("type", &self.kind),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        if self.event_date.is_none() {
            missing.push("event_date");
        }
        missing
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportFields {
    pub impact_report: Option<String>,
    pub gallery_images: Option<String>,
}

// -- Registrations --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub campaign_title: Option<String>,
    pub campaign_id: Option<i64>,
}

// -- Payments --

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub amount: f64,
}

// -- Uploads --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryUploadResponse {
    pub file_paths: Vec<String>,
}

/// Parse a calendar date out of either `YYYY-MM-DD` or a date-time string.
/// Time of day is discarded.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

fn event_date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_event_date(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid event_date: {s}"))),
    }
}
