use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A campaign as returned to clients, joined with its owner's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub ngo_id: i64,
    pub ngo: String,
    pub title: String,
    pub description: String,
    pub short_summary: String,
    pub cover_image_url: String,
    pub city: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub event_date: NaiveDate,
    pub impact_report: Option<String>,
    /// Comma-joined list of image URLs.
    pub gallery_images: Option<String>,
    pub volunteers_registered: i64,
}

/// Campaigns split by event date relative to today. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub upcoming: Vec<Campaign>,
    pub conducted: Vec<Campaign>,
}
