//! Database row types. These map directly to SQLite rows and stay distinct
//! from the wire types in traahi-types.

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct LoginRow {
    pub user_id: i64,
    pub password_hash: String,
    pub ngo_name: String,
}

#[derive(Debug, Clone)]
pub struct CampaignRow {
    pub id: i64,
    pub ngo_id: i64,
    pub ngo_name: String,
    pub title: String,
    pub description: String,
    pub short_summary: String,
    pub cover_image_url: String,
    pub city: String,
    pub kind: String,
    pub event_date: NaiveDate,
    pub impact_report: Option<String>,
    pub gallery_images: Option<String>,
    pub volunteers_registered: i64,
}

impl From<CampaignRow> for traahi_types::models::Campaign {
    fn from(row: CampaignRow) -> Self {
        Self {
            id: row.id,
            ngo_id: row.ngo_id,
            ngo: row.ngo_name,
            title: row.title,
            description: row.description,
            short_summary: row.short_summary,
            cover_image_url: row.cover_image_url,
            city: row.city,
            kind: row.kind,
            event_date: row.event_date,
            impact_report: row.impact_report,
            gallery_images: row.gallery_images,
            volunteers_registered: row.volunteers_registered,
        }
    }
}

/// Validated input for inserting or fully replacing a campaign's editable fields.
#[derive(Debug, Clone)]
pub struct CampaignInput {
    pub title: String,
    pub description: String,
    pub short_summary: String,
    pub cover_image_url: String,
    pub city: String,
    pub kind: String,
    pub event_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct RegistrationRow {
    pub id: i64,
    pub campaign_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// One registrant to remind, joined with the campaign title.
#[derive(Debug, Clone)]
pub struct ReminderRow {
    pub full_name: String,
    pub phone: Option<String>,
    pub campaign_title: String,
}
