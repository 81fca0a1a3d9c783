use rusqlite::Connection;
use tracing::info;

use crate::DbResult;

pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            email           TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS ngos (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            user_id     INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS campaigns (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            ngo_id                  INTEGER NOT NULL REFERENCES ngos(id) ON DELETE CASCADE,
            title                   TEXT NOT NULL,
            description             TEXT NOT NULL,
            short_summary           TEXT NOT NULL,
            cover_image_url         TEXT NOT NULL,
            city                    TEXT NOT NULL,
            type                    TEXT NOT NULL,
            event_date              TEXT NOT NULL,
            impact_report           TEXT,
            gallery_images          TEXT,
            volunteers_registered   INTEGER NOT NULL DEFAULT 0,
            created_at              TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_campaigns_ngo
            ON campaigns(ngo_id, event_date);

        CREATE INDEX IF NOT EXISTS idx_campaigns_title
            ON campaigns(title);

        CREATE INDEX IF NOT EXISTS idx_campaigns_event_date
            ON campaigns(event_date);

        CREATE TABLE IF NOT EXISTS registrations (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            campaign_id     INTEGER NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
            full_name       TEXT NOT NULL,
            email           TEXT NOT NULL,
            phone           TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(campaign_id, email)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
