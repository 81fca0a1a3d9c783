use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::models::{CampaignInput, CampaignRow, LoginRow, RegistrationRow, ReminderRow};
use crate::{Database, DbError, DbResult};

const CAMPAIGN_COLUMNS: &str = "c.id, c.ngo_id, COALESCE(n.name, 'Unknown NGO'), c.title, c.description,
         c.short_summary, c.cover_image_url, c.city, c.type, c.event_date,
         c.impact_report, c.gallery_images, c.volunteers_registered";

impl Database {
    // -- Users / NGOs --

    /// Create a user and its NGO in one transaction. Either both rows exist
    /// afterwards or neither does; a taken email surfaces as `Conflict`.
    pub fn create_user_with_ngo(
        &self,
        email: &str,
        password_hash: &str,
        ngo_name: &str,
    ) -> DbResult<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO users (email, password_hash) VALUES (?1, ?2)",
                (email, password_hash),
            )?;
            let user_id = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO ngos (name, user_id) VALUES (?1, ?2)",
                (ngo_name, user_id),
            )?;
            tx.commit()?;
            Ok(user_id)
        })
    }

    pub fn get_login(&self, email: &str) -> DbResult<Option<LoginRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT u.id, u.password_hash, n.name
                     FROM users u
                     JOIN ngos n ON n.user_id = u.id
                     WHERE u.email = ?1",
                    [email],
                    |row| {
                        Ok(LoginRow {
                            user_id: row.get(0)?,
                            password_hash: row.get(1)?,
                            ngo_name: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_ngo_id_for_user(&self, user_id: i64) -> DbResult<Option<i64>> {
        self.with_conn(|conn| {
            let id = conn
                .query_row("SELECT id FROM ngos WHERE user_id = ?1", [user_id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(id)
        })
    }

    // -- Campaigns --

    pub fn list_campaigns(&self) -> DbResult<Vec<CampaignRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CAMPAIGN_COLUMNS}
                 FROM campaigns c
                 LEFT JOIN ngos n ON n.id = c.ngo_id
                 ORDER BY c.event_date ASC, c.id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], campaign_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_campaigns_by_ngo(&self, ngo_id: i64) -> DbResult<Vec<CampaignRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CAMPAIGN_COLUMNS}
                 FROM campaigns c
                 LEFT JOIN ngos n ON n.id = c.ngo_id
                 WHERE c.ngo_id = ?1
                 ORDER BY c.event_date ASC, c.id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([ngo_id], campaign_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    #[cfg(test)]
    fn get_campaign(&self, id: i64) -> DbResult<Option<CampaignRow>> {
        self.with_conn(|conn| query_campaign(conn, id))
    }

    pub fn insert_campaign(&self, ngo_id: i64, input: &CampaignInput) -> DbResult<CampaignRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO campaigns
                    (ngo_id, title, description, short_summary, cover_image_url, city, type, event_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    ngo_id,
                    input.title,
                    input.description,
                    input.short_summary,
                    input.cover_image_url,
                    input.city,
                    input.kind,
                    input.event_date,
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_campaign(conn, id)?.ok_or(DbError::NotFound("campaign"))
        })
    }

    /// Replace the editable fields of a campaign owned by `ngo_id`.
    /// `None` when no row matches both id and owner.
    pub fn update_campaign(
        &self,
        ngo_id: i64,
        id: i64,
        input: &CampaignInput,
    ) -> DbResult<Option<CampaignRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE campaigns
                 SET title = ?1, description = ?2, short_summary = ?3, cover_image_url = ?4,
                     city = ?5, type = ?6, event_date = ?7
                 WHERE id = ?8 AND ngo_id = ?9",
                params![
                    input.title,
                    input.description,
                    input.short_summary,
                    input.cover_image_url,
                    input.city,
                    input.kind,
                    input.event_date,
                    id,
                    ngo_id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_campaign(conn, id)
        })
    }

    /// Set the post-event report fields. Same owner scoping as `update_campaign`.
    pub fn update_campaign_report(
        &self,
        ngo_id: i64,
        id: i64,
        impact_report: Option<&str>,
        gallery_images: Option<&str>,
    ) -> DbResult<Option<CampaignRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE campaigns SET impact_report = ?1, gallery_images = ?2
                 WHERE id = ?3 AND ngo_id = ?4",
                params![impact_report, gallery_images, id, ngo_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_campaign(conn, id)
        })
    }

    /// Returns false when no row matched both id and owner.
    pub fn delete_campaign(&self, ngo_id: i64, id: i64) -> DbResult<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM campaigns WHERE id = ?1 AND ngo_id = ?2",
                (id, ngo_id),
            )?;
            Ok(changed > 0)
        })
    }

    /// Titles are not unique; the oldest campaign with the title wins.
    pub fn find_campaign_id_by_title(&self, title: &str) -> DbResult<Option<i64>> {
        self.with_conn(|conn| {
            let id = conn
                .query_row(
                    "SELECT id FROM campaigns WHERE title = ?1 ORDER BY id ASC LIMIT 1",
                    [title],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        })
    }

    // -- Registrations --

    /// Record a signup and bump the campaign's volunteer counter in one
    /// transaction. A duplicate (campaign, email) pair yields `Conflict` and
    /// leaves the counter untouched.
    pub fn register_volunteer(
        &self,
        campaign_id: i64,
        full_name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> DbResult<RegistrationRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let exists: Option<i64> = tx
                .query_row("SELECT id FROM campaigns WHERE id = ?1", [campaign_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if exists.is_none() {
                return Err(DbError::NotFound("campaign"));
            }

            tx.execute(
                "INSERT INTO registrations (campaign_id, full_name, email, phone)
                 VALUES (?1, ?2, ?3, ?4)",
                params![campaign_id, full_name, email, phone],
            )?;
            let id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE campaigns SET volunteers_registered = volunteers_registered + 1
                 WHERE id = ?1",
                [campaign_id],
            )?;

            tx.commit()?;

            Ok(RegistrationRow {
                id,
                campaign_id,
                full_name: full_name.to_string(),
                email: email.to_string(),
                phone: phone.map(str::to_string),
            })
        })
    }

    /// Every registration whose campaign takes place on `date`.
    pub fn registrations_on(&self, date: NaiveDate) -> DbResult<Vec<ReminderRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.full_name, r.phone, c.title
                 FROM registrations r
                 JOIN campaigns c ON r.campaign_id = c.id
                 WHERE c.event_date = ?1
                 ORDER BY r.id ASC",
            )?;
            let rows = stmt
                .query_map([date], |row| {
                    Ok(ReminderRow {
                        full_name: row.get(0)?,
                        phone: row.get(1)?,
                        campaign_title: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_campaign(conn: &Connection, id: i64) -> DbResult<Option<CampaignRow>> {
    let sql = format!(
        "SELECT {CAMPAIGN_COLUMNS}
         FROM campaigns c
         LEFT JOIN ngos n ON n.id = c.ngo_id
         WHERE c.id = ?1"
    );
    let row = conn.query_row(&sql, [id], campaign_from_row).optional()?;
    Ok(row)
}

fn campaign_from_row(row: &Row<'_>) -> rusqlite::Result<CampaignRow> {
    Ok(CampaignRow {
        id: row.get(0)?,
        ngo_id: row.get(1)?,
        ngo_name: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        short_summary: row.get(5)?,
        cover_image_url: row.get(6)?,
        city: row.get(7)?,
        kind: row.get(8)?,
        event_date: row.get(9)?,
        impact_report: row.get(10)?,
        gallery_images: row.get(11)?,
        volunteers_registered: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, date: NaiveDate) -> CampaignInput {
        CampaignInput {
            title: title.to_string(),
            description: "Clean the shoreline".to_string(),
            short_summary: "Shoreline cleanup".to_string(),
            cover_image_url: "http://localhost/uploads/cover.png".to_string(),
            city: "Chennai".to_string(),
            kind: "Environment".to_string(),
            event_date: date,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let user_id = db.create_user_with_ngo("a@x.com", "hash", "Helping Hands").unwrap();
        let ngo_id = db.get_ngo_id_for_user(user_id).unwrap().unwrap();
        (db, ngo_id)
    }

    fn count(db: &Database, table: &str) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
        })
        .unwrap()
    }

    fn volunteers(db: &Database, id: i64) -> i64 {
        db.get_campaign(id).unwrap().unwrap().volunteers_registered
    }

    #[test]
    fn duplicate_email_is_conflict_without_orphan_ngo() {
        let (db, _) = setup();
        let err = db.create_user_with_ngo("a@x.com", "hash2", "Other NGO").unwrap_err();
        assert!(matches!(err, DbError::Conflict));
        assert_eq!(count(&db, "users"), 1);
        assert_eq!(count(&db, "ngos"), 1);
    }

    #[test]
    fn failed_ngo_insert_rolls_back_user() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER fail_ngo BEFORE INSERT ON ngos
                 BEGIN SELECT RAISE(ABORT, 'injected'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.create_user_with_ngo("b@x.com", "hash", "Broken").is_err());
        assert_eq!(count(&db, "users"), 0);
        assert_eq!(count(&db, "ngos"), 0);
    }

    #[test]
    fn login_row_joins_ngo_name() {
        let (db, _) = setup();
        let login = db.get_login("a@x.com").unwrap().unwrap();
        assert_eq!(login.ngo_name, "Helping Hands");
        assert_eq!(login.password_hash, "hash");
        assert!(db.get_login("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn insert_starts_counter_at_zero_and_lists_by_date() {
        let (db, ngo_id) = setup();
        let later = db.insert_campaign(ngo_id, &input("Later", date(2030, 5, 1))).unwrap();
        let sooner = db.insert_campaign(ngo_id, &input("Sooner", date(2030, 1, 1))).unwrap();
        assert_eq!(later.volunteers_registered, 0);
        assert_eq!(later.ngo_name, "Helping Hands");

        let ids: Vec<i64> = db.list_campaigns().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);
    }

    #[test]
    fn mutations_are_scoped_to_owner() {
        let (db, owner) = setup();
        let other_user = db.create_user_with_ngo("b@x.com", "hash", "Other").unwrap();
        let other = db.get_ngo_id_for_user(other_user).unwrap().unwrap();
        let campaign = db.insert_campaign(owner, &input("Mine", date(2030, 1, 1))).unwrap();

        let edit = input("Stolen", date(2031, 1, 1));
        assert!(db.update_campaign(other, campaign.id, &edit).unwrap().is_none());
        assert!(db.update_campaign_report(other, campaign.id, Some("r"), None).unwrap().is_none());
        assert!(!db.delete_campaign(other, campaign.id).unwrap());
        assert_eq!(db.get_campaign(campaign.id).unwrap().unwrap().title, "Mine");

        let updated = db.update_campaign(owner, campaign.id, &edit).unwrap().unwrap();
        assert_eq!(updated.title, "Stolen");
        assert_eq!(updated.event_date, date(2031, 1, 1));

        let reported = db
            .update_campaign_report(owner, campaign.id, Some("Collected 40kg"), Some("a.png,b.png"))
            .unwrap()
            .unwrap();
        assert_eq!(reported.impact_report.as_deref(), Some("Collected 40kg"));
        assert_eq!(reported.gallery_images.as_deref(), Some("a.png,b.png"));

        assert!(db.delete_campaign(owner, campaign.id).unwrap());
        assert!(!db.delete_campaign(owner, campaign.id).unwrap());
    }

    #[test]
    fn duplicate_registration_counts_once() {
        let (db, ngo_id) = setup();
        let campaign = db.insert_campaign(ngo_id, &input("Beach Cleanup", date(2030, 1, 1))).unwrap();

        db.register_volunteer(campaign.id, "Asha", "asha@x.com", Some("+911234567890"))
            .unwrap();
        let err = db
            .register_volunteer(campaign.id, "Asha", "asha@x.com", None)
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict));
        assert_eq!(volunteers(&db, campaign.id), 1);
        assert_eq!(count(&db, "registrations"), 1);
    }

    #[test]
    fn failed_insert_leaves_counter_unchanged() {
        let (db, ngo_id) = setup();
        let campaign = db.insert_campaign(ngo_id, &input("Tree Drive", date(2030, 1, 1))).unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER fail_registration BEFORE INSERT ON registrations
                 WHEN NEW.full_name = 'boom'
                 BEGIN SELECT RAISE(ABORT, 'injected'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.register_volunteer(campaign.id, "boom", "b@x.com", None).is_err());
        assert_eq!(volunteers(&db, campaign.id), 0);
    }

    #[test]
    fn failed_increment_rolls_back_registration() {
        let (db, ngo_id) = setup();
        let campaign = db.insert_campaign(ngo_id, &input("Tree Drive", date(2030, 1, 1))).unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER fail_increment BEFORE UPDATE OF volunteers_registered ON campaigns
                 BEGIN SELECT RAISE(ABORT, 'injected'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.register_volunteer(campaign.id, "Ravi", "r@x.com", None).is_err());
        assert_eq!(count(&db, "registrations"), 0);
    }

    #[test]
    fn register_for_missing_campaign_is_not_found() {
        let (db, _) = setup();
        let err = db.register_volunteer(999, "Ravi", "r@x.com", None).unwrap_err();
        assert!(matches!(err, DbError::NotFound("campaign")));
    }

    #[test]
    fn title_lookup_picks_oldest() {
        let (db, ngo_id) = setup();
        let first = db.insert_campaign(ngo_id, &input("Same", date(2030, 1, 1))).unwrap();
        db.insert_campaign(ngo_id, &input("Same", date(2029, 1, 1))).unwrap();
        assert_eq!(db.find_campaign_id_by_title("Same").unwrap(), Some(first.id));
        assert_eq!(db.find_campaign_id_by_title("Nope").unwrap(), None);
    }

    #[test]
    fn registrations_on_matches_exact_date() {
        let (db, ngo_id) = setup();
        let on = db.insert_campaign(ngo_id, &input("On", date(2030, 6, 2))).unwrap();
        let off = db.insert_campaign(ngo_id, &input("Off", date(2030, 6, 3))).unwrap();
        db.register_volunteer(on.id, "A", "a@a.com", Some("+911")).unwrap();
        db.register_volunteer(off.id, "B", "b@b.com", Some("+912")).unwrap();

        let rows = db.registrations_on(date(2030, 6, 2)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].campaign_title, "On");
        assert_eq!(rows[0].full_name, "A");
    }

    #[test]
    fn deleting_campaign_removes_its_registrations() {
        let (db, ngo_id) = setup();
        let campaign = db.insert_campaign(ngo_id, &input("Gone", date(2030, 1, 1))).unwrap();
        db.register_volunteer(campaign.id, "A", "a@a.com", None).unwrap();
        assert!(db.delete_campaign(ngo_id, campaign.id).unwrap());
        assert_eq!(count(&db, "registrations"), 0);
    }
}
