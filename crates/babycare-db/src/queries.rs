use crate::models::{
    BabysitterDetailRow, BabysitterListingRow, BabysitterRow, BabysitterUpsert, ParentRow,
    ParentUpsert, ProfileRow, ProfileUpdate, RoleUpsert, SessionRow, UserRow, json_list,
};
use crate::{Database, OptionalExt};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use uuid::Uuid;

/// Timestamp layout produced by SQLite's `datetime('now')`.
pub const SQLITE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

impl Database {
    // -- Accounts --

    /// Create the identity row and its profile in one transaction. Returns
    /// `false` without writing anything when `email` is already registered.
    pub fn create_account(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        name: &str,
        user_type: &str,
    ) -> Result<bool> {
        self.with_tx(|tx| {
            let taken: Option<String> = tx
                .query_row("SELECT id FROM users WHERE email = ?1", [email], |row| row.get(0))
                .optional()?;
            if taken.is_some() {
                return Ok(false);
            }

            tx.execute(
                "INSERT INTO users (id, email, password) VALUES (?1, ?2, ?3)",
                (id, email, password_hash),
            )?;
            tx.execute(
                "INSERT INTO profiles (id, email, name, user_type) VALUES (?1, ?2, ?3, ?4)",
                (id, email, name, user_type),
            )?;
            Ok(true)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, email, password, created_at FROM users WHERE email = ?1",
                [email],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        password: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
        })
    }

    // -- Profiles --

    pub fn get_profile(&self, id: &str) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| query_profile(conn, id))
    }

    pub fn get_babysitter_attributes(&self, user_id: &str) -> Result<Option<BabysitterRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT user_id, age, years_experience, hourly_rate, description,
                        certifications, specialties, availability,
                        average_rating, total_reviews, updated_at
                 FROM babysitter_profiles WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(BabysitterRow {
                        user_id: row.get(0)?,
                        age: row.get(1)?,
                        years_experience: row.get(2)?,
                        hourly_rate: row.get(3)?,
                        description: row.get(4)?,
                        certifications: json_list("certifications", &row.get::<_, String>(5)?),
                        specialties: json_list("specialties", &row.get::<_, String>(6)?),
                        availability: json_list("availability", &row.get::<_, String>(7)?),
                        average_rating: row.get(8)?,
                        total_reviews: row.get(9)?,
                        updated_at: row.get(10)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn get_parent_attributes(&self, user_id: &str) -> Result<Option<ParentRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT user_id, number_of_children, children_ages, preferred_schedule,
                        special_needs, updated_at
                 FROM parent_profiles WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(ParentRow {
                        user_id: row.get(0)?,
                        number_of_children: row.get(1)?,
                        children_ages: json_list("children_ages", &row.get::<_, String>(2)?),
                        preferred_schedule: json_list(
                            "preferred_schedule",
                            &row.get::<_, String>(3)?,
                        ),
                        special_needs: row.get(4)?,
                        updated_at: row.get(5)?,
                    })
                },
            )
            .optional()
        })
    }

    /// Update the base profile and upsert the role extension atomically.
    /// Returns `false` when no profile row exists for `user_id`.
    pub fn save_profile_setup(
        &self,
        user_id: &str,
        update: &ProfileUpdate<'_>,
        role: &RoleUpsert,
    ) -> Result<bool> {
        self.with_tx(|tx| {
            let updated = tx.execute(
                "UPDATE profiles SET name = ?2, phone = ?3, city = ?4, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![user_id, update.name, update.phone, update.city],
            )?;
            if updated == 0 {
                return Ok(false);
            }

            match role {
                RoleUpsert::Babysitter(attrs) => upsert_babysitter(tx, user_id, attrs)?,
                RoleUpsert::Parent(attrs) => upsert_parent(tx, user_id, attrs)?,
            }
            Ok(true)
        })
    }

    pub fn upsert_babysitter_attributes(&self, user_id: &str, attrs: &BabysitterUpsert) -> Result<()> {
        self.with_conn_mut(|conn| upsert_babysitter(conn, user_id, attrs))
    }

    pub fn upsert_parent_attributes(&self, user_id: &str, attrs: &ParentUpsert) -> Result<()> {
        self.with_conn_mut(|conn| upsert_parent(conn, user_id, attrs))
    }

    // -- Directory --

    /// Every babysitter with owner name and city, best rated first.
    pub fn list_babysitters(&self) -> Result<Vec<BabysitterListingRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT b.user_id, p.name, p.city, b.age, b.years_experience, b.description,
                        b.hourly_rate, b.average_rating, b.total_reviews
                 FROM babysitter_profiles b
                 LEFT JOIN profiles p ON p.id = b.user_id
                 ORDER BY b.average_rating DESC",
            )?;

            let rows = stmt
                .query_map([], listing_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_babysitter_detail(&self, user_id: &str) -> Result<Option<BabysitterDetailRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT b.user_id, p.name, p.city, b.age, b.years_experience, b.description,
                        b.hourly_rate, b.average_rating, b.total_reviews,
                        p.phone, b.certifications, b.specialties, b.availability
                 FROM babysitter_profiles b
                 LEFT JOIN profiles p ON p.id = b.user_id
                 WHERE b.user_id = ?1",
                [user_id],
                |row| {
                    Ok(BabysitterDetailRow {
                        listing: listing_from_row(row)?,
                        phone: row.get(9)?,
                        certifications: json_list("certifications", &row.get::<_, String>(10)?),
                        specialties: json_list("specialties", &row.get::<_, String>(11)?),
                        availability: json_list("availability", &row.get::<_, String>(12)?),
                    })
                },
            )
            .optional()
        })
    }

    // -- Sessions --

    pub fn create_session(&self, id: &str, user_id: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, user_id, expires_at) VALUES (?1, ?2, ?3)",
                (id, user_id, expires_at.format(SQLITE_TIMESTAMP).to_string()),
            )?;
            Ok(())
        })
    }

    pub fn get_session(&self, id: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, created_at, expires_at, revoked_at FROM sessions WHERE id = ?1",
                [id],
                |row| {
                    Ok(SessionRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        created_at: row.get(2)?,
                        expires_at: row.get(3)?,
                        revoked_at: row.get(4)?,
                    })
                },
            )
            .optional()
        })
    }

    /// A session is active while it is neither revoked nor expired.
    pub fn is_session_active(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let active: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM sessions
                     WHERE id = ?1 AND revoked_at IS NULL AND expires_at > datetime('now')",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(active.is_some())
        })
    }

    /// Returns `true` if an active session was revoked.
    pub fn revoke_session(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE sessions SET revoked_at = datetime('now') WHERE id = ?1 AND revoked_at IS NULL",
                [id],
            )?;
            Ok(n > 0)
        })
    }
}

fn query_profile(conn: &Connection, id: &str) -> Result<Option<ProfileRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, name, phone, city, avatar_url, user_type, created_at, updated_at
         FROM profiles WHERE id = ?1",
    )?;

    let row = stmt
        .query_row([id], |row| {
            Ok(ProfileRow {
                id: row.get(0)?,
                email: row.get(1)?,
                name: row.get(2)?,
                phone: row.get(3)?,
                city: row.get(4)?,
                avatar_url: row.get(5)?,
                user_type: row.get(6)?,
                created_at: row.get(7)?,
                updated_at: row.get(8)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<BabysitterListingRow> {
    Ok(BabysitterListingRow {
        user_id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        age: row.get(3)?,
        years_experience: row.get(4)?,
        description: row.get(5)?,
        hourly_rate: row.get(6)?,
        average_rating: row.get(7)?,
        total_reviews: row.get(8)?,
    })
}

fn upsert_babysitter(conn: &Connection, user_id: &str, attrs: &BabysitterUpsert) -> Result<()> {
    conn.execute(
        "INSERT INTO babysitter_profiles
            (id, user_id, age, years_experience, description, hourly_rate,
             certifications, specialties, availability)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(user_id) DO UPDATE SET
            age = excluded.age,
            years_experience = excluded.years_experience,
            description = excluded.description,
            hourly_rate = excluded.hourly_rate,
            certifications = excluded.certifications,
            specialties = excluded.specialties,
            availability = excluded.availability,
            updated_at = datetime('now')",
        rusqlite::params![
            Uuid::new_v4().to_string(),
            user_id,
            attrs.age,
            attrs.years_experience,
            attrs.description,
            attrs.hourly_rate,
            serde_json::to_string(&attrs.certifications)?,
            serde_json::to_string(&attrs.specialties)?,
            serde_json::to_string(&attrs.availability)?,
        ],
    )?;
    Ok(())
}

fn upsert_parent(conn: &Connection, user_id: &str, attrs: &ParentUpsert) -> Result<()> {
    conn.execute(
        "INSERT INTO parent_profiles
            (id, user_id, number_of_children, special_needs, children_ages, preferred_schedule)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id) DO UPDATE SET
            number_of_children = excluded.number_of_children,
            special_needs = excluded.special_needs,
            children_ages = excluded.children_ages,
            preferred_schedule = excluded.preferred_schedule,
            updated_at = datetime('now')",
        rusqlite::params![
            Uuid::new_v4().to_string(),
            user_id,
            attrs.number_of_children,
            attrs.special_needs,
            serde_json::to_string(&attrs.children_ages)?,
            serde_json::to_string(&attrs.preferred_schedule)?,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sitter(rate: f64) -> BabysitterUpsert {
        BabysitterUpsert {
            age: 25,
            years_experience: 4,
            description: "Pedagogy student".into(),
            hourly_rate: rate,
            certifications: vec!["First aid".into()],
            specialties: vec![],
            availability: vec!["Weekends".into()],
        }
    }

    fn account(db: &Database, name: &str, user_type: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let email = format!("{}@example.com", id);
        db.create_account(&id, &email, "hash", name, user_type).unwrap();
        id
    }

    #[test]
    fn babysitter_upsert_keeps_one_row_with_latest_rate() {
        let db = Database::open_in_memory().unwrap();
        let id = account(&db, "Ana Souza", "babysitter");

        db.upsert_babysitter_attributes(&id, &sitter(30.0)).unwrap();
        db.upsert_babysitter_attributes(&id, &sitter(42.5)).unwrap();

        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM babysitter_profiles WHERE user_id = ?1",
                    [&id],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(count, 1);

        let row = db.get_babysitter_attributes(&id).unwrap().unwrap();
        assert_eq!(row.hourly_rate, Some(42.5));
        assert_eq!(row.certifications, vec!["First aid".to_string()]);
    }

    #[test]
    fn listing_is_ordered_by_rating_and_joined_with_profile() {
        let db = Database::open_in_memory().unwrap();
        let low = account(&db, "Beatriz Lima", "babysitter");
        let high = account(&db, "Carla Dias", "babysitter");
        db.upsert_babysitter_attributes(&low, &sitter(20.0)).unwrap();
        db.upsert_babysitter_attributes(&high, &sitter(25.0)).unwrap();
        db.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE babysitter_profiles SET average_rating = 4.9 WHERE user_id = ?1",
                [&high],
            )?;
            conn.execute(
                "UPDATE babysitter_profiles SET average_rating = 4.2 WHERE user_id = ?1",
                [&low],
            )?;
            Ok(())
        })
        .unwrap();

        let rows = db.list_babysitters().unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["Carla Dias", "Beatriz Lima"]);
        assert_eq!(rows[0].average_rating, 4.9);
    }

    #[test]
    fn profile_setup_writes_profile_and_extension() {
        let db = Database::open_in_memory().unwrap();
        let id = account(&db, "Paula", "parent");

        let saved = db
            .save_profile_setup(
                &id,
                &ProfileUpdate { name: "Paula Reis", phone: Some("11 99999-0000"), city: "Campinas" },
                &RoleUpsert::Parent(ParentUpsert {
                    number_of_children: 2,
                    special_needs: None,
                    children_ages: vec![3, 6],
                    preferred_schedule: vec!["Evenings".into()],
                }),
            )
            .unwrap();
        assert!(saved);

        let profile = db.get_profile(&id).unwrap().unwrap();
        assert_eq!(profile.city.as_deref(), Some("Campinas"));
        let parent = db.get_parent_attributes(&id).unwrap().unwrap();
        assert_eq!(parent.children_ages, vec![3, 6]);
    }

    #[test]
    fn profile_setup_for_unknown_user_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let ghost = Uuid::new_v4().to_string();
        let saved = db
            .save_profile_setup(
                &ghost,
                &ProfileUpdate { name: "Ghost", phone: None, city: "Nowhere" },
                &RoleUpsert::Babysitter(sitter(10.0)),
            )
            .unwrap();
        assert!(!saved);
        assert!(db.get_babysitter_attributes(&ghost).unwrap().is_none());
    }

    #[test]
    fn failed_transaction_rolls_back_profile_update() {
        let db = Database::open_in_memory().unwrap();
        let id = account(&db, "Original", "babysitter");

        let result: Result<()> = db.with_tx(|tx| {
            tx.execute("UPDATE profiles SET name = 'Changed' WHERE id = ?1", [&id])?;
            anyhow::bail!("extension write failed")
        });
        assert!(result.is_err());

        assert_eq!(db.get_profile(&id).unwrap().unwrap().name, "Original");
    }

    #[test]
    fn duplicate_email_creates_nothing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.create_account("a", "same@example.com", "h", "A", "parent").unwrap());
        assert!(!db.create_account("b", "same@example.com", "h", "B", "parent").unwrap());
        assert!(db.get_profile("b").unwrap().is_none());
    }

    #[test]
    fn revoked_session_is_inactive() {
        let db = Database::open_in_memory().unwrap();
        let id = account(&db, "Sam", "parent");
        let sid = Uuid::new_v4().to_string();
        db.create_session(&sid, &id, Utc::now() + chrono::Duration::days(1)).unwrap();
        assert!(db.is_session_active(&sid).unwrap());

        assert!(db.revoke_session(&sid).unwrap());
        assert!(!db.is_session_active(&sid).unwrap());
        assert!(!db.revoke_session(&sid).unwrap());
    }

    #[test]
    fn expired_session_is_inactive() {
        let db = Database::open_in_memory().unwrap();
        let id = account(&db, "Sam", "parent");
        let sid = Uuid::new_v4().to_string();
        db.create_session(&sid, &id, Utc::now() - chrono::Duration::hours(1)).unwrap();
        assert!(!db.is_session_active(&sid).unwrap());
    }
}
