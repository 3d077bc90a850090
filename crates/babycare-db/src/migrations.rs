use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS profiles (
            id          TEXT PRIMARY KEY REFERENCES users(id),
            email       TEXT NOT NULL,
            name        TEXT NOT NULL,
            phone       TEXT,
            city        TEXT,
            avatar_url  TEXT,
            user_type   TEXT NOT NULL CHECK (user_type IN ('parent', 'babysitter')),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS babysitter_profiles (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL UNIQUE REFERENCES profiles(id),
            age                 INTEGER,
            years_experience    INTEGER,
            hourly_rate         REAL,
            description         TEXT,
            certifications      TEXT NOT NULL DEFAULT '[]',
            specialties         TEXT NOT NULL DEFAULT '[]',
            availability        TEXT NOT NULL DEFAULT '[]',
            average_rating      REAL NOT NULL DEFAULT 0,
            total_reviews       INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_babysitter_rating
            ON babysitter_profiles(average_rating DESC);

        CREATE TABLE IF NOT EXISTS parent_profiles (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL UNIQUE REFERENCES profiles(id),
            number_of_children  INTEGER,
            children_ages       TEXT NOT NULL DEFAULT '[]',
            preferred_schedule  TEXT NOT NULL DEFAULT '[]',
            special_needs       TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS bookings (
            id              TEXT PRIMARY KEY,
            parent_id       TEXT NOT NULL REFERENCES profiles(id),
            babysitter_id   TEXT NOT NULL REFERENCES profiles(id),
            date            TEXT NOT NULL,
            start_time      TEXT NOT NULL,
            end_time        TEXT NOT NULL,
            hourly_rate     REAL NOT NULL,
            status          TEXT NOT NULL DEFAULT 'pending',
            total_amount    REAL,
            notes           TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_bookings_parent ON bookings(parent_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_babysitter ON bookings(babysitter_id);

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            booking_id  TEXT NOT NULL REFERENCES bookings(id),
            sender_id   TEXT NOT NULL REFERENCES profiles(id),
            content     TEXT NOT NULL,
            read        INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_booking
            ON messages(booking_id, created_at);

        CREATE TABLE IF NOT EXISTS reviews (
            id          TEXT PRIMARY KEY,
            booking_id  TEXT NOT NULL REFERENCES bookings(id),
            reviewer_id TEXT NOT NULL REFERENCES profiles(id),
            reviewee_id TEXT NOT NULL REFERENCES profiles(id),
            rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment     TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(booking_id, reviewer_id)
        );

        CREATE INDEX IF NOT EXISTS idx_reviews_reviewee ON reviews(reviewee_id);

        CREATE TABLE IF NOT EXISTS sessions (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            expires_at  TEXT NOT NULL,
            revoked_at  TEXT
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
