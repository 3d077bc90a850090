use crate::models::{BookingRow, MessageRow, NewBooking, NewReview, ReviewInsert, ReviewRow};
use crate::{Database, OptionalExt};
use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::debug;

const BOOKING_COLUMNS: &str = "id, parent_id, babysitter_id, date, start_time, end_time,
    hourly_rate, status, total_amount, notes, created_at, updated_at";

const REVIEW_COLUMNS: &str = "id, booking_id, reviewer_id, reviewee_id, rating, comment, created_at";

impl Database {
    // -- Bookings --

    pub fn create_booking(&self, booking: &NewBooking<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO bookings
                    (id, parent_id, babysitter_id, date, start_time, end_time,
                     hourly_rate, total_amount, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    booking.id,
                    booking.parent_id,
                    booking.babysitter_id,
                    booking.date,
                    booking.start_time,
                    booking.end_time,
                    booking.hourly_rate,
                    booking.total_amount,
                    booking.notes,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_booking(&self, id: &str) -> Result<Option<BookingRow>> {
        self.with_conn(|conn| query_booking(conn, id))
    }

    /// Bookings where `user_id` is either side, newest first.
    pub fn list_bookings_for_user(&self, user_id: &str) -> Result<Vec<BookingRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE parent_id = ?1 OR babysitter_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], booking_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_booking_status(&self, id: &str, status: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE bookings SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
                (id, status),
            )?;
            Ok(n > 0)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, id: &str, booking_id: &str, sender_id: &str, content: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, booking_id, sender_id, content) VALUES (?1, ?2, ?3, ?4)",
                (id, booking_id, sender_id, content),
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, booking_id, sender_id, content, read, created_at
                 FROM messages WHERE id = ?1",
                [id],
                message_from_row,
            )
            .optional()
        })
    }

    /// Messages of a booking in conversation order.
    pub fn list_messages(&self, booking_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, booking_id, sender_id, content, read, created_at
                 FROM messages
                 WHERE booking_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt
                .query_map([booking_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Mark every unread message in the booking not sent by `reader_id` as read.
    pub fn mark_messages_read(&self, booking_id: &str, reader_id: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE messages SET read = 1
                 WHERE booking_id = ?1 AND sender_id <> ?2 AND read = 0",
                (booking_id, reader_id),
            )?;
            Ok(n)
        })
    }

    // -- Reviews --

    /// Insert a review and refresh the reviewee's babysitter aggregates in the
    /// same transaction. A second review by the same reviewer for the same
    /// booking is reported as `Duplicate` and changes nothing.
    pub fn insert_review(&self, review: &NewReview<'_>) -> Result<ReviewInsert> {
        self.with_tx(|tx| {
            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM reviews WHERE booking_id = ?1 AND reviewer_id = ?2",
                    (review.booking_id, review.reviewer_id),
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Ok(ReviewInsert::Duplicate);
            }

            tx.execute(
                "INSERT INTO reviews (id, booking_id, reviewer_id, reviewee_id, rating, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    review.id,
                    review.booking_id,
                    review.reviewer_id,
                    review.reviewee_id,
                    review.rating,
                    review.comment,
                ],
            )?;

            let refreshed = tx.execute(
                "UPDATE babysitter_profiles SET
                    average_rating = (SELECT COALESCE(AVG(rating), 0) FROM reviews WHERE reviewee_id = ?1),
                    total_reviews = (SELECT COUNT(*) FROM reviews WHERE reviewee_id = ?1),
                    updated_at = datetime('now')
                 WHERE user_id = ?1",
                [review.reviewee_id],
            )?;
            debug!(
                "Review {} stored for {} (aggregates refreshed: {})",
                review.id,
                review.reviewee_id,
                refreshed > 0
            );

            Ok(ReviewInsert::Inserted)
        })
    }

    pub fn get_review(&self, id: &str) -> Result<Option<ReviewRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1");
            conn.query_row(&sql, [id], review_from_row).optional()
        })
    }

    /// Reviews received by `reviewee_id`, newest first.
    pub fn list_reviews_for(&self, reviewee_id: &str) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews
                 WHERE reviewee_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([reviewee_id], review_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_booking(conn: &Connection, id: &str) -> Result<Option<BookingRow>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    conn.query_row(&sql, [id], booking_from_row).optional()
}

fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<BookingRow> {
    Ok(BookingRow {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        babysitter_id: row.get(2)?,
        date: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        hourly_rate: row.get(6)?,
        status: row.get(7)?,
        total_amount: row.get(8)?,
        notes: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        sender_id: row.get(2)?,
        content: row.get(3)?,
        read: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        reviewer_id: row.get(2)?,
        reviewee_id: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: row.get(6)?,
    })
}
