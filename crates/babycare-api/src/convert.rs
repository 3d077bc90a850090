//! Row → API model conversion. Corrupt columns are logged and replaced with
//! defaults rather than failing the whole response.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use babycare_db::models::{
    BabysitterRow, BookingRow, MessageRow, ParentRow, ProfileRow, ReviewRow,
};
use babycare_db::queries::SQLITE_TIMESTAMP;
use babycare_types::models::{
    BabysitterAttributes, Booking, BookingMessage, ParentAttributes, Profile, Review, UserType,
};

pub fn timestamp(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP).map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {}: {}", raw, context, e);
            DateTime::default()
        })
}

pub fn uuid(raw: &str, context: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}' on {}: {}", raw, context, e);
        Uuid::default()
    })
}

/// Non-negative integer column as `u32`; negative or oversized values become `None`.
pub fn count(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

pub fn profile(row: ProfileRow) -> Profile {
    let context = format!("profile '{}'", row.id);
    let user_type = row.user_type.parse().unwrap_or_else(|e| {
        warn!("{} on {}", e, context);
        UserType::default()
    });

    Profile {
        id: uuid(&row.id, &context),
        email: row.email,
        name: row.name,
        phone: row.phone,
        city: row.city,
        avatar_url: row.avatar_url,
        user_type,
        created_at: timestamp(&row.created_at, &context),
        updated_at: timestamp(&row.updated_at, &context),
    }
}

pub fn babysitter_attributes(row: BabysitterRow) -> BabysitterAttributes {
    BabysitterAttributes {
        age: count(row.age),
        years_experience: count(row.years_experience),
        hourly_rate: row.hourly_rate,
        description: row.description,
        certifications: row.certifications,
        specialties: row.specialties,
        availability: row.availability,
        average_rating: row.average_rating,
        total_reviews: count(Some(row.total_reviews)).unwrap_or(0),
        updated_at: timestamp(&row.updated_at, &format!("babysitter '{}'", row.user_id)),
    }
}

pub fn parent_attributes(row: ParentRow) -> ParentAttributes {
    ParentAttributes {
        number_of_children: count(row.number_of_children),
        children_ages: row.children_ages,
        preferred_schedule: row.preferred_schedule,
        special_needs: row.special_needs,
        updated_at: timestamp(&row.updated_at, &format!("parent '{}'", row.user_id)),
    }
}

pub fn booking(row: BookingRow) -> Booking {
    let context = format!("booking '{}'", row.id);
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").unwrap_or_else(|e| {
        warn!("Corrupt date '{}' on {}: {}", row.date, context, e);
        NaiveDate::default()
    });

    Booking {
        id: uuid(&row.id, &context),
        parent_id: uuid(&row.parent_id, &context),
        babysitter_id: uuid(&row.babysitter_id, &context),
        date,
        start_time: row.start_time,
        end_time: row.end_time,
        hourly_rate: row.hourly_rate,
        status: row.status,
        total_amount: row.total_amount,
        notes: row.notes,
        created_at: timestamp(&row.created_at, &context),
        updated_at: timestamp(&row.updated_at, &context),
    }
}

pub fn message(row: MessageRow) -> BookingMessage {
    let context = format!("message '{}'", row.id);
    BookingMessage {
        id: uuid(&row.id, &context),
        booking_id: uuid(&row.booking_id, &context),
        sender_id: uuid(&row.sender_id, &context),
        content: row.content,
        read: row.read,
        created_at: timestamp(&row.created_at, &context),
    }
}

pub fn review(row: ReviewRow) -> Review {
    let context = format!("review '{}'", row.id);
    Review {
        id: uuid(&row.id, &context),
        booking_id: uuid(&row.booking_id, &context),
        reviewer_id: uuid(&row.reviewer_id, &context),
        reviewee_id: uuid(&row.reviewee_id, &context),
        rating: u8::try_from(row.rating).unwrap_or_default(),
        comment: row.comment,
        created_at: timestamp(&row.created_at, &context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_and_rfc3339_timestamps() {
        let sqlite = timestamp("2026-10-17 09:30:00", "test");
        let rfc = timestamp("2026-10-17T09:30:00Z", "test");
        assert_eq!(sqlite, rfc);
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        assert_eq!(timestamp("yesterday", "test"), DateTime::<Utc>::default());
        assert_eq!(uuid("not-a-uuid", "test"), Uuid::default());
        assert_eq!(count(Some(-3)), None);
        assert_eq!(count(Some(7)), Some(7));
    }
}
