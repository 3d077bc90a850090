//! Database row types. These map directly to SQLite rows and stay distinct
//! from the babycare-types API models so the store layer has no wire concerns.

use serde::de::DeserializeOwned;
use tracing::warn;

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct ProfileRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub avatar_url: Option<String>,
    pub user_type: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct BabysitterRow {
    pub user_id: String,
    pub age: Option<i64>,
    pub years_experience: Option<i64>,
    pub hourly_rate: Option<f64>,
    pub description: Option<String>,
    pub certifications: Vec<String>,
    pub specialties: Vec<String>,
    pub availability: Vec<String>,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub updated_at: String,
}

pub struct ParentRow {
    pub user_id: String,
    pub number_of_children: Option<i64>,
    pub children_ages: Vec<u32>,
    pub preferred_schedule: Vec<String>,
    pub special_needs: Option<String>,
    pub updated_at: String,
}

/// Babysitter attributes joined with the owner's name and city, as listed in
/// the directory. Name and city are optional because the join is a LEFT JOIN.
pub struct BabysitterListingRow {
    pub user_id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<i64>,
    pub years_experience: Option<i64>,
    pub description: Option<String>,
    pub hourly_rate: Option<f64>,
    pub average_rating: f64,
    pub total_reviews: i64,
}

pub struct BabysitterDetailRow {
    pub listing: BabysitterListingRow,
    pub phone: Option<String>,
    pub certifications: Vec<String>,
    pub specialties: Vec<String>,
    pub availability: Vec<String>,
}

pub struct SessionRow {
    pub id: String,
    pub user_id: String,
    pub created_at: String,
    pub expires_at: String,
    pub revoked_at: Option<String>,
}

pub struct BookingRow {
    pub id: String,
    pub parent_id: String,
    pub babysitter_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub hourly_rate: f64,
    pub status: String,
    pub total_amount: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl BookingRow {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.parent_id == user_id || self.babysitter_id == user_id
    }

    /// The participant on the other side of the booking from `user_id`.
    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.parent_id == user_id {
            &self.babysitter_id
        } else {
            &self.parent_id
        }
    }
}

pub struct MessageRow {
    pub id: String,
    pub booking_id: String,
    pub sender_id: String,
    pub content: String,
    pub read: bool,
    pub created_at: String,
}

pub struct ReviewRow {
    pub id: String,
    pub booking_id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: String,
}

// -- Write models --

pub struct ProfileUpdate<'a> {
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub city: &'a str,
}

#[derive(Debug, Clone)]
pub struct BabysitterUpsert {
    pub age: i64,
    pub years_experience: i64,
    pub description: String,
    pub hourly_rate: f64,
    pub certifications: Vec<String>,
    pub specialties: Vec<String>,
    pub availability: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ParentUpsert {
    pub number_of_children: i64,
    pub special_needs: Option<String>,
    pub children_ages: Vec<u32>,
    pub preferred_schedule: Vec<String>,
}

/// Role-specific extension row written alongside a profile update.
#[derive(Debug, Clone)]
pub enum RoleUpsert {
    Babysitter(BabysitterUpsert),
    Parent(ParentUpsert),
}

pub struct NewBooking<'a> {
    pub id: &'a str,
    pub parent_id: &'a str,
    pub babysitter_id: &'a str,
    pub date: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub hourly_rate: f64,
    pub total_amount: f64,
    pub notes: Option<&'a str>,
}

pub struct NewReview<'a> {
    pub id: &'a str,
    pub booking_id: &'a str,
    pub reviewer_id: &'a str,
    pub reviewee_id: &'a str,
    pub rating: i64,
    pub comment: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewInsert {
    Inserted,
    Duplicate,
}

/// Decode a JSON array column, treating corrupt content as empty.
pub(crate) fn json_list<T: DeserializeOwned>(column: &str, raw: &str) -> Vec<T> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Corrupt JSON list in column {}: {}", column, e);
        Vec::new()
    })
}
