use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BabysitterAttributes, ParentAttributes, Profile, UserType};

// -- JWT Claims --

/// JWT claims issued at sign-up/sign-in and checked by the auth middleware.
/// `sid` names the server-side session row so sign-out can revoke the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub sid: Uuid,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub user_type: UserType,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
    pub redirect_to: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub name: String,
    pub user_type: UserType,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub email: String,
    pub name: String,
    pub user_type: UserType,
    pub expires_at: DateTime<Utc>,
}

// -- Profile setup --

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub babysitter: Option<BabysitterAttributes>,
    pub parent: Option<ParentAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSetupRequest {
    pub name: String,
    pub phone: Option<String>,
    pub city: String,
    pub babysitter: Option<BabysitterFields>,
    pub parent: Option<ParentFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BabysitterFields {
    pub age: i32,
    pub years_experience: i32,
    pub description: String,
    pub hourly_rate: f64,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParentFields {
    pub number_of_children: i32,
    pub special_needs: Option<String>,
    #[serde(default)]
    pub children_ages: Vec<u32>,
    #[serde(default)]
    pub preferred_schedule: Vec<String>,
}

// -- Directory --

/// A display-ready babysitter card, either backed by the store or a
/// demonstration record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: Option<u32>,
    pub years_experience: Option<u32>,
    pub description: String,
    pub hourly_rate: Option<f64>,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub avatar_initials: String,
    pub is_demo: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DirectoryResponse {
    pub entries: Vec<DirectoryEntry>,
    /// Set when the store had no babysitters and only demonstration records
    /// are being shown.
    pub demo_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BabysitterDetail {
    pub id: String,
    pub name: String,
    pub city: String,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub years_experience: Option<u32>,
    pub description: String,
    pub hourly_rate: Option<f64>,
    pub certifications: Vec<String>,
    pub specialties: Vec<String>,
    pub availability: Vec<String>,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub avatar_initials: String,
    pub is_demo: bool,
}

// -- Bookings --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBookingRequest {
    pub babysitter_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub updated: usize,
}

// -- Reviews --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}
