use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role tag carried by every profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Parent,
    Babysitter,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Parent => "parent",
            UserType::Babysitter => "babysitter",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = UnknownUserType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(UserType::Parent),
            "babysitter" => Ok(UserType::Babysitter),
            other => Err(UnknownUserType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUserType(pub String);

impl fmt::Display for UnknownUserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown user type '{}'", self.0)
    }
}

impl std::error::Error for UnknownUserType {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub avatar_url: Option<String>,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BabysitterAttributes {
    pub age: Option<u32>,
    pub years_experience: Option<u32>,
    pub hourly_rate: Option<f64>,
    pub description: Option<String>,
    pub certifications: Vec<String>,
    pub specialties: Vec<String>,
    pub availability: Vec<String>,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentAttributes {
    pub number_of_children: Option<u32>,
    pub children_ages: Vec<u32>,
    pub preferred_schedule: Vec<String>,
    pub special_needs: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub babysitter_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub hourly_rate: f64,
    pub status: String,
    pub total_amount: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingMessage {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_wire_names() {
        assert_eq!(serde_json::to_string(&UserType::Babysitter).unwrap(), "\"babysitter\"");
        assert_eq!("parent".parse::<UserType>().unwrap(), UserType::Parent);
        assert!("nanny".parse::<UserType>().is_err());
    }
}
