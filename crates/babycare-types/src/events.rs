use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session change notifications pushed to subscribers of `/auth/events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    /// A new session was opened (sign-up or sign-in)
    SignedIn { user_id: Uuid, session_id: Uuid },

    /// A session was revoked by sign-out
    SignedOut { user_id: Uuid, session_id: Uuid },

    /// The user's profile or role attributes were saved
    UserUpdated { user_id: Uuid },
}

impl SessionEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::SignedIn { user_id, .. }
            | Self::SignedOut { user_id, .. }
            | Self::UserUpdated { user_id } => *user_id,
        }
    }

    /// Event name used on the SSE wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedIn { .. } => "signed_in",
            Self::SignedOut { .. } => "signed_out",
            Self::UserUpdated { .. } => "user_updated",
        }
    }
}
