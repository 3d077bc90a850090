use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use babycare_types::api::{Claims, MarkReadResponse, SendMessageRequest};
use babycare_types::models::BookingMessage;

use crate::bookings::participant_booking;
use crate::convert;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::run_blocking;

const MAX_MESSAGE_LEN: usize = 2000;

pub async fn list_messages(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<BookingMessage>>> {
    let booking = participant_booking(&state, &booking_id, claims.sub).await?;
    let rows = run_blocking(&state, move |s| s.db.list_messages(&booking.id)).await?;
    Ok(Json(rows.into_iter().map(convert::message).collect()))
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let content = req.content.trim().to_string();
    if content.is_empty() || content.chars().count() > MAX_MESSAGE_LEN {
        return Err(ApiError::bad_request("Message must be 1-2000 characters"));
    }

    let booking = participant_booking(&state, &booking_id, claims.sub).await?;

    let message_id = Uuid::new_v4().to_string();
    let sender_id = claims.sub.to_string();
    let row = run_blocking(&state, move |s| {
        s.db.insert_message(&message_id, &booking.id, &sender_id, &content)?;
        s.db.get_message(&message_id)
    })
    .await?
    .ok_or_else(|| ApiError::Internal("message vanished after insert".into()))?;

    debug!("Message {} posted on booking {}", row.id, row.booking_id);
    Ok((StatusCode::CREATED, Json(convert::message(row))))
}

/// Mark the other participant's messages on this booking as read.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<MarkReadResponse>> {
    let booking = participant_booking(&state, &booking_id, claims.sub).await?;

    let reader_id = claims.sub.to_string();
    let updated = run_blocking(&state, move |s| s.db.mark_messages_read(&booking.id, &reader_id)).await?;
    Ok(Json(MarkReadResponse { updated }))
}
