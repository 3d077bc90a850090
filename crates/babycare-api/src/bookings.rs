use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveTime;
use tracing::info;
use uuid::Uuid;

use babycare_db::models::{BookingRow, NewBooking};
use babycare_types::api::{Claims, CreateBookingRequest, UpdateBookingStatusRequest};
use babycare_types::models::{Booking, UserType};

use crate::convert;
use crate::directory::is_demo_id;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::run_blocking;

const TIME_FORMAT: &str = "%H:%M";
const MAX_STATUS_LEN: usize = 32;
const MAX_NOTES_LEN: usize = 2000;

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    if is_demo_id(&req.babysitter_id) {
        return Err(ApiError::bad_request("Demonstration profiles cannot be booked"));
    }
    let (start, end) = parse_slot(&req.start_time, &req.end_time)?;
    let notes = req
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if notes.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTES_LEN) {
        return Err(ApiError::bad_request("Notes are too long"));
    }

    let uid = claims.sub.to_string();
    let sitter_id = req.babysitter_id.clone();
    let (caller, sitter) = run_blocking(&state, move |s| {
        Ok((s.db.get_profile(&uid)?, s.db.get_babysitter_attributes(&sitter_id)?))
    })
    .await?;

    let caller = caller.ok_or_else(|| ApiError::not_found("Profile not found"))?;
    if convert::profile(caller).user_type != UserType::Parent {
        return Err(ApiError::Forbidden);
    }
    let sitter = sitter.ok_or_else(|| ApiError::not_found("Babysitter not found"))?;
    let hourly_rate = sitter
        .hourly_rate
        .ok_or_else(|| ApiError::bad_request("Babysitter has not set an hourly rate"))?;

    let booking_id = Uuid::new_v4().to_string();
    let parent_id = claims.sub.to_string();
    let date = req.date.format("%Y-%m-%d").to_string();
    let start_time = start.format(TIME_FORMAT).to_string();
    let end_time = end.format(TIME_FORMAT).to_string();
    let total_amount = total_amount(start, end, hourly_rate);

    let row = run_blocking(&state, move |s| {
        s.db.create_booking(&NewBooking {
            id: &booking_id,
            parent_id: &parent_id,
            babysitter_id: &sitter.user_id,
            date: &date,
            start_time: &start_time,
            end_time: &end_time,
            hourly_rate,
            total_amount,
            notes: notes.as_deref(),
        })?;
        s.db.get_booking(&booking_id)
    })
    .await?
    .ok_or_else(|| ApiError::Internal("booking vanished after insert".into()))?;

    info!("Booking {} created by {}", row.id, claims.sub);
    Ok((StatusCode::CREATED, Json(convert::booking(row))))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<Booking>>> {
    let uid = claims.sub.to_string();
    let rows = run_blocking(&state, move |s| s.db.list_bookings_for_user(&uid)).await?;
    Ok(Json(rows.into_iter().map(convert::booking).collect()))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> ApiResult<Json<Booking>> {
    let status = req.status.trim().to_string();
    if status.is_empty() || status.chars().count() > MAX_STATUS_LEN {
        return Err(ApiError::bad_request("Status must be 1-32 characters"));
    }

    let booking = participant_booking(&state, &booking_id, claims.sub).await?;

    let row = run_blocking(&state, move |s| {
        s.db.update_booking_status(&booking.id, &status)?;
        s.db.get_booking(&booking.id)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    info!("Booking {} status set to '{}' by {}", row.id, row.status, claims.sub);
    Ok(Json(convert::booking(row)))
}

/// Load a booking the caller takes part in. Unknown ids are 404, bookings
/// between other users are 403.
pub(crate) async fn participant_booking(
    state: &AppState,
    booking_id: &str,
    user_id: Uuid,
) -> ApiResult<BookingRow> {
    let id = booking_id.to_string();
    let booking = run_blocking(state, move |s| s.db.get_booking(&id))
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    if !booking.is_participant(&user_id.to_string()) {
        return Err(ApiError::Forbidden);
    }
    Ok(booking)
}

fn parse_slot(start: &str, end: &str) -> ApiResult<(NaiveTime, NaiveTime)> {
    let parse = |raw: &str| {
        NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
            .map_err(|_| ApiError::bad_request(format!("Invalid time '{}', expected HH:MM", raw)))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    if end <= start {
        return Err(ApiError::bad_request("End time must be after start time"));
    }
    Ok((start, end))
}

/// Hours between `start` and `end` times the rate, rounded to cents.
fn total_amount(start: NaiveTime, end: NaiveTime, hourly_rate: f64) -> f64 {
    let hours = (end - start).num_minutes() as f64 / 60.0;
    (hours * hourly_rate * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(raw: &str) -> NaiveTime {
        NaiveTime::parse_from_str(raw, TIME_FORMAT).unwrap()
    }

    #[test]
    fn total_is_rounded_to_cents() {
        assert_eq!(total_amount(t("18:00"), t("21:30"), 35.0), 122.5);
        assert_eq!(total_amount(t("09:00"), t("09:20"), 10.0), 3.33);
    }

    #[test]
    fn slot_must_end_after_it_starts() {
        assert!(parse_slot("18:00", "18:00").is_err());
        assert!(parse_slot("20:00", "18:00").is_err());
        assert!(parse_slot("6pm", "9pm").is_err());
        assert!(parse_slot("18:00", "21:00").is_ok());
    }
}
