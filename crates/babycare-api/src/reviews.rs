use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use babycare_db::models::{NewReview, ReviewInsert};
use babycare_types::api::{Claims, CreateReviewRequest};
use babycare_types::models::Review;

use crate::bookings::participant_booking;
use crate::convert;
use crate::directory::is_demo_id;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::run_blocking;

const MAX_COMMENT_LEN: usize = 2000;

/// Reviews received by a babysitter, newest first.
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Review>>> {
    if is_demo_id(&id) {
        return Ok(Json(Vec::new()));
    }
    let rows = run_blocking(&state, move |s| s.db.list_reviews_for(&id)).await?;
    Ok(Json(rows.into_iter().map(convert::review).collect()))
}

/// Review the other participant of a booking.
pub async fn create_review(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::bad_request("Rating must be between 1 and 5"));
    }
    let comment = req
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if comment.as_ref().is_some_and(|c| c.chars().count() > MAX_COMMENT_LEN) {
        return Err(ApiError::bad_request("Comment is too long"));
    }

    let booking = participant_booking(&state, &booking_id, claims.sub).await?;

    let review_id = Uuid::new_v4().to_string();
    let reviewer_id = claims.sub.to_string();
    let reviewee_id = booking.counterpart(&reviewer_id).to_string();
    let rating = i64::from(req.rating);

    let outcome = run_blocking(&state, move |s| {
        let outcome = s.db.insert_review(&NewReview {
            id: &review_id,
            booking_id: &booking.id,
            reviewer_id: &reviewer_id,
            reviewee_id: &reviewee_id,
            rating,
            comment: comment.as_deref(),
        })?;
        let stored = match outcome {
            ReviewInsert::Inserted => s.db.get_review(&review_id)?,
            ReviewInsert::Duplicate => None,
        };
        Ok((outcome, stored))
    })
    .await?;

    match outcome {
        (ReviewInsert::Duplicate, _) => Err(ApiError::Conflict(
            "You have already reviewed this booking".into(),
        )),
        (ReviewInsert::Inserted, Some(row)) => {
            info!("Review {} left by {} on booking {}", row.id, claims.sub, row.booking_id);
            Ok((StatusCode::CREATED, Json(convert::review(row))))
        }
        (ReviewInsert::Inserted, None) => {
            Err(ApiError::Internal("review vanished after insert".into()))
        }
    }
}
