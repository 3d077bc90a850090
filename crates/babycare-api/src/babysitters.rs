use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use babycare_types::api::{BabysitterDetail, DirectoryResponse};

use crate::directory::{DetailLookup, Directory};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::run_blocking;

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    /// Free-text term matched against name and city.
    pub q: Option<String>,
}

pub async fn list_babysitters(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> ApiResult<Json<DirectoryResponse>> {
    let listing = run_blocking(&state, move |s| {
        Directory::new(&s.db, s.demo_babysitters, s.settings.directory_order)
            .list(query.q.as_deref())
    })
    .await?;

    Ok(Json(listing))
}

pub async fn get_babysitter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BabysitterDetail>> {
    let lookup = run_blocking(&state, move |s| {
        Directory::new(&s.db, s.demo_babysitters, s.settings.directory_order).detail(&id)
    })
    .await?;

    match lookup {
        DetailLookup::Found(detail) => Ok(Json(detail)),
        DetailLookup::NotFound => Err(ApiError::not_found("Babysitter not found")),
    }
}
