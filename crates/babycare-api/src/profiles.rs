use axum::{Extension, Json, extract::State};
use tracing::info;

use babycare_db::models::{BabysitterUpsert, ParentUpsert, ProfileUpdate, RoleUpsert};
use babycare_types::api::{
    BabysitterFields, Claims, ParentFields, ProfileResponse, ProfileSetupRequest,
};
use babycare_types::events::SessionEvent;
use babycare_types::models::UserType;

use crate::convert;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::run_blocking;

const MIN_BABYSITTER_AGE: i32 = 18;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<ProfileResponse>> {
    let uid = claims.sub.to_string();
    let response = run_blocking(&state, move |s| load_profile(s, &uid)).await?;
    response
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Profile not found"))
}

/// Update the base profile and upsert the attributes for the caller's role.
pub async fn save_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProfileSetupRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let name = req.name.trim().to_string();
    let city = req.city.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    if city.is_empty() {
        return Err(ApiError::bad_request("City is required"));
    }
    let phone = req
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let uid = claims.sub.to_string();
    let lookup = uid.clone();
    let profile = run_blocking(&state, move |s| s.db.get_profile(&lookup))
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    let user_type = convert::profile(profile).user_type;

    let role = match user_type {
        UserType::Babysitter => {
            let fields = req
                .babysitter
                .ok_or_else(|| ApiError::bad_request("Babysitter details are required"))?;
            RoleUpsert::Babysitter(babysitter_upsert(fields)?)
        }
        UserType::Parent => {
            let fields = req
                .parent
                .ok_or_else(|| ApiError::bad_request("Parent details are required"))?;
            RoleUpsert::Parent(parent_upsert(fields)?)
        }
    };

    let saved = run_blocking(&state, move |s| {
        let update = ProfileUpdate {
            name: &name,
            phone: phone.as_deref(),
            city: &city,
        };
        if !s.db.save_profile_setup(&uid, &update, &role)? {
            return Ok(None);
        }
        load_profile(s, &uid)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    state.sessions.publish(SessionEvent::UserUpdated { user_id: claims.sub });
    info!("Saved {} profile for {}", user_type, claims.sub);

    Ok(Json(saved))
}

fn load_profile(
    state: &crate::state::AppStateInner,
    user_id: &str,
) -> anyhow::Result<Option<ProfileResponse>> {
    let Some(profile) = state.db.get_profile(user_id)? else {
        return Ok(None);
    };
    let babysitter = state
        .db
        .get_babysitter_attributes(user_id)?
        .map(convert::babysitter_attributes);
    let parent = state
        .db
        .get_parent_attributes(user_id)?
        .map(convert::parent_attributes);

    Ok(Some(ProfileResponse {
        profile: convert::profile(profile),
        babysitter,
        parent,
    }))
}

fn babysitter_upsert(fields: BabysitterFields) -> ApiResult<BabysitterUpsert> {
    if fields.age < MIN_BABYSITTER_AGE {
        return Err(ApiError::bad_request("Babysitters must be at least 18 years old"));
    }
    if fields.years_experience < 0 {
        return Err(ApiError::bad_request("Years of experience cannot be negative"));
    }
    let description = fields.description.trim().to_string();
    if description.is_empty() {
        return Err(ApiError::bad_request("Description is required"));
    }
    if !fields.hourly_rate.is_finite() || fields.hourly_rate < 0.0 {
        return Err(ApiError::bad_request("Hourly rate cannot be negative"));
    }

    Ok(BabysitterUpsert {
        age: fields.age.into(),
        years_experience: fields.years_experience.into(),
        description,
        hourly_rate: fields.hourly_rate,
        certifications: clean_list(fields.certifications),
        specialties: clean_list(fields.specialties),
        availability: clean_list(fields.availability),
    })
}

fn parent_upsert(fields: ParentFields) -> ApiResult<ParentUpsert> {
    if fields.number_of_children < 1 {
        return Err(ApiError::bad_request("Number of children must be at least 1"));
    }

    Ok(ParentUpsert {
        number_of_children: fields.number_of_children.into(),
        special_needs: fields
            .special_needs
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        children_ages: fields.children_ages,
        preferred_schedule: clean_list(fields.preferred_schedule),
    })
}

/// Trim list items and drop blanks.
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sitter(age: i32, rate: f64) -> BabysitterFields {
        BabysitterFields {
            age,
            years_experience: 2,
            description: "  Loves kids  ".into(),
            hourly_rate: rate,
            certifications: vec!["First aid".into(), "  ".into()],
            specialties: vec![],
            availability: vec![],
        }
    }

    #[test]
    fn babysitter_fields_are_validated() {
        assert!(babysitter_upsert(sitter(17, 20.0)).is_err());
        assert!(babysitter_upsert(sitter(18, -1.0)).is_err());

        let upsert = babysitter_upsert(sitter(18, 0.0)).unwrap();
        assert_eq!(upsert.description, "Loves kids");
        assert_eq!(upsert.certifications, vec!["First aid".to_string()]);
    }

    #[test]
    fn parent_needs_at_least_one_child() {
        let fields = ParentFields {
            number_of_children: 0,
            special_needs: Some(" ".into()),
            children_ages: vec![],
            preferred_schedule: vec![],
        };
        assert!(parent_upsert(fields.clone()).is_err());

        let upsert = parent_upsert(ParentFields { number_of_children: 2, ..fields }).unwrap();
        assert_eq!(upsert.number_of_children, 2);
        assert_eq!(upsert.special_needs, None);
    }
}
