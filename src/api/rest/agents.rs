use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::location::DeliveryLocation;
use crate::models::profile::{Role, UserProfile};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profiles", post(create_profile).get(list_profiles))
        .route("/agents/:id/availability", patch(set_availability))
        .route(
            "/agents/:id/location",
            patch(report_location).get(get_location),
        )
}

#[derive(Deserialize)]
pub struct CreateProfileRequest {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Projects an identity owned by the external auth provider into local
/// state. The id comes with the request for that reason.
async fn create_profile(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    if !payload.email.contains('@') {
        return Err(AppError::Validation(format!(
            "invalid email: {}",
            payload.email
        )));
    }

    let profile = UserProfile {
        id: payload.id,
        email: payload.email,
        full_name: payload.full_name,
        role: payload.role,
        avatar_url: payload.avatar_url,
        phone: payload.phone,
        address: payload.address,
        city: payload.city,
    };

    state.profiles.insert(profile.id, profile.clone());
    Ok(Json(profile))
}

#[derive(Deserialize)]
pub struct ListProfilesQuery {
    pub role: Option<Role>,
}

async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProfilesQuery>,
) -> Json<Vec<UserProfile>> {
    let profiles = state
        .profiles
        .iter()
        .filter(|entry| query.role.is_none_or(|role| entry.value().role == role))
        .map(|entry| entry.value().clone())
        .collect();

    Json(profiles)
}

#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub online: bool,
}

async fn set_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let profile = state
        .profiles
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("agent {id} not found")))?;

    if profile.role != Role::Delivery {
        return Err(AppError::Validation(format!(
            "profile {id} does not have the delivery role"
        )));
    }

    state.agent_online.insert(id, payload.online);
    debug!(agent_id = %id, online = payload.online, "agent availability changed");

    Ok(Json(json!({ "delivery_agent_id": id, "online": payload.online })))
}

#[derive(Deserialize)]
pub struct ReportLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// One position report from the agent's device. Overwrites the previous
/// fix; only the latest position is ever kept.
async fn report_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReportLocationRequest>,
) -> Result<Json<DeliveryLocation>, AppError> {
    let online = state
        .agent_online
        .get(&id)
        .map(|entry| *entry.value())
        .unwrap_or(false);

    if !online {
        return Err(AppError::Validation(format!(
            "agent {id} is offline and cannot report a location"
        )));
    }

    if !(-90.0..=90.0).contains(&payload.latitude) || !(-180.0..=180.0).contains(&payload.longitude)
    {
        return Err(AppError::Validation(format!(
            "coordinates out of range: ({}, {})",
            payload.latitude, payload.longitude
        )));
    }

    let location = DeliveryLocation {
        delivery_agent_id: id,
        latitude: payload.latitude,
        longitude: payload.longitude,
        updated_at: Utc::now(),
    };

    state.locations.insert(id, location);
    state.metrics.location_updates_total.inc();

    // No subscribers is the normal case; only log genuine send errors once
    // a receiver existed.
    if state.location_events_tx.receiver_count() > 0 {
        if let Err(err) = state.location_events_tx.send(location) {
            warn!(agent_id = %id, error = %err, "failed to broadcast location fix");
        }
    }

    Ok(Json(location))
}

async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryLocation>, AppError> {
    let location = state
        .locations
        .get(&id)
        .map(|entry| *entry.value())
        .ok_or_else(|| AppError::NotFound(format!("no location reported for agent {id}")))?;

    Ok(Json(location))
}
