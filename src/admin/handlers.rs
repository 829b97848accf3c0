use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::executor::PathExecutor;
use crate::health::{HealthSample, HealthStatus};
use crate::hub::ToggleError;
use crate::registry::PathSnapshot;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub paths_total: usize,
    pub paths_enabled: usize,
    pub paths_routable: usize,
}

#[derive(Debug, Serialize)]
pub struct EnabledChange {
    pub name: String,
    pub enabled: bool,
}

pub async fn get_status<E: PathExecutor>(
    State(state): State<AdminState<E>>,
) -> Json<SystemStatus> {
    let snapshot = state.hub.snapshot();
    let paths_enabled = snapshot.iter().filter(|p| p.enabled).count();
    let paths_routable = snapshot
        .iter()
        .filter(|p| p.enabled && p.status != HealthStatus::Unhealthy)
        .count();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if paths_routable > 0 { "operational" } else { "unavailable" },
        paths_total: snapshot.len(),
        paths_enabled,
        paths_routable,
    })
}

pub async fn get_paths<E: PathExecutor>(
    State(state): State<AdminState<E>>,
) -> Json<Vec<PathSnapshot>> {
    Json(state.hub.snapshot())
}

pub async fn get_path_history<E: PathExecutor>(
    State(state): State<AdminState<E>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<HealthSample>>, StatusCode> {
    state.hub.history(&name).map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn enable_path<E: PathExecutor>(
    State(state): State<AdminState<E>>,
    Path(name): Path<String>,
) -> Result<Json<EnabledChange>, StatusCode> {
    set_enabled(&state, name, true)
}

pub async fn disable_path<E: PathExecutor>(
    State(state): State<AdminState<E>>,
    Path(name): Path<String>,
) -> Result<Json<EnabledChange>, StatusCode> {
    set_enabled(&state, name, false)
}

fn set_enabled<E: PathExecutor>(
    state: &AdminState<E>,
    name: String,
    enabled: bool,
) -> Result<Json<EnabledChange>, StatusCode> {
    match state.hub.set_enabled(&name, enabled) {
        Ok(()) => {}
        Err(ToggleError::UnknownPath(_)) => return Err(StatusCode::NOT_FOUND),
        Err(ToggleError::Unavailable(_)) => return Err(StatusCode::CONFLICT),
    }
    tracing::info!(path = %name, enabled, "Path toggled via admin API");
    Ok(Json(EnabledChange { name, enabled }))
}
