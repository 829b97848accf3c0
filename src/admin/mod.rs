//! Admin API: read-only inspection plus guarded enable/disable.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::executor::PathExecutor;
use crate::hub::Hub;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State injected into admin handlers.
pub struct AdminState<E> {
    pub hub: Hub<E>,
    pub api_key: Arc<str>,
}

impl<E> Clone for AdminState<E> {
    fn clone(&self) -> Self {
        Self {
            hub: self.hub.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

pub fn setup_admin_router<E: PathExecutor>(hub: Hub<E>, api_key: &str) -> Router {
    let state = AdminState {
        hub,
        api_key: Arc::from(api_key),
    };

    let guarded = Router::new()
        .route("/admin/paths/{name}/enable", post(enable_path::<E>))
        .route("/admin/paths/{name}/disable", post(disable_path::<E>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware::<E>,
        ));

    Router::new()
        .route("/admin/status", get(get_status::<E>))
        .route("/admin/paths", get(get_paths::<E>))
        .route("/admin/paths/{name}/history", get(get_path_history::<E>))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
