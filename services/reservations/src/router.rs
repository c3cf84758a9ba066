use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use slotbook_core::health::healthz;
use slotbook_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    maintenance::{initialize, readyz},
    reservation::create_reservation,
    schedule::{create_schedule, get_schedule, list_schedules},
    session::get_session,
    user::{login, signup},
};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default)]
pub struct RouterOptions {
    /// Mount the destructive `POST /initialize` endpoint.
    pub enable_initialize: bool,
}

pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    let mut router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Session
        .route("/api/session", get(get_session))
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        // Schedules
        .route("/api/schedules", post(create_schedule))
        .route("/api/schedules", get(list_schedules))
        .route("/api/schedules/{id}", get(get_schedule))
        // Reservations
        .route("/api/reservations", post(create_reservation));

    if options.enable_initialize {
        router = router.route("/initialize", post(initialize));
    }

    router
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
