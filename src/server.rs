use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{api, auth, state::AppState, ws};

pub fn router(state: Arc<AppState>) -> Router {
    // WebSocket route behind the session check
    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let api_routes = Router::new()
        .route("/api/signin", post(api::sign_in))
        .route("/api/rooms", get(api::list_rooms))
        .route("/api/rooms/{room_id}", get(api::room_snapshot));

    Router::new()
        .merge(ws_routes)
        .merge(api_routes)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
