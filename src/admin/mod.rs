pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use crate::http::server::AppState;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Admin routes, guarded by the bearer key when one is configured.
pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/rate-limiting", get(get_rate_limiting).post(set_rate_limiting))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
