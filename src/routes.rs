//! Route definitions
//!
//! Every protected route gets an explicit RoutePolicy constructed here at
//! startup and injected into the authorization middleware as layer state.

use crate::middleware::{authorize, RoutePolicy};
use crate::{auth, handlers, AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};

/// All API routes with their authorization policies
pub fn api_routes(state: AppState) -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/register", post(auth::handlers::register))
        .route("/login", post(auth::handlers::login))
        .route(
            "/logout",
            post(auth::handlers::logout).layer(from_fn_with_state(
                (state.clone(), RoutePolicy::any_authenticated()),
                authorize,
            )),
        );

    let user_routes = Router::new()
        .route(
            "/",
            get(handlers::list_users).layer(from_fn_with_state(
                (state.clone(), RoutePolicy::allow(&["Admin", "Moderator"])),
                authorize,
            )),
        )
        .route(
            "/profile",
            get(handlers::get_profile)
                .put(handlers::update_profile)
                .layer(from_fn_with_state(
                    (
                        state.clone(),
                        RoutePolicy::allow(&["User", "Moderator", "Admin"]),
                    ),
                    authorize,
                )),
        )
        .route(
            "/{id}/status",
            patch(handlers::update_user_status).layer(from_fn_with_state(
                (state.clone(), RoutePolicy::allow(&["Admin"])),
                authorize,
            )),
        );

    let role_routes = Router::new()
        .route(
            "/",
            post(handlers::create_role).layer(from_fn_with_state(
                (state.clone(), RoutePolicy::allow(&["Admin"])),
                authorize,
            )),
        )
        .route(
            "/{id}",
            put(handlers::update_role).layer(from_fn_with_state(
                (state, RoutePolicy::allow(&["Admin"])),
                authorize,
            )),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/roles", role_routes)
}
