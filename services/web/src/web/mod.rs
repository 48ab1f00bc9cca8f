pub mod admin;
pub mod auth;
pub mod forms;
pub mod home;
pub mod middleware;
pub mod profile;
pub mod reservations;
pub mod rest;
pub mod sessions;
pub mod state;
pub mod views;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use middleware::{load_viewer, require_admin, require_login};
pub use state::{AppState, Viewer};

/// Builds every page route. CORS and Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Anonymous visitors are welcome here
    let public_routes = Router::new()
        .route("/", get(home::home_handler))
        .route("/login/", get(auth::login_page).post(auth::login_handler))
        .route("/signup/", get(auth::signup_page).post(auth::signup_handler))
        .route("/logout/", get(auth::logout_handler).post(auth::logout_handler))
        .route(
            "/session/{slug}/",
            get(sessions::session_detail_handler).post(sessions::reserve_handler),
        )
        // JSON actions answer 401 themselves
        .route("/delete-session/{id}/", post(sessions::delete_session_handler))
        .route("/update-session/{id}/", post(sessions::update_session_handler))
        .route(
            "/mark_completed/{model}/{id}/",
            post(reservations::mark_completed_handler),
        );

    // Member pages redirect to /login/
    let member_routes = Router::new()
        .route("/profile/", get(profile::profile_handler))
        .route(
            "/create-session/",
            get(sessions::create_session_page).post(sessions::create_session_handler),
        )
        .route_layer(axum_middleware::from_fn(require_login));

    let admin_routes = Router::new()
        .route("/admin/", get(admin::overview_handler))
        .route(
            "/admin/text-study-types/",
            get(admin::list_types_handler).post(admin::create_type_handler),
        )
        .route(
            "/admin/text-studies/",
            get(admin::list_text_studies_handler).post(admin::create_text_study_handler),
        )
        .route(
            "/admin/text-studies/{id}/delete/",
            post(admin::delete_text_study_handler),
        )
        .route("/admin/sessions/", get(admin::list_sessions_handler))
        .route("/admin/reservations/", get(admin::list_reservations_handler))
        .route(
            "/admin/announcements/",
            get(admin::list_announcements_handler).post(admin::create_announcement_handler),
        )
        .route(
            "/admin/announcements/{id}/delete/",
            post(admin::delete_announcement_handler),
        )
        .route_layer(axum_middleware::from_fn(require_admin));

    Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .merge(admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            load_viewer,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
