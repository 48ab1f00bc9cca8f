//! services/web/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use crate::web::{admin, auth, forms, home, profile, reservations, sessions, views};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        home::home_handler,
        auth::login_page,
        auth::login_handler,
        auth::signup_page,
        auth::signup_handler,
        auth::logout_handler,
        profile::profile_handler,
        sessions::create_session_page,
        sessions::create_session_handler,
        sessions::session_detail_handler,
        sessions::reserve_handler,
        sessions::update_session_handler,
        sessions::delete_session_handler,
        reservations::mark_completed_handler,
        admin::overview_handler,
        admin::list_types_handler,
        admin::create_type_handler,
        admin::list_text_studies_handler,
        admin::create_text_study_handler,
        admin::delete_text_study_handler,
        admin::list_sessions_handler,
        admin::list_reservations_handler,
        admin::list_announcements_handler,
        admin::create_announcement_handler,
        admin::delete_announcement_handler,
    ),
    components(
        schemas(
            forms::LoginForm,
            forms::SignupForm,
            forms::CreateSessionForm,
            forms::UpdateSessionForm,
            forms::TextStudyTypeForm,
            forms::TextStudyForm,
            forms::AnnouncementForm,
            views::FormPage,
            views::ActionResult,
            views::HomePage,
            views::SessionSummary,
            views::SessionDetailPage,
            views::BookView,
            views::TextStudyView,
            views::SectionView,
            views::CreateSessionPage,
            views::ProfilePage,
            views::ReservationView,
            views::TextStudyRow,
            admin::AdminOverview,
        )
    ),
    tags(
        (name = "GemaraChain", description = "Communal study sessions: reserve a tractate, a chapter or a psalm and complete the canon together.")
    )
)]
pub struct ApiDoc;
