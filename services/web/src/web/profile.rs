//! services/web/src/web/profile.rs
//!
//! The member's own page: sessions they run, sessions they joined, and
//! every slot they hold.

use crate::error::{PageError, PageResult};
use crate::web::state::{AppState, Viewer};
use crate::web::views::{ProfilePage, ReservationView, SessionSummarizer, ViewerView};
use axum::{extract::State, Extension, Json};
use std::collections::HashMap;
use std::sync::Arc;

/// GET /profile/ - Owned sessions, joined sessions and reservations
#[utoipa::path(
    get,
    path = "/profile/",
    responses(
        (status = 200, description = "Profile page", body = ProfilePage),
        (status = 303, description = "Not logged in, redirected to /login/")
    )
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> PageResult<Json<ProfilePage>> {
    let person = viewer.person.as_ref().ok_or(PageError::LoginRequired)?;

    let owned = state.db.list_sessions_by_owner(person.id).await?;
    let joined = state.db.list_sessions_reserved_by(person.id).await?;
    let reservations = state.db.list_reservations_by_person(person.id).await?;

    let mut summarizer = SessionSummarizer::new(&state);
    let user_sessions = summarizer.summarize_all(&owned).await?;
    let reserved_sessions = summarizer.summarize_all(&joined).await?;
    let text_study_names = summarizer.text_study_names();

    let sessions_by_id: HashMap<_, _> = joined.iter().map(|s| (s.id, s)).collect();
    let reservations = reservations
        .iter()
        .map(|r| {
            ReservationView::new(
                r,
                sessions_by_id.get(&r.session_id).copied(),
                text_study_names.get(&r.text_study_id).cloned(),
            )
        })
        .collect();

    Ok(Json(ProfilePage {
        person: ViewerView::from(person),
        email: person.email.clone(),
        user_sessions,
        reserved_sessions,
        reservations,
    }))
}
