//! services/web/src/web/home.rs
//!
//! The landing page: sessions split by status, site KPIs and announcements.

use crate::error::PageResult;
use crate::web::state::{AppState, Viewer};
use crate::web::views::{
    AnnouncementView, HomePage, SessionSummarizer, TextStudyTypeView, ViewerView,
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

pub const ALL_TYPES: &str = "all";
pub const DEFAULT_DISPLAY: &str = "grid";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HomeQuery {
    /// Study type name, or `all`.
    #[serde(rename = "type")]
    pub session_type: Option<String>,
    /// `grid` or `list`.
    pub display: Option<String>,
}

/// GET / - Sessions, KPIs and announcements
#[utoipa::path(
    get,
    path = "/",
    params(HomeQuery),
    responses(
        (status = 200, description = "Home page", body = HomePage)
    )
)]
pub async fn home_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<HomeQuery>,
) -> PageResult<Json<HomePage>> {
    let session_type = query
        .session_type
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| ALL_TYPES.to_string());
    let display_type = query
        .display
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DISPLAY.to_string());

    let text_study_types = state.db.list_text_study_types().await?;

    let sessions = if session_type == ALL_TYPES {
        state.db.list_sessions(None).await?
    } else {
        match text_study_types.iter().find(|t| t.name == session_type) {
            Some(t) => state.db.list_sessions(Some(t.id)).await?,
            None => Vec::new(),
        }
    };

    let summaries = SessionSummarizer::new(&state).summarize_all(&sessions).await?;
    let (completed_sessions, ongoing_sessions): (Vec<_>, Vec<_>) =
        summaries.into_iter().partition(|s| s.is_completed);

    let announcements = state.db.list_active_announcements(Utc::now()).await?;

    Ok(Json(HomePage {
        viewer: viewer.person.as_ref().map(ViewerView::from),
        total_sessions: sessions.len(),
        total_ongoing_sessions: ongoing_sessions.len(),
        total_completed_sessions: completed_sessions.len(),
        total_users: state.db.count_accounts().await?,
        total_participants: state.db.count_participants().await?,
        session_type,
        display_type,
        ongoing_sessions,
        completed_sessions,
        text_study_types: text_study_types.iter().map(TextStudyTypeView::from).collect(),
        announcements: announcements.iter().map(AnnouncementView::from).collect(),
    }))
}
