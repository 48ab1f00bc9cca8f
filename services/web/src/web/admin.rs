//! services/web/src/web/admin.rs
//!
//! The admin console. Every route here sits behind `require_admin`.

use crate::error::PageResult;
use crate::web::forms::{AnnouncementForm, TextStudyForm, TextStudyTypeForm};
use crate::web::state::AppState;
use crate::web::views::{
    ActionResult, AnnouncementView, ReservationView, SessionSummarizer, SessionSummary,
    TextStudyRow, TextStudyTypeView,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Form, Json,
};
use garde::Validate;
use gemara_chain_core::{NewAnnouncement, NewTextStudy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOverview {
    pub accounts: i64,
    pub participants: i64,
    pub text_study_types: usize,
    pub sessions: usize,
    pub reservations: usize,
    pub announcements: usize,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TextStudyQuery {
    /// Restrict the listing to one study type.
    pub type_id: Option<Uuid>,
}

/// GET /admin/ - Row counts
#[utoipa::path(
    get,
    path = "/admin/",
    responses(
        (status = 200, description = "Console overview", body = AdminOverview),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn overview_handler(State(state): State<Arc<AppState>>) -> PageResult<Json<AdminOverview>> {
    Ok(Json(AdminOverview {
        accounts: state.db.count_accounts().await?,
        participants: state.db.count_participants().await?,
        text_study_types: state.db.list_text_study_types().await?.len(),
        sessions: state.db.list_sessions(None).await?.len(),
        reservations: state.db.list_all_reservations().await?.len(),
        announcements: state.db.list_announcements().await?.len(),
    }))
}

//=========================================================================================
// Catalog
//=========================================================================================

#[utoipa::path(
    get,
    path = "/admin/text-study-types/",
    responses((status = 200, description = "Study types", body = Vec<TextStudyTypeView>))
)]
pub async fn list_types_handler(
    State(state): State<Arc<AppState>>,
) -> PageResult<Json<Vec<TextStudyTypeView>>> {
    let types = state.db.list_text_study_types().await?;
    Ok(Json(types.iter().map(TextStudyTypeView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/text-study-types/",
    request_body(content = TextStudyTypeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Study type created or already present", body = TextStudyTypeView),
        (status = 400, description = "Empty name")
    )
)]
pub async fn create_type_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TextStudyTypeForm>,
) -> PageResult<(StatusCode, Json<TextStudyTypeView>)> {
    form.validate_with(&())?;
    let study_type = state.db.ensure_text_study_type(form.name.trim()).await?;
    info!(study_type = %study_type.name, "Study type ensured");
    Ok((StatusCode::CREATED, Json(TextStudyTypeView::from(&study_type))))
}

#[utoipa::path(
    get,
    path = "/admin/text-studies/",
    params(TextStudyQuery),
    responses((status = 200, description = "Text studies in catalog order", body = Vec<TextStudyRow>))
)]
pub async fn list_text_studies_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TextStudyQuery>,
) -> PageResult<Json<Vec<TextStudyRow>>> {
    let type_ids = match query.type_id {
        Some(type_id) => vec![state.db.get_text_study_type(type_id).await?.id],
        None => state
            .db
            .list_text_study_types()
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect(),
    };

    let mut rows = Vec::new();
    for type_id in type_ids {
        let studies = state.db.list_text_studies(type_id).await?;
        rows.extend(studies.iter().map(TextStudyRow::from));
    }
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/admin/text-studies/",
    request_body(content = TextStudyForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Text study created", body = TextStudyRow),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Unknown study type")
    )
)]
pub async fn create_text_study_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TextStudyForm>,
) -> PageResult<(StatusCode, Json<TextStudyRow>)> {
    form.validate_with(&())?;
    let study_type = state.db.get_text_study_type(form.type_id).await?;

    // Ungrouped texts are shown under their type name.
    let book = match form.book.trim() {
        "" => study_type.name.clone(),
        book => book.to_string(),
    };

    let text_study = state
        .db
        .create_text_study(NewTextStudy {
            type_id: study_type.id,
            name: form.name.trim().to_string(),
            book,
            link: form.link.trim().to_string(),
            total_sections: form.total_sections,
        })
        .await?;
    info!(study_type = %study_type.name, text_study = %text_study.name, "Text study created");
    Ok((StatusCode::CREATED, Json(TextStudyRow::from(&text_study))))
}

#[utoipa::path(
    post,
    path = "/admin/text-studies/{id}/delete/",
    params(("id" = Uuid, Path, description = "Text study id")),
    responses(
        (status = 200, description = "Text study and its reservations deleted", body = ActionResult),
        (status = 404, description = "Unknown text study")
    )
)]
pub async fn delete_text_study_handler(
    State(state): State<Arc<AppState>>,
    Path(text_study_id): Path<Uuid>,
) -> PageResult<Json<ActionResult>> {
    state.db.delete_text_study(text_study_id).await?;
    info!(text_study = %text_study_id, "Text study deleted");
    Ok(Json(ActionResult::ok()))
}

//=========================================================================================
// Sessions & Reservations
//=========================================================================================

#[utoipa::path(
    get,
    path = "/admin/sessions/",
    responses((status = 200, description = "Every session, newest first", body = Vec<SessionSummary>))
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
) -> PageResult<Json<Vec<SessionSummary>>> {
    let sessions = state.db.list_sessions(None).await?;
    let summaries = SessionSummarizer::new(&state).summarize_all(&sessions).await?;
    Ok(Json(summaries))
}

#[utoipa::path(
    get,
    path = "/admin/reservations/",
    responses((status = 200, description = "Every reservation", body = Vec<ReservationView>))
)]
pub async fn list_reservations_handler(
    State(state): State<Arc<AppState>>,
) -> PageResult<Json<Vec<ReservationView>>> {
    let sessions = state.db.list_sessions(None).await?;
    let reservations = state.db.list_all_reservations().await?;

    let mut text_study_names = HashMap::new();
    for study_type in state.db.list_text_study_types().await? {
        for ts in state.db.list_text_studies(study_type.id).await? {
            text_study_names.insert(ts.id, ts.name);
        }
    }
    let sessions_by_id: HashMap<_, _> = sessions.iter().map(|s| (s.id, s)).collect();

    Ok(Json(
        reservations
            .iter()
            .map(|r| {
                ReservationView::new(
                    r,
                    sessions_by_id.get(&r.session_id).copied(),
                    text_study_names.get(&r.text_study_id).cloned(),
                )
            })
            .collect(),
    ))
}

//=========================================================================================
// Announcements
//=========================================================================================

#[utoipa::path(
    get,
    path = "/admin/announcements/",
    responses((status = 200, description = "Every announcement", body = Vec<AnnouncementView>))
)]
pub async fn list_announcements_handler(
    State(state): State<Arc<AppState>>,
) -> PageResult<Json<Vec<AnnouncementView>>> {
    let announcements = state.db.list_announcements().await?;
    Ok(Json(announcements.iter().map(AnnouncementView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/announcements/",
    request_body(content = AnnouncementForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Announcement created", body = AnnouncementView),
        (status = 400, description = "Invalid form")
    )
)]
pub async fn create_announcement_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AnnouncementForm>,
) -> PageResult<(StatusCode, Json<AnnouncementView>)> {
    let (start_date, end_date) = form.window()?;
    let link = Some(form.link.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    let announcement = state
        .db
        .create_announcement(NewAnnouncement {
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
            link,
            start_date,
            end_date,
        })
        .await?;
    info!(announcement = %announcement.id, "Announcement created");
    Ok((StatusCode::CREATED, Json(AnnouncementView::from(&announcement))))
}

#[utoipa::path(
    post,
    path = "/admin/announcements/{id}/delete/",
    params(("id" = Uuid, Path, description = "Announcement id")),
    responses(
        (status = 200, description = "Announcement deleted", body = ActionResult),
        (status = 404, description = "Unknown announcement")
    )
)]
pub async fn delete_announcement_handler(
    State(state): State<Arc<AppState>>,
    Path(announcement_id): Path<Uuid>,
) -> PageResult<Json<ActionResult>> {
    state.db.delete_announcement(announcement_id).await?;
    info!(announcement = %announcement_id, "Announcement deleted");
    Ok(Json(ActionResult::ok()))
}
