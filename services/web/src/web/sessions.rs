//! services/web/src/web/sessions.rs
//!
//! Study session pages: creation, detail with the reservation form, and the
//! owner's update and delete actions.

use crate::error::{PageError, PageResult};
use crate::web::forms::{CreateSessionForm, ReservationForm, UpdateSessionForm};
use crate::web::state::{AppState, Viewer};
use crate::web::views::{
    build_books, summary_of, ActionResult, AnnouncementView, CreateSessionPage, FormPage,
    SessionDetailPage, TextStudyTypeView, ViewerView,
};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use chrono::Utc;
use gemara_chain_core::ports::{DatabaseService, PortError};
use gemara_chain_core::reservation::{plan_reservations, validate_key};
use gemara_chain_core::slug::{slugify, unique_slug};
use gemara_chain_core::{NewReservation, NewSession, Participant, Session};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Attempts before giving up on a slug lost to concurrent creations.
const SLUG_ATTEMPTS: usize = 5;

fn session_path(slug: &str) -> String {
    format!("/session/{}/", slug)
}

/// Inserts the session under the first free slug derived from its name.
pub async fn create_with_unique_slug(
    db: &dyn DatabaseService,
    mut session: NewSession,
) -> PageResult<Session> {
    let base = slugify(&session.name);
    for _ in 0..SLUG_ATTEMPTS {
        let taken = db.find_slugs_with_prefix(&base).await?;
        session.slug = unique_slug(&base, &taken);
        match db.create_session(session.clone()).await {
            Ok(created) => return Ok(created),
            Err(PortError::Conflict(_)) => {
                warn!("Slug '{}' was taken concurrently, retrying", session.slug);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(PageError::Conflict(format!(
        "Could not allocate a unique slug for '{}'",
        session.name
    )))
}

//=========================================================================================
// Create Session
//=========================================================================================

/// GET /create-session/ - Study types to choose from
#[utoipa::path(
    get,
    path = "/create-session/",
    responses(
        (status = 200, description = "Session creation form", body = CreateSessionPage),
        (status = 303, description = "Not logged in, redirected to /login/")
    )
)]
pub async fn create_session_page(
    State(state): State<Arc<AppState>>,
) -> PageResult<Json<CreateSessionPage>> {
    let types = state.db.list_text_study_types().await?;
    Ok(Json(CreateSessionPage {
        form: FormPage::new(
            "create-session",
            &["name", "description", "date_limit", "session_type"],
        ),
        text_study_types: types.iter().map(TextStudyTypeView::from).collect(),
    }))
}

/// POST /create-session/ - Create a session owned by the viewer
#[utoipa::path(
    post,
    path = "/create-session/",
    request_body(content = CreateSessionForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Session created, redirected to its page"),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Unknown study type")
    )
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Form(form): Form<CreateSessionForm>,
) -> PageResult<Response> {
    let person = viewer.person.as_ref().ok_or(PageError::LoginRequired)?;
    let valid = form.validated(state.today())?;
    let study_type = state.db.get_text_study_type(valid.type_id).await?;

    let session = create_with_unique_slug(
        state.db.as_ref(),
        NewSession {
            name: valid.name,
            description: valid.description,
            deadline: valid.deadline,
            slug: String::new(),
            owner_id: Some(person.id),
            type_id: study_type.id,
        },
    )
    .await?;

    info!(
        slug = %session.slug,
        study_type = %study_type.name,
        "Session created by '{}'",
        person.username
    );
    Ok(Redirect::to(&session_path(&session.slug)).into_response())
}

//=========================================================================================
// Session Detail & Reservations
//=========================================================================================

/// GET /session/{slug}/ - Session detail with every slot and its holder
#[utoipa::path(
    get,
    path = "/session/{slug}/",
    params(("slug" = String, Path, description = "Session slug")),
    responses(
        (status = 200, description = "Session detail", body = SessionDetailPage),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn session_detail_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(slug): Path<String>,
) -> PageResult<Json<SessionDetailPage>> {
    let session = state.db.get_session_by_slug(&slug).await?;
    let study_type = state.db.get_text_study_type(session.type_id).await?;
    let text_studies = state.db.list_text_studies(session.type_id).await?;
    let reservations = state.db.list_reservations_for_session(session.id).await?;
    let announcements = state.db.list_active_announcements(Utc::now()).await?;

    let viewer_participant = viewer.person.as_ref().map(|p| Participant::Person(p.id));

    Ok(Json(SessionDetailPage {
        viewer: viewer.person.as_ref().map(ViewerView::from),
        can_edit: viewer.person.as_ref().is_some_and(|p| session.is_owned_by(p.id)),
        books: build_books(&text_studies, &reservations, viewer_participant),
        session: summary_of(&session, &study_type, &text_studies, &reservations, state.today()),
        announcements: announcements.iter().map(AnnouncementView::from).collect(),
    }))
}

/// POST /session/{slug}/ - Reserve and release slots
///
/// A logged-in person submits the full set of slots they want to hold, so
/// unchecked slots are released. Guests can only add.
#[utoipa::path(
    post,
    path = "/session/{slug}/",
    params(("slug" = String, Path, description = "Session slug")),
    request_body(
        content_type = "application/x-www-form-urlencoded",
        description = "Repeated `sections` (`<text_study_id>-<n>`) and `text_studies` (`<text_study_id>`) fields, plus `guest_name` and `guest_email` for guests."
    ),
    responses(
        (status = 303, description = "Reservations saved, redirected back"),
        (status = 400, description = "Malformed slot or missing guest identity"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn reserve_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(slug): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> PageResult<Response> {
    let session = state.db.get_session_by_slug(&slug).await?;
    let back = Redirect::to(&session_path(&session.slug)).into_response();

    if session.is_expired(state.today()) {
        info!(slug = %session.slug, "Ignoring reservations on an expired session");
        return Ok(back);
    }

    let form = ReservationForm::from_pairs(pairs);
    let desired = form.keys()?;
    let text_studies = state.db.list_text_studies(session.type_id).await?;
    for key in &desired {
        validate_key(key, &text_studies).map_err(|e| PageError::validation(e.to_string()))?;
    }

    let (participant, replace) = match &viewer.person {
        Some(person) => (Participant::Person(person.id), true),
        None if desired.is_empty() => return Ok(back),
        None => {
            let identity = form.guest_identity()?;
            let guest = state
                .db
                .get_or_create_guest(&identity.name, &identity.email)
                .await?;
            (Participant::Guest(guest.id), false)
        }
    };

    let existing = state.db.list_reservations_for_session(session.id).await?;
    let plan = plan_reservations(&existing, participant, &desired, replace);
    if plan.is_empty() {
        if !plan.rejected.is_empty() {
            warn!(
                slug = %session.slug,
                rejected = plan.rejected.len(),
                "Requested slots are held by someone else"
            );
        }
        return Ok(back);
    }

    for reservation_id in &plan.to_remove {
        state.db.delete_reservation(*reservation_id).await?;
    }

    let mut rejected = plan.rejected.len();
    let mut added = 0;
    for key in &plan.to_add {
        let new = NewReservation {
            session_id: session.id,
            text_study_id: key.text_study_id,
            section: key.section,
            participant,
        };
        match state.db.create_reservation(new).await {
            Ok(_) => added += 1,
            Err(PortError::Conflict(_)) => rejected += 1,
            Err(e) => return Err(e.into()),
        }
    }

    if rejected > 0 {
        warn!(slug = %session.slug, rejected, "Some requested slots are held by someone else");
    }
    info!(
        slug = %session.slug,
        added,
        removed = plan.to_remove.len(),
        "Reservations updated"
    );
    Ok(back)
}

//=========================================================================================
// Owner Actions
//=========================================================================================

/// Loads a session only when the viewer owns it. Other sessions look missing.
async fn owned_session(state: &AppState, viewer: &Viewer, session_id: Uuid) -> PageResult<Session> {
    let person = viewer.require_person()?;
    let session = state.db.get_session_by_id(session_id).await?;
    if !session.is_owned_by(person.id) {
        return Err(PageError::NotFound);
    }
    Ok(session)
}

/// POST /update-session/{id}/ - Edit name, description and deadline
#[utoipa::path(
    post,
    path = "/update-session/{id}/",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body(content = UpdateSessionForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session updated", body = ActionResult),
        (status = 400, description = "Invalid form"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Unknown session or not the owner")
    )
)]
pub async fn update_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(session_id): Path<Uuid>,
    Form(form): Form<UpdateSessionForm>,
) -> PageResult<Json<ActionResult>> {
    let session = owned_session(&state, &viewer, session_id).await?;
    let update = form.validated(state.today())?;
    let updated = state.db.update_session(session.id, update).await?;
    info!(slug = %updated.slug, "Session updated");
    Ok(Json(ActionResult::ok()))
}

/// POST /delete-session/{id}/ - Delete a session and its reservations
#[utoipa::path(
    post,
    path = "/delete-session/{id}/",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session deleted", body = ActionResult),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Unknown session or not the owner")
    )
)]
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(session_id): Path<Uuid>,
) -> PageResult<Json<ActionResult>> {
    let session = owned_session(&state, &viewer, session_id).await?;
    state.db.delete_session(session.id).await?;
    info!(slug = %session.slug, "Session deleted");
    Ok(Json(ActionResult::ok()))
}
