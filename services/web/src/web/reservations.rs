//! services/web/src/web/reservations.rs
//!
//! Lets a holder mark their own reservation as studied, or undo it.

use crate::error::{PageError, PageResult};
use crate::web::state::{AppState, Viewer};
use crate::web::views::ActionResult;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use gemara_chain_core::Participant;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Model names accepted in the URL. Both address the same reservation rows.
const RESERVATION_MODELS: [&str; 2] = ["reservation", "textstudyreservation"];

/// POST /mark_completed/{model}/{id}/ - Toggle whether the holder finished studying
#[utoipa::path(
    post,
    path = "/mark_completed/{model}/{id}/",
    params(
        ("model" = String, Path, description = "`reservation` or `textstudyreservation`"),
        ("id" = Uuid, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "New completion state", body = ActionResult),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Reservation held by someone else"),
        (status = 404, description = "Unknown model or reservation")
    )
)]
pub async fn mark_completed_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path((model, reservation_id)): Path<(String, Uuid)>,
) -> PageResult<Json<ActionResult>> {
    let person = viewer.require_person()?;
    if !RESERVATION_MODELS.contains(&model.as_str()) {
        return Err(PageError::NotFound);
    }

    let reservation = state.db.get_reservation(reservation_id).await?;
    if reservation.participant != Participant::Person(person.id) {
        return Err(PageError::Forbidden);
    }

    let is_completed = !reservation.is_completed;
    state
        .db
        .set_reservation_completed(reservation.id, is_completed)
        .await?;
    info!(reservation = %reservation.id, is_completed, "Reservation completion toggled");

    Ok(Json(ActionResult {
        success: true,
        is_completed: Some(is_completed),
    }))
}
