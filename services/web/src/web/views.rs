//! services/web/src/web/views.rs
//!
//! Page payloads rendered by the handlers, and the builders that derive
//! them from domain rows.

use crate::web::state::AppState;
use chrono::{DateTime, NaiveDate, Utc};
use gemara_chain_core::completion::{self, coverage_by_text_study};
use gemara_chain_core::ports::{PortError, PortResult};
use gemara_chain_core::reservation::ReservationKey;
use gemara_chain_core::{Announcement, Participant, Person, Reservation, Session, TextStudy, TextStudyType};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Shared Payloads
//=========================================================================================

/// Describes a form page: which fields to post back.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormPage {
    pub form: String,
    pub fields: Vec<String>,
}

impl FormPage {
    pub fn new(form: &str, fields: &[&str]) -> Self {
        Self {
            form: form.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Body of the JSON actions (update, delete, mark completed).
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            is_completed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ViewerView {
    pub person_id: Uuid,
    pub username: String,
    pub name: String,
    pub is_admin: bool,
}

impl From<&Person> for ViewerView {
    fn from(person: &Person) -> Self {
        Self {
            person_id: person.id,
            username: person.username.clone(),
            name: person.name.clone(),
            is_admin: person.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TextStudyTypeView {
    pub id: Uuid,
    pub name: String,
}

impl From<&TextStudyType> for TextStudyTypeView {
    fn from(t: &TextStudyType) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnnouncementView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<&Announcement> for AnnouncementView {
    fn from(a: &Announcement) -> Self {
        Self {
            id: a.id,
            title: a.title.clone(),
            description: a.description.clone(),
            link: a.link.clone(),
            start_date: a.start_date,
            end_date: a.end_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TextStudyRow {
    pub id: Uuid,
    pub type_id: Uuid,
    pub name: String,
    pub book: String,
    pub link: String,
    pub total_sections: u32,
}

impl From<&TextStudy> for TextStudyRow {
    fn from(ts: &TextStudy) -> Self {
        Self {
            id: ts.id,
            type_id: ts.type_id,
            name: ts.name.clone(),
            book: ts.book.clone(),
            link: ts.link.clone(),
            total_sections: ts.total_sections,
        }
    }
}

//=========================================================================================
// Session Summaries
//=========================================================================================

/// A session as listed on the home, profile and admin pages.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    /// `YYYY-MM-DD`
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub owner_id: Option<Uuid>,
    pub type_id: Uuid,
    pub type_name: String,
    pub is_expired: bool,
    pub is_completed: bool,
    pub covered_units: usize,
    pub total_units: usize,
}

/// Caches the catalog of each type while summarising many sessions.
pub struct SessionSummarizer<'a> {
    state: &'a AppState,
    today: NaiveDate,
    catalogs: HashMap<Uuid, (TextStudyType, Vec<TextStudy>)>,
}

impl<'a> SessionSummarizer<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            today: state.today(),
            state,
            catalogs: HashMap::new(),
        }
    }

    async fn catalog(&mut self, type_id: Uuid) -> PortResult<&(TextStudyType, Vec<TextStudy>)> {
        if !self.catalogs.contains_key(&type_id) {
            let study_type = self.state.db.get_text_study_type(type_id).await?;
            let text_studies = self.state.db.list_text_studies(type_id).await?;
            self.catalogs.insert(type_id, (study_type, text_studies));
        }
        self.catalogs
            .get(&type_id)
            .ok_or_else(|| PortError::Unexpected("catalog cache miss".into()))
    }

    pub async fn summarize(&mut self, session: &Session) -> PortResult<SessionSummary> {
        let reservations = self.state.db.list_reservations_for_session(session.id).await?;
        let today = self.today;
        let (study_type, text_studies) = self.catalog(session.type_id).await?;
        Ok(summary_of(session, study_type, text_studies, &reservations, today))
    }

    pub async fn summarize_all(&mut self, sessions: &[Session]) -> PortResult<Vec<SessionSummary>> {
        let mut summaries = Vec::with_capacity(sessions.len());
        for session in sessions {
            summaries.push(self.summarize(session).await?);
        }
        Ok(summaries)
    }

    /// Text study names across every type seen so far.
    pub fn text_study_names(&self) -> HashMap<Uuid, String> {
        self.catalogs
            .values()
            .flat_map(|(_, studies)| studies.iter().map(|ts| (ts.id, ts.name.clone())))
            .collect()
    }
}

pub fn summary_of(
    session: &Session,
    study_type: &TextStudyType,
    text_studies: &[TextStudy],
    reservations: &[Reservation],
    today: NaiveDate,
) -> SessionSummary {
    SessionSummary {
        id: session.id,
        name: session.name.clone(),
        description: session.description.clone(),
        slug: session.slug.clone(),
        deadline: session.deadline,
        created_at: session.created_at,
        owner_id: session.owner_id,
        type_id: session.type_id,
        type_name: study_type.name.clone(),
        is_expired: session.is_expired(today),
        is_completed: completion::is_session_complete(session, text_studies, reservations, today),
        covered_units: completion::covered_units(text_studies, reservations),
        total_units: text_studies.len(),
    }
}

//=========================================================================================
// Home
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct HomePage {
    pub viewer: Option<ViewerView>,
    /// Selected type filter, `all` when unfiltered.
    pub session_type: String,
    /// `grid` or `list`.
    pub display_type: String,
    pub ongoing_sessions: Vec<SessionSummary>,
    pub completed_sessions: Vec<SessionSummary>,
    pub total_sessions: usize,
    pub total_ongoing_sessions: usize,
    pub total_completed_sessions: usize,
    pub total_users: i64,
    pub total_participants: i64,
    pub text_study_types: Vec<TextStudyTypeView>,
    pub announcements: Vec<AnnouncementView>,
}

//=========================================================================================
// Session Detail
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionDetailPage {
    pub viewer: Option<ViewerView>,
    pub session: SessionSummary,
    pub can_edit: bool,
    pub books: Vec<BookView>,
    pub announcements: Vec<AnnouncementView>,
}

/// Text studies sharing a `book`, in catalog order.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookView {
    pub name: String,
    pub text_studies: Vec<TextStudyView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TextStudyView {
    pub id: Uuid,
    pub name: String,
    pub link: String,
    pub total_sections: u32,
    /// Form value for a whole-unit reservation.
    pub value: String,
    /// Holder of the whole unit, if reserved as a whole.
    pub reserved_by: Option<String>,
    pub reserved_by_viewer: bool,
    pub whole_reservation_id: Option<Uuid>,
    pub all_sections_reserved: bool,
    pub is_covered: bool,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SectionView {
    pub section: u32,
    /// Form value: `<text_study_id>-<section>`.
    pub value: String,
    pub chosen_by_name: Option<String>,
    pub reserved_by_viewer: bool,
    pub reservation_id: Option<Uuid>,
    pub is_completed: bool,
}

/// Groups the catalog by book, in order of first appearance, and annotates
/// every slot with its holder.
pub fn build_books(
    text_studies: &[TextStudy],
    reservations: &[Reservation],
    viewer: Option<Participant>,
) -> Vec<BookView> {
    let by_key: HashMap<ReservationKey, &Reservation> = reservations
        .iter()
        .map(|r| (ReservationKey::of(r), r))
        .collect();
    let coverage = coverage_by_text_study(reservations);
    let held_by_viewer = |r: &Reservation| viewer.is_some_and(|p| p == r.participant);

    let mut books: Vec<BookView> = Vec::new();
    let mut book_index: HashMap<String, usize> = HashMap::new();
    for text_study in text_studies {
        let whole = by_key.get(&ReservationKey::whole(text_study.id)).copied();
        let text_coverage = coverage.get(&text_study.id).cloned().unwrap_or_default();

        let sections = (1..=text_study.total_sections)
            .map(|section| {
                let key = ReservationKey::section(text_study.id, section);
                let held = by_key.get(&key).copied();
                SectionView {
                    section,
                    value: key.to_string(),
                    chosen_by_name: held.map(|r| r.holder_name.clone()),
                    reserved_by_viewer: held.is_some_and(held_by_viewer),
                    reservation_id: held.map(|r| r.id),
                    is_completed: held.is_some_and(|r| r.is_completed),
                }
            })
            .collect();

        let view = TextStudyView {
            id: text_study.id,
            name: text_study.name.clone(),
            link: text_study.link.clone(),
            total_sections: text_study.total_sections,
            value: ReservationKey::whole(text_study.id).to_string(),
            reserved_by: whole.map(|r| r.holder_name.clone()),
            reserved_by_viewer: whole.is_some_and(held_by_viewer),
            whole_reservation_id: whole.map(|r| r.id),
            all_sections_reserved: text_coverage.all_sections_reserved(text_study),
            is_covered: text_coverage.is_covered(text_study),
            sections,
        };

        match book_index.get(&text_study.book) {
            Some(&index) => books[index].text_studies.push(view),
            None => {
                book_index.insert(text_study.book.clone(), books.len());
                books.push(BookView {
                    name: text_study.book.clone(),
                    text_studies: vec![view],
                });
            }
        }
    }
    books
}

//=========================================================================================
// Create Session
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSessionPage {
    pub form: FormPage,
    pub text_study_types: Vec<TextStudyTypeView>,
}

//=========================================================================================
// Profile
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationView {
    pub id: Uuid,
    pub session_id: Uuid,
    pub session_name: Option<String>,
    pub session_slug: Option<String>,
    pub text_study_id: Uuid,
    pub text_study_name: Option<String>,
    pub section: Option<u32>,
    pub holder_name: String,
    pub is_guest: bool,
    pub available: bool,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl ReservationView {
    pub fn new(
        reservation: &Reservation,
        session: Option<&Session>,
        text_study_name: Option<String>,
    ) -> Self {
        Self {
            id: reservation.id,
            session_id: reservation.session_id,
            session_name: session.map(|s| s.name.clone()),
            session_slug: session.map(|s| s.slug.clone()),
            text_study_id: reservation.text_study_id,
            text_study_name,
            section: reservation.section,
            holder_name: reservation.holder_name.clone(),
            is_guest: matches!(reservation.participant, Participant::Guest(_)),
            available: reservation.available,
            is_completed: reservation.is_completed,
            created_at: reservation.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfilePage {
    pub person: ViewerView,
    pub email: String,
    pub user_sessions: Vec<SessionSummary>,
    pub reserved_sessions: Vec<SessionSummary>,
    pub reservations: Vec<ReservationView>,
}
