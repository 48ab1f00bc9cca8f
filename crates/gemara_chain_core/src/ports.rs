//! crates/gemara_chain_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage implementations.

use crate::domain::{
    AccountCredentials, Announcement, Guest, NewAnnouncement, NewReservation, NewSession,
    NewTextStudy, Person, Reservation, Session, SessionUpdate, TextStudy, TextStudyType,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness rule was violated (username, slug, reservation key).
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Accounts & Auth ---
    /// Creates the login account together with its `Person`.
    async fn create_account(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        is_admin: bool,
    ) -> PortResult<Person>;

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<AccountCredentials>;

    async fn get_person_by_account(&self, account_id: Uuid) -> PortResult<Person>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the account bound to a live (unexpired) auth session.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    async fn count_accounts(&self) -> PortResult<i64>;

    /// Persons plus guests.
    async fn count_participants(&self) -> PortResult<i64>;

    // --- Guests ---
    async fn get_or_create_guest(&self, name: &str, email: &str) -> PortResult<Guest>;

    // --- Catalog ---
    async fn list_text_study_types(&self) -> PortResult<Vec<TextStudyType>>;

    async fn get_text_study_type(&self, type_id: Uuid) -> PortResult<TextStudyType>;

    /// Get-or-create by name.
    async fn ensure_text_study_type(&self, name: &str) -> PortResult<TextStudyType>;

    /// Text studies of a type, in catalog insertion order.
    async fn list_text_studies(&self, type_id: Uuid) -> PortResult<Vec<TextStudy>>;

    async fn create_text_study(&self, text_study: NewTextStudy) -> PortResult<TextStudy>;

    async fn delete_text_study(&self, text_study_id: Uuid) -> PortResult<()>;

    // --- Study Sessions ---
    async fn create_session(&self, session: NewSession) -> PortResult<Session>;

    async fn get_session_by_id(&self, session_id: Uuid) -> PortResult<Session>;

    async fn get_session_by_slug(&self, slug: &str) -> PortResult<Session>;

    /// Every slug equal to `prefix` or starting with `prefix-`.
    async fn find_slugs_with_prefix(&self, prefix: &str) -> PortResult<Vec<String>>;

    /// Newest first, optionally restricted to one study type.
    async fn list_sessions(&self, type_id: Option<Uuid>) -> PortResult<Vec<Session>>;

    async fn list_sessions_by_owner(&self, person_id: Uuid) -> PortResult<Vec<Session>>;

    /// Distinct sessions in which the person holds at least one reservation.
    async fn list_sessions_reserved_by(&self, person_id: Uuid) -> PortResult<Vec<Session>>;

    async fn update_session(&self, session_id: Uuid, update: SessionUpdate) -> PortResult<Session>;

    /// Deleting a session deletes its reservations.
    async fn delete_session(&self, session_id: Uuid) -> PortResult<()>;

    // --- Reservations ---
    async fn list_reservations_for_session(&self, session_id: Uuid) -> PortResult<Vec<Reservation>>;

    async fn list_reservations_by_person(&self, person_id: Uuid) -> PortResult<Vec<Reservation>>;

    async fn list_all_reservations(&self) -> PortResult<Vec<Reservation>>;

    async fn get_reservation(&self, reservation_id: Uuid) -> PortResult<Reservation>;

    async fn create_reservation(&self, reservation: NewReservation) -> PortResult<Reservation>;

    async fn delete_reservation(&self, reservation_id: Uuid) -> PortResult<()>;

    async fn set_reservation_completed(
        &self,
        reservation_id: Uuid,
        is_completed: bool,
    ) -> PortResult<()>;

    // --- Announcements ---
    async fn list_active_announcements(&self, now: DateTime<Utc>) -> PortResult<Vec<Announcement>>;

    async fn list_announcements(&self) -> PortResult<Vec<Announcement>>;

    async fn create_announcement(&self, announcement: NewAnnouncement) -> PortResult<Announcement>;

    async fn delete_announcement(&self, announcement_id: Uuid) -> PortResult<()>;
}
