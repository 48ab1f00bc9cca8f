//! services/web/src/web/state.rs
//!
//! Defines the application's shared state and the per-request viewer.

use crate::config::Config;
use crate::error::{PageError, PageResult};
use chrono::{NaiveDate, Utc};
use gemara_chain_core::{ports::DatabaseService, Person};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Arc<dyn DatabaseService>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// The calendar day used for deadline checks.
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

//=========================================================================================
// Viewer (Specific to One Request)
//=========================================================================================

/// Who is looking at the page. Inserted into request extensions by
/// [`crate::web::middleware::load_viewer`].
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub person: Option<Person>,
    pub auth_session_id: Option<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.person.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.person.as_ref().is_some_and(|p| p.is_admin)
    }

    /// The logged-in person, or 401 for JSON actions.
    pub fn require_person(&self) -> PageResult<&Person> {
        self.person.as_ref().ok_or(PageError::Unauthorized)
    }
}
