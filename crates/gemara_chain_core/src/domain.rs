//! crates/gemara_chain_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account_id: Uuid,
    pub username: String,
    pub hashed_password: String,
}

/// A registered participant. Wraps exactly one login account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: Uuid,
    pub account_id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

/// An unauthenticated participant, identified by the name and email typed
/// into the reservation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A study corpus such as "Talmud Bavli" or "Tehilim".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStudyType {
    pub id: Uuid,
    pub name: String,
}

/// A reservable unit of text (tractate, book or portion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStudy {
    pub id: Uuid,
    pub type_id: Uuid,
    pub name: String,
    /// Display grouping, e.g. the Seder a tractate belongs to.
    pub book: String,
    pub link: String,
    pub total_sections: u32,
}

#[derive(Debug, Clone)]
pub struct NewTextStudy {
    pub type_id: Uuid,
    pub name: String,
    pub book: String,
    pub link: String,
    pub total_sections: u32,
}

/// A time-boxed study campaign over every text of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub slug: String,
    pub owner_id: Option<Uuid>,
    pub type_id: Uuid,
}

impl Session {
    /// The deadline day itself is still open for reservations.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.deadline < today
    }

    pub fn is_owned_by(&self, person_id: Uuid) -> bool {
        self.owner_id == Some(person_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub name: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub slug: String,
    pub owner_id: Option<Uuid>,
    pub type_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub name: String,
    pub description: String,
    pub deadline: NaiveDate,
}

/// Who holds a reservation. A reservation always has exactly one holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    Person(Uuid),
    Guest(Uuid),
}

impl Participant {
    pub fn person_id(&self) -> Option<Uuid> {
        match self {
            Participant::Person(id) => Some(*id),
            Participant::Guest(_) => None,
        }
    }

    pub fn guest_id(&self) -> Option<Uuid> {
        match self {
            Participant::Guest(id) => Some(*id),
            Participant::Person(_) => None,
        }
    }
}

/// A claim on a text study, or on one of its sections, within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub session_id: Uuid,
    pub text_study_id: Uuid,
    /// `None` means the whole unit is reserved.
    pub section: Option<u32>,
    pub participant: Participant,
    /// Display name of the holder, joined from the person or guest row.
    pub holder_name: String,
    pub available: bool,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub session_id: Uuid,
    pub text_study_id: Uuid,
    pub section: Option<u32>,
    pub participant: Participant,
}

/// A site-wide banner shown while "now" is inside its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}

#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}
