//! Derived completion status of a study session.
//!
//! A session is complete once its deadline has passed, or once every text
//! study of its type is covered: either reserved as a whole unit, or with each
//! of its sections reserved.

use crate::domain::{Reservation, Session, TextStudy};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Ongoing,
    Completed,
}

/// What has been claimed on one text study within one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStudyCoverage {
    pub whole_reserved: bool,
    pub reserved_sections: BTreeSet<u32>,
}

impl TextStudyCoverage {
    pub fn is_covered(&self, text_study: &TextStudy) -> bool {
        self.whole_reserved || self.all_sections_reserved(text_study)
    }

    pub fn all_sections_reserved(&self, text_study: &TextStudy) -> bool {
        (1..=text_study.total_sections).all(|s| self.reserved_sections.contains(&s))
    }
}

/// Folds a session's reservations into per-text-study coverage.
pub fn coverage_by_text_study(reservations: &[Reservation]) -> HashMap<Uuid, TextStudyCoverage> {
    let mut coverage: HashMap<Uuid, TextStudyCoverage> = HashMap::new();
    for reservation in reservations {
        let entry = coverage.entry(reservation.text_study_id).or_default();
        match reservation.section {
            None => entry.whole_reserved = true,
            Some(section) => {
                entry.reserved_sections.insert(section);
            }
        }
    }
    coverage
}

/// Number of text studies that are fully covered.
pub fn covered_units(text_studies: &[TextStudy], reservations: &[Reservation]) -> usize {
    let coverage = coverage_by_text_study(reservations);
    text_studies
        .iter()
        .filter(|ts| coverage.get(&ts.id).is_some_and(|c| c.is_covered(ts)))
        .count()
}

/// A type without any text study is never complete by coverage.
pub fn all_units_covered(text_studies: &[TextStudy], reservations: &[Reservation]) -> bool {
    !text_studies.is_empty() && covered_units(text_studies, reservations) == text_studies.len()
}

pub fn session_status(
    session: &Session,
    text_studies: &[TextStudy],
    reservations: &[Reservation],
    today: NaiveDate,
) -> SessionStatus {
    if session.is_expired(today) || all_units_covered(text_studies, reservations) {
        SessionStatus::Completed
    } else {
        SessionStatus::Ongoing
    }
}

pub fn is_session_complete(
    session: &Session,
    text_studies: &[TextStudy],
    reservations: &[Reservation],
    today: NaiveDate,
) -> bool {
    session_status(session, text_studies, reservations, today) == SessionStatus::Completed
}
