//! Reservation keys and the checkbox toggling logic of the session page.
//!
//! The reservation form submits the full set of keys the participant wants to
//! hold. Planning compares that set with the reservations already stored for
//! the session and yields the rows to delete and to insert.

use crate::domain::{Participant, Reservation, TextStudy};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const UUID_LEN: usize = 36;

/// Identifies a reservable slot within a session: a whole text study, or one
/// of its sections.
///
/// Form encoding is `<text_study_id>` for a whole unit and
/// `<text_study_id>-<section>` for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReservationKey {
    pub text_study_id: Uuid,
    pub section: Option<u32>,
}

impl ReservationKey {
    pub fn whole(text_study_id: Uuid) -> Self {
        Self { text_study_id, section: None }
    }

    pub fn section(text_study_id: Uuid, section: u32) -> Self {
        Self { text_study_id, section: Some(section) }
    }

    pub fn of(reservation: &Reservation) -> Self {
        Self {
            text_study_id: reservation.text_study_id,
            section: reservation.section,
        }
    }

    /// Whether a reservation held by someone else blocks this key.
    fn is_blocked_by(&self, other: &Reservation) -> bool {
        other.text_study_id == self.text_study_id
            && (other.section.is_none() || self.section.is_none() || other.section == self.section)
    }
}

impl fmt::Display for ReservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section {
            Some(section) => write!(f, "{}-{}", self.text_study_id, section),
            None => write!(f, "{}", self.text_study_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationKeyError {
    #[error("Malformed reservation value '{0}'")]
    Malformed(String),
    #[error("Text study {0} is not part of this session")]
    UnknownTextStudy(Uuid),
    #[error("Section {section} does not exist in '{name}'")]
    SectionOutOfRange { name: String, section: u32 },
}

impl FromStr for ReservationKey {
    type Err = ReservationKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ReservationKeyError::Malformed(s.to_string());
        let s = s.trim();

        let id_part = s.get(..UUID_LEN).ok_or_else(malformed)?;
        let text_study_id = Uuid::parse_str(id_part).map_err(|_| malformed())?;

        match s.get(UUID_LEN..) {
            Some("") => Ok(Self::whole(text_study_id)),
            Some(rest) => {
                let section = rest
                    .strip_prefix('-')
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(malformed)?;
                Ok(Self::section(text_study_id, section))
            }
            None => Err(malformed()),
        }
    }
}

/// Checks that a key targets a text study of the session type, and a section
/// that exists in it.
pub fn validate_key(
    key: &ReservationKey,
    text_studies: &[TextStudy],
) -> Result<(), ReservationKeyError> {
    let text_study = text_studies
        .iter()
        .find(|ts| ts.id == key.text_study_id)
        .ok_or(ReservationKeyError::UnknownTextStudy(key.text_study_id))?;

    match key.section {
        Some(section) if section == 0 || section > text_study.total_sections => {
            Err(ReservationKeyError::SectionOutOfRange {
                name: text_study.name.clone(),
                section,
            })
        }
        _ => Ok(()),
    }
}

/// Rows to delete and to insert for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationPlan {
    pub to_remove: Vec<Uuid>,
    pub to_add: Vec<ReservationKey>,
    /// Desired keys already held by another participant.
    pub rejected: Vec<ReservationKey>,
}

impl ReservationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Computes the changes needed so that `participant` holds `desired`.
///
/// With `replace`, the participant's reservations missing from `desired` are
/// released. Guests submit without `replace` since they cannot be recognised
/// between visits.
pub fn plan_reservations(
    existing: &[Reservation],
    participant: Participant,
    desired: &BTreeSet<ReservationKey>,
    replace: bool,
) -> ReservationPlan {
    let (mine, others): (Vec<&Reservation>, Vec<&Reservation>) =
        existing.iter().partition(|r| r.participant == participant);

    let held: BTreeSet<ReservationKey> = mine.iter().map(|r| ReservationKey::of(r)).collect();

    let to_remove = if replace {
        mine.iter()
            .filter(|r| !desired.contains(&ReservationKey::of(r)))
            .map(|r| r.id)
            .collect()
    } else {
        Vec::new()
    };

    let mut plan = ReservationPlan {
        to_remove,
        ..ReservationPlan::default()
    };
    for key in desired.iter().filter(|k| !held.contains(k)) {
        if others.iter().any(|r| key.is_blocked_by(r)) {
            plan.rejected.push(*key);
        } else {
            plan.to_add.push(*key);
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reservation(participant: Participant, text_study_id: Uuid, section: Option<u32>) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            session_id: Uuid::nil(),
            text_study_id,
            section,
            participant,
            holder_name: "Yossef".to_string(),
            available: true,
            is_completed: false,
            created_at: Utc::now(),
        }
    }

    fn keys(items: &[ReservationKey]) -> BTreeSet<ReservationKey> {
        items.iter().copied().collect()
    }

    #[test]
    fn parses_whole_and_section_values() {
        let id = Uuid::new_v4();
        assert_eq!(id.to_string().parse::<ReservationKey>(), Ok(ReservationKey::whole(id)));
        assert_eq!(format!("{id}-12").parse::<ReservationKey>(), Ok(ReservationKey::section(id, 12)));
        assert_eq!(ReservationKey::section(id, 3).to_string(), format!("{id}-3"));
    }

    #[test]
    fn rejects_malformed_values() {
        let id = Uuid::new_v4();
        let bad_values = [
            String::new(),
            "12-3".to_string(),
            format!("{id}-"),
            format!("{id}-x"),
            format!("{id}3"),
        ];
        for bad in &bad_values {
            assert!(
                matches!(bad.parse::<ReservationKey>(), Err(ReservationKeyError::Malformed(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn validates_against_session_text_studies() {
        let ts = TextStudy {
            id: Uuid::new_v4(),
            type_id: Uuid::new_v4(),
            name: "Megillah".to_string(),
            book: "Moed".to_string(),
            link: String::new(),
            total_sections: 4,
        };
        let studies = [ts.clone()];
        assert!(validate_key(&ReservationKey::section(ts.id, 4), &studies).is_ok());
        assert!(validate_key(&ReservationKey::whole(ts.id), &studies).is_ok());
        assert!(matches!(
            validate_key(&ReservationKey::section(ts.id, 5), &studies),
            Err(ReservationKeyError::SectionOutOfRange { section: 5, .. })
        ));
        assert!(validate_key(&ReservationKey::section(ts.id, 0), &studies).is_err());
        assert_eq!(
            validate_key(&ReservationKey::whole(Uuid::nil()), &studies),
            Err(ReservationKeyError::UnknownTextStudy(Uuid::nil()))
        );
    }

    #[test]
    fn person_toggles_own_sections() {
        let me = Participant::Person(Uuid::new_v4());
        let ts = Uuid::new_v4();
        let kept = reservation(me, ts, Some(1));
        let dropped = reservation(me, ts, Some(2));
        let existing = vec![kept.clone(), dropped.clone()];

        let plan = plan_reservations(
            &existing,
            me,
            &keys(&[ReservationKey::section(ts, 1), ReservationKey::section(ts, 3)]),
            true,
        );
        assert_eq!(plan.to_remove, vec![dropped.id]);
        assert_eq!(plan.to_add, vec![ReservationKey::section(ts, 3)]);
        assert!(plan.rejected.is_empty());
    }

    #[test]
    fn empty_submission_releases_everything() {
        let me = Participant::Person(Uuid::new_v4());
        let existing = vec![reservation(me, Uuid::new_v4(), None)];
        let plan = plan_reservations(&existing, me, &BTreeSet::new(), true);
        assert_eq!(plan.to_remove, vec![existing[0].id]);
        assert!(plan.to_add.is_empty());
    }

    #[test]
    fn guests_only_add() {
        let guest = Participant::Guest(Uuid::new_v4());
        let ts = Uuid::new_v4();
        let existing = vec![reservation(guest, ts, Some(1))];
        let plan = plan_reservations(&existing, guest, &keys(&[ReservationKey::section(ts, 2)]), false);
        assert!(plan.to_remove.is_empty());
        assert_eq!(plan.to_add, vec![ReservationKey::section(ts, 2)]);
    }

    #[test]
    fn slots_held_by_others_are_rejected() {
        let me = Participant::Person(Uuid::new_v4());
        let other = Participant::Guest(Uuid::new_v4());
        let whole_taken = Uuid::new_v4();
        let section_taken = Uuid::new_v4();
        let existing = vec![
            reservation(other, whole_taken, None),
            reservation(other, section_taken, Some(2)),
        ];

        let plan = plan_reservations(
            &existing,
            me,
            &keys(&[
                ReservationKey::section(whole_taken, 1),
                ReservationKey::section(section_taken, 2),
                ReservationKey::whole(section_taken),
                ReservationKey::section(section_taken, 3),
            ]),
            true,
        );
        assert_eq!(plan.to_add, vec![ReservationKey::section(section_taken, 3)]);
        assert_eq!(plan.rejected.len(), 3);
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn resubmitting_the_same_slots_changes_nothing() {
        let me = Participant::Person(Uuid::new_v4());
        let other = Participant::Guest(Uuid::new_v4());
        let ts = Uuid::new_v4();
        let existing = vec![reservation(me, ts, Some(1)), reservation(other, ts, Some(2))];

        let plan = plan_reservations(
            &existing,
            me,
            &keys(&[ReservationKey::section(ts, 1), ReservationKey::section(ts, 2)]),
            true,
        );
        assert!(plan.is_empty());
        assert_eq!(plan.rejected, vec![ReservationKey::section(ts, 2)]);
    }
}
