//! services/web/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. It enforces the
//! same uniqueness rules as the PostgreSQL schema and backs the route tests as
//! well as `DATABASE_URL=memory` deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gemara_chain_core::domain::{
    AccountCredentials, Announcement, Guest, NewAnnouncement, NewReservation, NewSession,
    NewTextStudy, Participant, Person, Reservation, Session, SessionUpdate, TextStudy,
    TextStudyType,
};
use gemara_chain_core::ports::{DatabaseService, PortError, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

struct AccountRow {
    id: Uuid,
    username: String,
    hashed_password: String,
    is_admin: bool,
}

struct PersonRow {
    id: Uuid,
    account_id: Uuid,
    name: String,
    email: String,
}

struct ReservationRow {
    id: Uuid,
    session_id: Uuid,
    text_study_id: Uuid,
    section: Option<u32>,
    participant: Participant,
    available: bool,
    is_completed: bool,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    accounts: Vec<AccountRow>,
    persons: Vec<PersonRow>,
    auth_sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    guests: Vec<Guest>,
    types: Vec<TextStudyType>,
    /// Kept in insertion order, which is the catalog order.
    text_studies: Vec<TextStudy>,
    sessions: Vec<Session>,
    reservations: Vec<ReservationRow>,
    announcements: Vec<Announcement>,
}

impl Store {
    fn person(&self, account_id: Uuid) -> Option<Person> {
        let account = self.accounts.iter().find(|a| a.id == account_id)?;
        let person = self.persons.iter().find(|p| p.account_id == account_id)?;
        Some(Person {
            id: person.id,
            account_id,
            username: account.username.clone(),
            name: person.name.clone(),
            email: person.email.clone(),
            is_admin: account.is_admin,
        })
    }

    fn holder_name(&self, participant: Participant) -> String {
        let name = match participant {
            Participant::Person(id) => self.persons.iter().find(|p| p.id == id).map(|p| &p.name),
            Participant::Guest(id) => self.guests.iter().find(|g| g.id == id).map(|g| &g.name),
        };
        name.cloned().unwrap_or_default()
    }

    fn reservation(&self, row: &ReservationRow) -> Reservation {
        Reservation {
            id: row.id,
            session_id: row.session_id,
            text_study_id: row.text_study_id,
            section: row.section,
            participant: row.participant,
            holder_name: self.holder_name(row.participant),
            available: row.available,
            is_completed: row.is_completed,
            created_at: row.created_at,
        }
    }

    fn reservations_where(&self, keep: impl Fn(&ReservationRow) -> bool) -> Vec<Reservation> {
        self.reservations
            .iter()
            .filter(|r| keep(*r))
            .map(|r| self.reservation(r))
            .collect()
    }

    fn sessions_newest_first(&self, keep: impl Fn(&Session) -> bool) -> Vec<Session> {
        // Reversed first so equal timestamps keep the later insert in front.
        let mut sessions: Vec<Session> =
            self.sessions.iter().rev().filter(|s| keep(*s)).cloned().collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }
}

/// A `DatabaseService` keeping every row in memory.
#[derive(Default)]
pub struct MemoryAdapter {
    store: RwLock<Store>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> PortError {
    PortError::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl DatabaseService for MemoryAdapter {
    async fn create_account(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        is_admin: bool,
    ) -> PortResult<Person> {
        let mut store = self.store.write().await;
        if store.accounts.iter().any(|a| a.username == username) {
            return Err(PortError::Conflict(format!("Username '{}' is already taken", username)));
        }
        let account_id = Uuid::new_v4();
        store.accounts.push(AccountRow {
            id: account_id,
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
            is_admin,
        });
        store.persons.push(PersonRow {
            id: Uuid::new_v4(),
            account_id,
            name: username.to_string(),
            email: email.to_string(),
        });
        store
            .person(account_id)
            .ok_or_else(|| PortError::Unexpected("Account vanished after insert".to_string()))
    }

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<AccountCredentials> {
        let store = self.store.read().await;
        store
            .accounts
            .iter()
            .find(|a| a.username == username)
            .map(|a| AccountCredentials {
                account_id: a.id,
                username: a.username.clone(),
                hashed_password: a.hashed_password.clone(),
            })
            .ok_or_else(|| not_found("Account", username))
    }

    async fn get_person_by_account(&self, account_id: Uuid) -> PortResult<Person> {
        let store = self.store.read().await;
        store
            .person(account_id)
            .ok_or_else(|| not_found("Person for account", account_id))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        store.auth_sessions.retain(|_, (_, expires)| *expires > now);
        store
            .auth_sessions
            .insert(session_id.to_string(), (account_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let store = self.store.read().await;
        match store.auth_sessions.get(session_id) {
            Some((account_id, expires_at)) if *expires_at > Utc::now() => Ok(*account_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.store.write().await.auth_sessions.remove(session_id);
        Ok(())
    }

    async fn count_accounts(&self) -> PortResult<i64> {
        Ok(self.store.read().await.accounts.len() as i64)
    }

    async fn count_participants(&self) -> PortResult<i64> {
        let store = self.store.read().await;
        Ok((store.persons.len() + store.guests.len()) as i64)
    }

    async fn get_or_create_guest(&self, name: &str, email: &str) -> PortResult<Guest> {
        let mut store = self.store.write().await;
        if let Some(guest) = store.guests.iter().find(|g| g.name == name && g.email == email) {
            return Ok(guest.clone());
        }
        let guest = Guest {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
        };
        store.guests.push(guest.clone());
        Ok(guest)
    }

    async fn list_text_study_types(&self) -> PortResult<Vec<TextStudyType>> {
        let mut types = self.store.read().await.types.clone();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn get_text_study_type(&self, type_id: Uuid) -> PortResult<TextStudyType> {
        let store = self.store.read().await;
        store
            .types
            .iter()
            .find(|t| t.id == type_id)
            .cloned()
            .ok_or_else(|| not_found("Text study type", type_id))
    }

    async fn ensure_text_study_type(&self, name: &str) -> PortResult<TextStudyType> {
        let mut store = self.store.write().await;
        if let Some(existing) = store.types.iter().find(|t| t.name == name) {
            return Ok(existing.clone());
        }
        let study_type = TextStudyType {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        store.types.push(study_type.clone());
        Ok(study_type)
    }

    async fn list_text_studies(&self, type_id: Uuid) -> PortResult<Vec<TextStudy>> {
        let store = self.store.read().await;
        Ok(store
            .text_studies
            .iter()
            .filter(|ts| ts.type_id == type_id)
            .cloned()
            .collect())
    }

    async fn create_text_study(&self, text_study: NewTextStudy) -> PortResult<TextStudy> {
        let mut store = self.store.write().await;
        if !store.types.iter().any(|t| t.id == text_study.type_id) {
            return Err(not_found("Text study type", text_study.type_id));
        }
        let created = TextStudy {
            id: Uuid::new_v4(),
            type_id: text_study.type_id,
            name: text_study.name,
            book: text_study.book,
            link: text_study.link,
            total_sections: text_study.total_sections,
        };
        store.text_studies.push(created.clone());
        Ok(created)
    }

    async fn delete_text_study(&self, text_study_id: Uuid) -> PortResult<()> {
        let mut store = self.store.write().await;
        let before = store.text_studies.len();
        store.text_studies.retain(|ts| ts.id != text_study_id);
        if store.text_studies.len() == before {
            return Err(not_found("Text study", text_study_id));
        }
        store.reservations.retain(|r| r.text_study_id != text_study_id);
        Ok(())
    }

    async fn create_session(&self, session: NewSession) -> PortResult<Session> {
        let mut store = self.store.write().await;
        if store.sessions.iter().any(|s| s.slug == session.slug) {
            return Err(PortError::Conflict(format!("Slug '{}' is already taken", session.slug)));
        }
        if !store.types.iter().any(|t| t.id == session.type_id) {
            return Err(not_found("Text study type", session.type_id));
        }
        let created = Session {
            id: Uuid::new_v4(),
            name: session.name,
            description: session.description,
            deadline: session.deadline,
            created_at: Utc::now(),
            slug: session.slug,
            owner_id: session.owner_id,
            type_id: session.type_id,
        };
        store.sessions.push(created.clone());
        Ok(created)
    }

    async fn get_session_by_id(&self, session_id: Uuid) -> PortResult<Session> {
        let store = self.store.read().await;
        store
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
            .ok_or_else(|| not_found("Session", session_id))
    }

    async fn get_session_by_slug(&self, slug: &str) -> PortResult<Session> {
        let store = self.store.read().await;
        store
            .sessions
            .iter()
            .find(|s| s.slug == slug)
            .cloned()
            .ok_or_else(|| not_found("Session", slug))
    }

    async fn find_slugs_with_prefix(&self, prefix: &str) -> PortResult<Vec<String>> {
        let store = self.store.read().await;
        let dashed = format!("{}-", prefix);
        Ok(store
            .sessions
            .iter()
            .filter(|s| s.slug == prefix || s.slug.starts_with(&dashed))
            .map(|s| s.slug.clone())
            .collect())
    }

    async fn list_sessions(&self, type_id: Option<Uuid>) -> PortResult<Vec<Session>> {
        let store = self.store.read().await;
        Ok(store.sessions_newest_first(|s| type_id.map_or(true, |t| s.type_id == t)))
    }

    async fn list_sessions_by_owner(&self, person_id: Uuid) -> PortResult<Vec<Session>> {
        let store = self.store.read().await;
        Ok(store.sessions_newest_first(|s| s.is_owned_by(person_id)))
    }

    async fn list_sessions_reserved_by(&self, person_id: Uuid) -> PortResult<Vec<Session>> {
        let store = self.store.read().await;
        let holder = Participant::Person(person_id);
        Ok(store.sessions_newest_first(|s| {
            store
                .reservations
                .iter()
                .any(|r| r.session_id == s.id && r.participant == holder)
        }))
    }

    async fn update_session(&self, session_id: Uuid, update: SessionUpdate) -> PortResult<Session> {
        let mut store = self.store.write().await;
        let session = store
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| not_found("Session", session_id))?;
        session.name = update.name;
        session.description = update.description;
        session.deadline = update.deadline;
        Ok(session.clone())
    }

    async fn delete_session(&self, session_id: Uuid) -> PortResult<()> {
        let mut store = self.store.write().await;
        let before = store.sessions.len();
        store.sessions.retain(|s| s.id != session_id);
        if store.sessions.len() == before {
            return Err(not_found("Session", session_id));
        }
        store.reservations.retain(|r| r.session_id != session_id);
        Ok(())
    }

    async fn list_reservations_for_session(&self, session_id: Uuid) -> PortResult<Vec<Reservation>> {
        let store = self.store.read().await;
        Ok(store.reservations_where(|r| r.session_id == session_id))
    }

    async fn list_reservations_by_person(&self, person_id: Uuid) -> PortResult<Vec<Reservation>> {
        let store = self.store.read().await;
        let holder = Participant::Person(person_id);
        Ok(store.reservations_where(|r| r.participant == holder))
    }

    async fn list_all_reservations(&self) -> PortResult<Vec<Reservation>> {
        let store = self.store.read().await;
        Ok(store.reservations_where(|_| true))
    }

    async fn get_reservation(&self, reservation_id: Uuid) -> PortResult<Reservation> {
        let store = self.store.read().await;
        store
            .reservations
            .iter()
            .find(|r| r.id == reservation_id)
            .map(|r| store.reservation(r))
            .ok_or_else(|| not_found("Reservation", reservation_id))
    }

    async fn create_reservation(&self, reservation: NewReservation) -> PortResult<Reservation> {
        let mut store = self.store.write().await;
        let taken = store.reservations.iter().any(|r| {
            r.session_id == reservation.session_id
                && r.text_study_id == reservation.text_study_id
                && r.section == reservation.section
        });
        if taken {
            return Err(PortError::Conflict("This slot is already reserved".to_string()));
        }
        let row = ReservationRow {
            id: Uuid::new_v4(),
            session_id: reservation.session_id,
            text_study_id: reservation.text_study_id,
            section: reservation.section,
            participant: reservation.participant,
            available: true,
            is_completed: false,
            created_at: Utc::now(),
        };
        let created = store.reservation(&row);
        store.reservations.push(row);
        Ok(created)
    }

    async fn delete_reservation(&self, reservation_id: Uuid) -> PortResult<()> {
        let mut store = self.store.write().await;
        let before = store.reservations.len();
        store.reservations.retain(|r| r.id != reservation_id);
        if store.reservations.len() == before {
            return Err(not_found("Reservation", reservation_id));
        }
        Ok(())
    }

    async fn set_reservation_completed(
        &self,
        reservation_id: Uuid,
        is_completed: bool,
    ) -> PortResult<()> {
        let mut store = self.store.write().await;
        let row = store
            .reservations
            .iter_mut()
            .find(|r| r.id == reservation_id)
            .ok_or_else(|| not_found("Reservation", reservation_id))?;
        row.is_completed = is_completed;
        Ok(())
    }

    async fn list_active_announcements(&self, now: DateTime<Utc>) -> PortResult<Vec<Announcement>> {
        let store = self.store.read().await;
        let mut active: Vec<Announcement> = store
            .announcements
            .iter()
            .filter(|a| a.is_active(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(active)
    }

    async fn list_announcements(&self) -> PortResult<Vec<Announcement>> {
        let mut all = self.store.read().await.announcements.clone();
        all.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(all)
    }

    async fn create_announcement(&self, announcement: NewAnnouncement) -> PortResult<Announcement> {
        let created = Announcement {
            id: Uuid::new_v4(),
            title: announcement.title,
            description: announcement.description,
            link: announcement.link,
            start_date: announcement.start_date,
            end_date: announcement.end_date,
            created_at: Utc::now(),
        };
        self.store.write().await.announcements.push(created.clone());
        Ok(created)
    }

    async fn delete_announcement(&self, announcement_id: Uuid) -> PortResult<()> {
        let mut store = self.store.write().await;
        let before = store.announcements.len();
        store.announcements.retain(|a| a.id != announcement_id);
        if store.announcements.len() == before {
            return Err(not_found("Announcement", announcement_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn session_fixture(db: &MemoryAdapter) -> (Session, TextStudy) {
        let study_type = db.ensure_text_study_type("Mishna").await.unwrap();
        let text_study = db
            .create_text_study(NewTextStudy {
                type_id: study_type.id,
                name: "Avot".to_string(),
                book: "Nezikin".to_string(),
                link: String::new(),
                total_sections: 5,
            })
            .await
            .unwrap();
        let session = db
            .create_session(NewSession {
                name: "Avot".to_string(),
                description: String::new(),
                deadline: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                slug: "avot".to_string(),
                owner_id: None,
                type_id: study_type.id,
            })
            .await
            .unwrap();
        (session, text_study)
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let db = MemoryAdapter::new();
        db.create_account("levi", "levi@example.com", "hash", false).await.unwrap();
        let err = db.create_account("levi", "other@example.com", "hash", false).await;
        assert!(matches!(err, Err(PortError::Conflict(_))));
        assert_eq!(db.count_accounts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn slot_can_only_be_reserved_once() {
        let db = MemoryAdapter::new();
        let (session, text_study) = session_fixture(&db).await;
        let guest = db.get_or_create_guest("Sarah", "sarah@example.com").await.unwrap();
        let new = || NewReservation {
            session_id: session.id,
            text_study_id: text_study.id,
            section: Some(2),
            participant: Participant::Guest(guest.id),
        };
        let created = db.create_reservation(new()).await.unwrap();
        assert_eq!(created.holder_name, "Sarah");
        assert!(matches!(db.create_reservation(new()).await, Err(PortError::Conflict(_))));
    }

    #[tokio::test]
    async fn guests_are_reused_by_name_and_email() {
        let db = MemoryAdapter::new();
        let first = db.get_or_create_guest("Rivka", "rivka@example.com").await.unwrap();
        let again = db.get_or_create_guest("Rivka", "rivka@example.com").await.unwrap();
        let other = db.get_or_create_guest("Rivka", "r@example.com").await.unwrap();
        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other.id);
        assert_eq!(db.count_participants().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn deleting_a_session_drops_its_reservations() {
        let db = MemoryAdapter::new();
        let (session, text_study) = session_fixture(&db).await;
        let guest = db.get_or_create_guest("Moshe", "moshe@example.com").await.unwrap();
        db.create_reservation(NewReservation {
            session_id: session.id,
            text_study_id: text_study.id,
            section: None,
            participant: Participant::Guest(guest.id),
        })
        .await
        .unwrap();

        db.delete_session(session.id).await.unwrap();
        assert!(db.list_all_reservations().await.unwrap().is_empty());
        assert!(matches!(db.get_session_by_id(session.id).await, Err(PortError::NotFound(_))));
    }

    #[tokio::test]
    async fn expired_auth_sessions_are_rejected() {
        let db = MemoryAdapter::new();
        let person = db.create_account("dan", "", "hash", false).await.unwrap();
        db.create_auth_session("old", person.account_id, Utc::now() - chrono::Duration::minutes(1))
            .await
            .unwrap();
        assert!(matches!(db.validate_auth_session("old").await, Err(PortError::Unauthorized)));
    }

    #[tokio::test]
    async fn new_auth_sessions_purge_expired_ones() {
        let db = MemoryAdapter::new();
        let person = db.create_account("dan", "", "hash", false).await.unwrap();
        db.create_auth_session("old", person.account_id, Utc::now() - chrono::Duration::minutes(1))
            .await
            .unwrap();
        db.create_auth_session("new", person.account_id, Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();

        let store = db.store.read().await;
        assert!(!store.auth_sessions.contains_key("old"));
        assert!(store.auth_sessions.contains_key("new"));
    }

    #[tokio::test]
    async fn catalog_seeding_runs_once() {
        let db = MemoryAdapter::new();
        let inserted = gemara_chain_core::catalog::seed_catalog(&db).await.unwrap();
        assert_eq!(inserted, 40 + 63 + 150 + 11);
        assert_eq!(gemara_chain_core::catalog::seed_catalog(&db).await.unwrap(), 0);
        assert_eq!(db.list_text_study_types().await.unwrap().len(), 4);
    }
}
