//! services/web/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gemara_chain_core::domain::{
    AccountCredentials, Announcement, Guest, NewAnnouncement, NewReservation, NewSession,
    NewTextStudy, Participant, Person, Reservation, Session, SessionUpdate, TextStudy,
    TextStudyType,
};
use gemara_chain_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => unexpected(e),
    }
}

fn conflict_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    let is_unique_violation = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if is_unique_violation {
        PortError::Conflict(what)
    } else {
        unexpected(e)
    }
}

fn expect_affected(rows: u64, what: String) -> PortResult<()> {
    if rows == 0 {
        Err(PortError::NotFound(what))
    } else {
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const PERSON_SELECT: &str = "SELECT p.id, p.account_id, a.username, p.name, p.email, a.is_admin \
     FROM persons p JOIN accounts a ON a.id = p.account_id";

#[derive(FromRow)]
struct PersonRecord {
    id: Uuid,
    account_id: Uuid,
    username: String,
    name: String,
    email: String,
    is_admin: bool,
}
impl PersonRecord {
    fn to_domain(self) -> Person {
        Person {
            id: self.id,
            account_id: self.account_id,
            username: self.username,
            name: self.name,
            email: self.email,
            is_admin: self.is_admin,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    username: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> AccountCredentials {
        AccountCredentials {
            account_id: self.id,
            username: self.username,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct GuestRecord {
    id: Uuid,
    name: String,
    email: String,
}
impl GuestRecord {
    fn to_domain(self) -> Guest {
        Guest {
            id: self.id,
            name: self.name,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct TextStudyTypeRecord {
    id: Uuid,
    name: String,
}
impl TextStudyTypeRecord {
    fn to_domain(self) -> TextStudyType {
        TextStudyType {
            id: self.id,
            name: self.name,
        }
    }
}

const TEXT_STUDY_COLUMNS: &str = "id, type_id, name, book, link, total_sections";

#[derive(FromRow)]
struct TextStudyRecord {
    id: Uuid,
    type_id: Uuid,
    name: String,
    book: String,
    link: String,
    total_sections: i32,
}
impl TextStudyRecord {
    fn to_domain(self) -> TextStudy {
        TextStudy {
            id: self.id,
            type_id: self.type_id,
            name: self.name,
            book: self.book,
            link: self.link,
            total_sections: self.total_sections.max(0) as u32,
        }
    }
}

const SESSION_COLUMNS: &str = "id, name, description, deadline, created_at, slug, owner_id, type_id";

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    name: String,
    description: String,
    deadline: NaiveDate,
    created_at: DateTime<Utc>,
    slug: String,
    owner_id: Option<Uuid>,
    type_id: Uuid,
}
impl SessionRecord {
    fn to_domain(self) -> Session {
        Session {
            id: self.id,
            name: self.name,
            description: self.description,
            deadline: self.deadline,
            created_at: self.created_at,
            slug: self.slug,
            owner_id: self.owner_id,
            type_id: self.type_id,
        }
    }
}

const RESERVATION_SELECT: &str = "SELECT r.id, r.session_id, r.text_study_id, r.section, \
     r.person_id, r.guest_id, r.available, r.is_completed, r.created_at, \
     COALESCE(p.name, g.name, '') AS holder_name \
     FROM reservations r \
     LEFT JOIN persons p ON p.id = r.person_id \
     LEFT JOIN guests g ON g.id = r.guest_id";

#[derive(FromRow)]
struct ReservationRecord {
    id: Uuid,
    session_id: Uuid,
    text_study_id: Uuid,
    section: Option<i32>,
    person_id: Option<Uuid>,
    guest_id: Option<Uuid>,
    available: bool,
    is_completed: bool,
    created_at: DateTime<Utc>,
    holder_name: String,
}
impl ReservationRecord {
    fn to_domain(self) -> PortResult<Reservation> {
        let participant = match (self.person_id, self.guest_id) {
            (Some(person_id), None) => Participant::Person(person_id),
            (None, Some(guest_id)) => Participant::Guest(guest_id),
            _ => {
                return Err(PortError::Unexpected(format!(
                    "Reservation {} must have exactly one holder",
                    self.id
                )))
            }
        };
        Ok(Reservation {
            id: self.id,
            session_id: self.session_id,
            text_study_id: self.text_study_id,
            section: self.section.map(|s| s.max(0) as u32),
            participant,
            holder_name: self.holder_name,
            available: self.available,
            is_completed: self.is_completed,
            created_at: self.created_at,
        })
    }
}

fn reservations_to_domain(records: Vec<ReservationRecord>) -> PortResult<Vec<Reservation>> {
    records.into_iter().map(|r| r.to_domain()).collect()
}

const ANNOUNCEMENT_COLUMNS: &str = "id, title, description, link, start_date, end_date, created_at";

#[derive(FromRow)]
struct AnnouncementRecord {
    id: Uuid,
    title: String,
    description: String,
    link: Option<String>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}
impl AnnouncementRecord {
    fn to_domain(self) -> Announcement {
        Announcement {
            id: self.id,
            title: self.title,
            description: self.description,
            link: self.link,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_account(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        is_admin: bool,
    ) -> PortResult<Person> {
        let account_id = Uuid::new_v4();
        let person_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        sqlx::query(
            "INSERT INTO accounts (id, username, email, hashed_password, is_admin) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(account_id)
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .bind(is_admin)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or_unexpected(e, format!("Username '{}' is already taken", username)))?;

        sqlx::query("INSERT INTO persons (id, account_id, name, email) VALUES ($1, $2, $3, $4)")
            .bind(person_id)
            .bind(account_id)
            .bind(username)
            .bind(email)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;

        Ok(Person {
            id: person_id,
            account_id,
            username: username.to_string(),
            name: username.to_string(),
            email: email.to_string(),
            is_admin,
        })
    }

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<AccountCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, username, hashed_password FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Account {} not found", username)))?;
        Ok(record.to_domain())
    }

    async fn get_person_by_account(&self, account_id: Uuid) -> PortResult<Person> {
        let sql = format!("{PERSON_SELECT} WHERE p.account_id = $1");
        let record = sqlx::query_as::<_, PersonRecord>(&sql)
            .bind(account_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, format!("Person for account {} not found", account_id)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        sqlx::query("INSERT INTO auth_sessions (id, account_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(account_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT account_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn count_accounts(&self) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn count_participants(&self) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT (SELECT COUNT(*) FROM persons) + (SELECT COUNT(*) FROM guests)",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn get_or_create_guest(&self, name: &str, email: &str) -> PortResult<Guest> {
        let record = sqlx::query_as::<_, GuestRecord>(
            "INSERT INTO guests (id, name, email) VALUES ($1, $2, $3) \
             ON CONFLICT (name, email) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id, name, email",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_text_study_types(&self) -> PortResult<Vec<TextStudyType>> {
        let records = sqlx::query_as::<_, TextStudyTypeRecord>(
            "SELECT id, name FROM text_study_types ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_text_study_type(&self, type_id: Uuid) -> PortResult<TextStudyType> {
        let record = sqlx::query_as::<_, TextStudyTypeRecord>(
            "SELECT id, name FROM text_study_types WHERE id = $1",
        )
        .bind(type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Text study type {} not found", type_id)))?;
        Ok(record.to_domain())
    }

    async fn ensure_text_study_type(&self, name: &str) -> PortResult<TextStudyType> {
        let record = sqlx::query_as::<_, TextStudyTypeRecord>(
            "INSERT INTO text_study_types (id, name) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_text_studies(&self, type_id: Uuid) -> PortResult<Vec<TextStudy>> {
        let sql = format!(
            "SELECT {TEXT_STUDY_COLUMNS} FROM text_studies WHERE type_id = $1 ORDER BY position ASC"
        );
        let records = sqlx::query_as::<_, TextStudyRecord>(&sql)
            .bind(type_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_text_study(&self, text_study: NewTextStudy) -> PortResult<TextStudy> {
        let sql = format!(
            "INSERT INTO text_studies (id, type_id, name, book, link, total_sections) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TEXT_STUDY_COLUMNS}"
        );
        let record = sqlx::query_as::<_, TextStudyRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(text_study.type_id)
            .bind(&text_study.name)
            .bind(&text_study.book)
            .bind(&text_study.link)
            .bind(text_study.total_sections as i32)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_text_study(&self, text_study_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM text_studies WHERE id = $1")
            .bind(text_study_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        expect_affected(result.rows_affected(), format!("Text study {} not found", text_study_id))
    }

    async fn create_session(&self, session: NewSession) -> PortResult<Session> {
        let sql = format!(
            "INSERT INTO study_sessions (id, name, description, deadline, slug, owner_id, type_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {SESSION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&session.name)
            .bind(&session.description)
            .bind(session.deadline)
            .bind(&session.slug)
            .bind(session.owner_id)
            .bind(session.type_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_unexpected(e, format!("Slug '{}' is already taken", session.slug)))?;
        Ok(record.to_domain())
    }

    async fn get_session_by_id(&self, session_id: Uuid) -> PortResult<Session> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM study_sessions WHERE id = $1");
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, format!("Session {} not found", session_id)))?;
        Ok(record.to_domain())
    }

    async fn get_session_by_slug(&self, slug: &str) -> PortResult<Session> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM study_sessions WHERE slug = $1");
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, format!("Session {} not found", slug)))?;
        Ok(record.to_domain())
    }

    async fn find_slugs_with_prefix(&self, prefix: &str) -> PortResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM study_sessions WHERE slug = $1 OR slug LIKE $2",
        )
        .bind(prefix)
        .bind(format!("{}-%", prefix))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn list_sessions(&self, type_id: Option<Uuid>) -> PortResult<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM study_sessions \
             WHERE ($1::uuid IS NULL OR type_id = $1) ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(type_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_sessions_by_owner(&self, person_id: Uuid) -> PortResult<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM study_sessions WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(person_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_sessions_reserved_by(&self, person_id: Uuid) -> PortResult<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM study_sessions \
             WHERE id IN (SELECT session_id FROM reservations WHERE person_id = $1) \
             ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(person_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_session(&self, session_id: Uuid, update: SessionUpdate) -> PortResult<Session> {
        let sql = format!(
            "UPDATE study_sessions SET name = $1, description = $2, deadline = $3 \
             WHERE id = $4 RETURNING {SESSION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(&update.name)
            .bind(&update.description)
            .bind(update.deadline)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, format!("Session {} not found", session_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_session(&self, session_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM study_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        expect_affected(result.rows_affected(), format!("Session {} not found", session_id))
    }

    async fn list_reservations_for_session(&self, session_id: Uuid) -> PortResult<Vec<Reservation>> {
        let sql = format!("{RESERVATION_SELECT} WHERE r.session_id = $1 ORDER BY r.created_at ASC");
        let records = sqlx::query_as::<_, ReservationRecord>(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        reservations_to_domain(records)
    }

    async fn list_reservations_by_person(&self, person_id: Uuid) -> PortResult<Vec<Reservation>> {
        let sql = format!("{RESERVATION_SELECT} WHERE r.person_id = $1 ORDER BY r.created_at ASC");
        let records = sqlx::query_as::<_, ReservationRecord>(&sql)
            .bind(person_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        reservations_to_domain(records)
    }

    async fn list_all_reservations(&self) -> PortResult<Vec<Reservation>> {
        let sql = format!("{RESERVATION_SELECT} ORDER BY r.session_id, r.text_study_id, r.section");
        let records = sqlx::query_as::<_, ReservationRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        reservations_to_domain(records)
    }

    async fn get_reservation(&self, reservation_id: Uuid) -> PortResult<Reservation> {
        let sql = format!("{RESERVATION_SELECT} WHERE r.id = $1");
        let record = sqlx::query_as::<_, ReservationRecord>(&sql)
            .bind(reservation_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, format!("Reservation {} not found", reservation_id)))?;
        record.to_domain()
    }

    async fn create_reservation(&self, reservation: NewReservation) -> PortResult<Reservation> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO reservations (id, session_id, text_study_id, section, person_id, guest_id) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(reservation.session_id)
        .bind(reservation.text_study_id)
        .bind(reservation.section.map(|s| s as i32))
        .bind(reservation.participant.person_id())
        .bind(reservation.participant.guest_id())
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_unexpected(e, "This slot is already reserved".to_string()))?;
        self.get_reservation(id).await
    }

    async fn delete_reservation(&self, reservation_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(reservation_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        expect_affected(result.rows_affected(), format!("Reservation {} not found", reservation_id))
    }

    async fn set_reservation_completed(
        &self,
        reservation_id: Uuid,
        is_completed: bool,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE reservations SET is_completed = $1 WHERE id = $2")
            .bind(is_completed)
            .bind(reservation_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        expect_affected(result.rows_affected(), format!("Reservation {} not found", reservation_id))
    }

    async fn list_active_announcements(&self, now: DateTime<Utc>) -> PortResult<Vec<Announcement>> {
        let sql = format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements \
             WHERE start_date <= $1 AND end_date >= $1 ORDER BY start_date DESC"
        );
        let records = sqlx::query_as::<_, AnnouncementRecord>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_announcements(&self) -> PortResult<Vec<Announcement>> {
        let sql = format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY start_date DESC");
        let records = sqlx::query_as::<_, AnnouncementRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_announcement(&self, announcement: NewAnnouncement) -> PortResult<Announcement> {
        let sql = format!(
            "INSERT INTO announcements (id, title, description, link, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ANNOUNCEMENT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, AnnouncementRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&announcement.title)
            .bind(&announcement.description)
            .bind(&announcement.link)
            .bind(announcement.start_date)
            .bind(announcement.end_date)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_announcement(&self, announcement_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(announcement_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        expect_affected(result.rows_affected(), format!("Announcement {} not found", announcement_id))
    }
}
