//! services/web/src/web/forms.rs
//!
//! Form payloads posted by the pages. Field rules are declared with `garde`;
//! the functions below cover the rules no built-in can express.

use crate::error::{PageError, PageResult};
use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use gemara_chain_core::reservation::ReservationKey;
use gemara_chain_core::SessionUpdate;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use utoipa::ToSchema;
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Empty optional fields arrive as `field=`; treat them as absent.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

//=========================================================================================
// Custom Rules
//=========================================================================================

fn not_blank<C>(value: &str, _: &C) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("this field is required"));
    }
    Ok(())
}

fn contains_digit(value: &str, _: &()) -> garde::Result {
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(garde::Error::new("must contain at least one digit"));
    }
    Ok(())
}

/// A deadline of today is still open.
fn deadline_not_past(value: &str, today: &NaiveDate) -> garde::Result {
    match parse_date(value) {
        None => Err(garde::Error::new("must be a date formatted as YYYY-MM-DD")),
        Some(deadline) if deadline < *today => Err(garde::Error::new("must be a future date")),
        Some(_) => Ok(()),
    }
}

fn study_type_id(value: &str, _: &NaiveDate) -> garde::Result {
    Uuid::parse_str(value.trim())
        .map(|_| ())
        .map_err(|_| garde::Error::new("choose a study type"))
}

fn rfc3339(value: &str, _: &()) -> garde::Result {
    parse_timestamp(value)
        .map(|_| ())
        .ok_or_else(|| garde::Error::new("must be an RFC 3339 timestamp"))
}

//=========================================================================================
// Accounts
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupForm {
    #[garde(custom(not_blank), length(chars, max = 150))]
    pub username: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[garde(email)]
    pub email: Option<String>,
    #[garde(length(chars, min = 8), custom(contains_digit))]
    pub password: String,
    #[garde(matches(password))]
    pub confirm_password: String,
}

/// A sign-up that passed validation.
#[derive(Debug)]
pub struct ValidSignup {
    pub username: String,
    pub email: String,
}

impl SignupForm {
    pub fn validated(&self) -> PageResult<ValidSignup> {
        self.validate_with(&())?;
        Ok(ValidSignup {
            username: self.username.trim().to_string(),
            email: self.email.clone().unwrap_or_default(),
        })
    }
}

//=========================================================================================
// Study Sessions
//=========================================================================================

/// Validated against today's date.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[garde(context(NaiveDate))]
pub struct CreateSessionForm {
    #[garde(custom(not_blank), length(chars, max = 200))]
    pub name: String,
    #[serde(default)]
    #[garde(skip)]
    pub description: String,
    /// `YYYY-MM-DD`
    #[garde(custom(deadline_not_past))]
    pub date_limit: String,
    /// Id of the text study type.
    #[garde(custom(study_type_id))]
    pub session_type: String,
}

#[derive(Debug)]
pub struct ValidSession {
    pub name: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub type_id: Uuid,
}

impl CreateSessionForm {
    pub fn validated(&self, today: NaiveDate) -> PageResult<ValidSession> {
        self.validate_with(&today)?;
        let deadline = parse_date(&self.date_limit)
            .ok_or_else(|| PageError::validation("date_limit: must be a date formatted as YYYY-MM-DD"))?;
        let type_id = Uuid::parse_str(self.session_type.trim())
            .map_err(|_| PageError::validation("session_type: choose a study type"))?;
        Ok(ValidSession {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            deadline,
            type_id,
        })
    }
}

/// Validated against today's date.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[garde(context(NaiveDate))]
pub struct UpdateSessionForm {
    #[garde(custom(not_blank), length(chars, max = 200))]
    pub name: String,
    #[serde(default)]
    #[garde(skip)]
    pub description: String,
    /// `YYYY-MM-DD`
    #[garde(custom(deadline_not_past))]
    pub date_limit: String,
}

impl UpdateSessionForm {
    pub fn validated(&self, today: NaiveDate) -> PageResult<SessionUpdate> {
        self.validate_with(&today)?;
        let deadline = parse_date(&self.date_limit)
            .ok_or_else(|| PageError::validation("date_limit: must be a date formatted as YYYY-MM-DD"))?;
        Ok(SessionUpdate {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            deadline,
        })
    }
}

//=========================================================================================
// Reservations
//=========================================================================================

/// The reservation form of the session page.
///
/// Checkbox groups repeat their field name, so the body is read as raw pairs.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReservationForm {
    /// `<text_study_id>-<section>` values.
    pub sections: Vec<String>,
    /// `<text_study_id>` values for whole-unit reservations.
    pub text_studies: Vec<String>,
    pub guest_name: String,
    pub guest_email: String,
}

/// Who a guest says they are.
#[derive(Debug, PartialEq, Eq, Validate)]
pub struct GuestIdentity {
    #[garde(custom(not_blank), length(chars, max = 200))]
    pub name: String,
    #[garde(email)]
    pub email: String,
}

impl ReservationForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "sections" => form.sections.push(value),
                "text_studies" => form.text_studies.push(value),
                "guest_name" => form.guest_name = value,
                "guest_email" => form.guest_email = value,
                _ => {}
            }
        }
        form
    }

    /// Every requested key. Both field groups share the same encoding.
    pub fn keys(&self) -> PageResult<BTreeSet<ReservationKey>> {
        self.sections
            .iter()
            .chain(self.text_studies.iter())
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.parse::<ReservationKey>()
                    .map_err(|e| PageError::validation(e.to_string()))
            })
            .collect()
    }

    pub fn guest_identity(&self) -> PageResult<GuestIdentity> {
        let guest = GuestIdentity {
            name: self.guest_name.trim().to_string(),
            email: self.guest_email.trim().to_string(),
        };
        guest.validate_with(&())?;
        Ok(guest)
    }
}

//=========================================================================================
// Admin Console
//=========================================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TextStudyTypeForm {
    #[garde(custom(not_blank), length(chars, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TextStudyForm {
    #[garde(skip)]
    pub type_id: Uuid,
    #[garde(custom(not_blank), length(chars, max = 200))]
    pub name: String,
    /// Defaults to the type name when blank.
    #[serde(default)]
    #[garde(length(chars, max = 200))]
    pub book: String,
    #[serde(default)]
    #[garde(skip)]
    pub link: String,
    #[garde(range(min = 1, max = 10_000))]
    pub total_sections: u32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AnnouncementForm {
    #[garde(custom(not_blank), length(chars, max = 200))]
    pub title: String,
    #[serde(default)]
    #[garde(skip)]
    pub description: String,
    #[serde(default)]
    #[garde(skip)]
    pub link: String,
    /// RFC 3339 timestamp.
    #[garde(custom(rfc3339))]
    pub start_date: String,
    /// RFC 3339 timestamp.
    #[garde(custom(rfc3339))]
    pub end_date: String,
}

impl AnnouncementForm {
    /// The display window, once the form has validated.
    pub fn window(&self) -> PageResult<(DateTime<Utc>, DateTime<Utc>)> {
        self.validate_with(&())?;
        let start = parse_timestamp(&self.start_date);
        let end = parse_timestamp(&self.end_date);
        let (Some(start), Some(end)) = (start, end) else {
            return Err(PageError::validation("start_date: must be an RFC 3339 timestamp"));
        };
        if end < start {
            return Err(PageError::validation("end_date: must not be before start_date"));
        }
        Ok((start, end))
    }
}
