//! services/web/src/web/auth.rs
//!
//! Authentication pages for signup, login, and logout.

use crate::config::Config;
use crate::error::{ApiError, PageError, PageResult};
use crate::web::forms::{LoginForm, SignupForm};
use crate::web::state::{AppState, Viewer};
use crate::web::views::FormPage;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use chrono::{Duration, Utc};
use gemara_chain_core::ports::{DatabaseService, PortError};
use gemara_chain_core::Person;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

//=========================================================================================
// Password & Cookie Helpers
//=========================================================================================

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match PasswordHash::new(hashed_password) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(e) => {
            error!("Failed to parse password hash: {:?}", e);
            false
        }
    }
}

fn cookie_header(value: &str, max_age_secs: i64, secure: bool) -> String {
    format!(
        "session={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        value,
        if secure { " Secure;" } else { "" },
        max_age_secs
    )
}

/// Opens an auth session for the account and returns its `Set-Cookie` value.
async fn start_auth_session(state: &AppState, account_id: Uuid) -> PageResult<String> {
    let auth_session_id = Uuid::new_v4().to_string();
    let lifetime = Duration::days(state.config.auth_session_days);

    state
        .db
        .create_auth_session(&auth_session_id, account_id, Utc::now() + lifetime)
        .await?;

    Ok(cookie_header(
        &auth_session_id,
        lifetime.num_seconds(),
        state.config.cookie_secure,
    ))
}

fn logged_in_redirect(cookie: String) -> Response {
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

/// Creates the configured administrator account if it does not exist yet.
pub async fn bootstrap_admin(
    db: &dyn DatabaseService,
    config: &Config,
) -> Result<Option<Person>, ApiError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(None);
    };

    match db.get_credentials_by_username(username).await {
        Ok(_) => return Ok(None),
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let hashed_password = hash_password(password)
        .map_err(|e| ApiError::Internal(format!("Failed to hash admin password: {}", e)))?;
    let admin = db.create_account(username, "", &hashed_password, true).await?;
    info!("Created administrator account '{}'", admin.username);
    Ok(Some(admin))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /login/ - Describe the login form
#[utoipa::path(
    get,
    path = "/login/",
    responses(
        (status = 200, description = "Login form", body = FormPage),
        (status = 303, description = "Already logged in, redirected home")
    )
)]
pub async fn login_page(Extension(viewer): Extension<Viewer>) -> Response {
    if viewer.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    Json(FormPage::new("login", &["username", "password"])).into_response()
}

/// POST /login/ - Login with an existing account
#[utoipa::path(
    post,
    path = "/login/",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, session cookie set"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> PageResult<Response> {
    let credentials = match state.db.get_credentials_by_username(form.username.trim()).await {
        Ok(credentials) => credentials,
        Err(PortError::NotFound(_)) => return Err(PageError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&form.password, &credentials.hashed_password) {
        warn!("Failed login attempt for '{}'", credentials.username);
        return Err(PageError::InvalidCredentials);
    }

    let cookie = start_auth_session(&state, credentials.account_id).await?;
    info!("User '{}' logged in", credentials.username);
    Ok(logged_in_redirect(cookie))
}

/// GET /signup/ - Describe the signup form
#[utoipa::path(
    get,
    path = "/signup/",
    responses(
        (status = 200, description = "Signup form", body = FormPage),
        (status = 303, description = "Already logged in, redirected home")
    )
)]
pub async fn signup_page(Extension(viewer): Extension<Viewer>) -> Response {
    if viewer.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    Json(FormPage::new(
        "signup",
        &["username", "email", "password", "confirm_password"],
    ))
    .into_response()
}

/// POST /signup/ - Create a new account and log it in
#[utoipa::path(
    post,
    path = "/signup/",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, session cookie set"),
        (status = 400, description = "Invalid form")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> PageResult<Response> {
    let signup = form.validated()?;

    let hashed_password = hash_password(&form.password)
        .map_err(|e| PageError::Internal(format!("Failed to hash password: {}", e)))?;

    let person = match state
        .db
        .create_account(&signup.username, &signup.email, &hashed_password, false)
        .await
    {
        Ok(person) => person,
        Err(PortError::Conflict(_)) => {
            return Err(PageError::validation(
                "A user with that username already exists.",
            ))
        }
        Err(e) => return Err(e.into()),
    };

    let cookie = start_auth_session(&state, person.account_id).await?;
    info!("New account '{}' signed up", person.username);
    Ok(logged_in_redirect(cookie))
}

/// GET|POST /logout/ - Invalidate the session and clear the cookie
#[utoipa::path(
    post,
    path = "/logout/",
    responses(
        (status = 303, description = "Logged out, redirected home")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> PageResult<Response> {
    if let Some(auth_session_id) = &viewer.auth_session_id {
        state.db.delete_auth_session(auth_session_id).await?;
    }

    let cookie = cookie_header("", 0, state.config.cookie_secure);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_the_original_password() {
        let hashed = hash_password("shalom123").unwrap();
        assert!(verify_password("shalom123", &hashed));
        assert!(!verify_password("shalom124", &hashed));
        assert!(!verify_password("shalom123", "not-a-phc-string"));
    }

    #[test]
    fn cookie_flags_follow_config() {
        assert_eq!(
            cookie_header("abc", 60, true),
            "session=abc; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=60"
        );
        assert_eq!(
            cookie_header("", 0, false),
            "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
        );
    }
}
