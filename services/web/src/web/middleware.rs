//! services/web/src/web/middleware.rs
//!
//! Authentication middleware: resolves the session cookie into a `Viewer`
//! and guards member-only and admin-only routes.

use crate::error::PageError;
use crate::web::state::{AppState, Viewer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use gemara_chain_core::ports::PortError;
use std::sync::Arc;
use tracing::{debug, error};

pub const SESSION_COOKIE: &str = "session";

/// Extracts the auth session id from the `Cookie` header.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header
        .split(';')
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

/// Middleware that resolves the auth session cookie into a [`Viewer`].
///
/// Every request gets a viewer in its extensions. A missing, expired or
/// unknown cookie yields an anonymous viewer rather than an error.
pub async fn load_viewer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let mut viewer = Viewer::anonymous();

    if let Some(auth_session_id) = session_cookie(req.headers()) {
        match state.db.validate_auth_session(&auth_session_id).await {
            Ok(account_id) => match state.db.get_person_by_account(account_id).await {
                Ok(person) => {
                    viewer = Viewer {
                        person: Some(person),
                        auth_session_id: Some(auth_session_id),
                    };
                }
                Err(e) => error!("Failed to load person for account {}: {:?}", account_id, e),
            },
            Err(PortError::Unauthorized) => debug!("Ignoring stale session cookie"),
            Err(e) => error!("Failed to validate auth session: {:?}", e),
        }
    }

    req.extensions_mut().insert(viewer);
    next.run(req).await
}

fn viewer_of(req: &Request) -> Option<&Viewer> {
    req.extensions().get::<Viewer>()
}

/// Sends anonymous visitors of member pages to the login form.
pub async fn require_login(req: Request, next: Next) -> Result<Response, PageError> {
    if !viewer_of(&req).is_some_and(Viewer::is_authenticated) {
        return Err(PageError::LoginRequired);
    }
    Ok(next.run(req).await)
}

/// Admin console guard: login first, then the admin flag.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, PageError> {
    match viewer_of(&req) {
        Some(viewer) if viewer.is_admin() => Ok(next.run(req).await),
        Some(viewer) if viewer.is_authenticated() => Err(PageError::Forbidden),
        _ => Err(PageError::LoginRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn finds_session_among_other_cookies() {
        assert_eq!(
            session_cookie(&headers("theme=dark; session=abc-123; lang=he")),
            Some("abc-123".to_string())
        );
    }

    #[test]
    fn ignores_lookalike_and_empty_cookies() {
        assert_eq!(session_cookie(&headers("old_session=abc")), None);
        assert_eq!(session_cookie(&headers("session=")), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }
}
