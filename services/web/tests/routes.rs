//! Drives the full router over the in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use gemara_chain_core::ports::DatabaseService;
use gemara_chain_core::{NewSession, NewTextStudy, TextStudy, TextStudyType};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use web_lib::adapters::MemoryAdapter;
use web_lib::config::Config;
use web_lib::web::{auth::bootstrap_admin, router, AppState};

const PASSWORD: &str = "shalom123";

struct TestApp {
    router: Router,
    db: Arc<MemoryAdapter>,
    study_type: TextStudyType,
    psalms: Vec<TextStudy>,
}

fn test_config() -> Config {
    Config {
        cookie_secure: false,
        seed_catalog: false,
        admin_username: Some("gabbai".to_string()),
        admin_password: Some(PASSWORD.to_string()),
        ..Config::default()
    }
}

/// A study type with two psalms of two sections each.
async fn spawn_app() -> TestApp {
    let db = Arc::new(MemoryAdapter::new());
    let config = test_config();
    bootstrap_admin(db.as_ref(), &config).await.unwrap();

    let study_type = db.ensure_text_study_type("Tehilim").await.unwrap();
    let mut psalms = Vec::new();
    for name in ["Psalm 1", "Psalm 2"] {
        let text_study = db
            .create_text_study(NewTextStudy {
                type_id: study_type.id,
                name: name.to_string(),
                book: "Book 1".to_string(),
                link: String::new(),
                total_sections: 2,
            })
            .await
            .unwrap();
        psalms.push(text_study);
    }

    let store: Arc<dyn DatabaseService> = db.clone();
    let state = Arc::new(AppState::new(store, Arc::new(config)));
    TestApp {
        router: router(state),
        db,
        study_type,
        psalms,
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Signs up and returns the `Cookie` header value for the new session.
    async fn signup(&self, username: &str) -> String {
        let body = format!(
            "username={username}&email={username}%40example.com&password={PASSWORD}&confirm_password={PASSWORD}"
        );
        let response = self.send(post_form("/signup/", &body, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response)
    }

    async fn login(&self, username: &str) -> String {
        let body = format!("username={username}&password={PASSWORD}");
        let response = self.send(post_form("/login/", &body, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response)
    }

    /// Creates a session through the form and returns its slug.
    async fn create_session(&self, cookie: &str, name: &str) -> String {
        let deadline = (Utc::now() + Duration::days(30)).format("%Y-%m-%d");
        let body = format!(
            "name={}&description=&date_limit={}&session_type={}",
            name.replace(' ', "+"),
            deadline,
            self.study_type.id
        );
        let response = self.send(post_form("/create-session/", &body, Some(cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = location(&response);
        location
            .trim_start_matches("/session/")
            .trim_end_matches('/')
            .to_string()
    }

    async fn json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn section(&self, psalm: usize, section: u32) -> String {
        format!("{}-{}", self.psalms[psalm].id, section)
    }
}

fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect location")
        .to_str()
        .unwrap()
        .to_string()
}

//=========================================================================================
// Accounts
//=========================================================================================

#[tokio::test]
async fn weak_or_mismatched_passwords_are_rejected() {
    let app = spawn_app().await;

    for (password, confirm, field) in [
        ("short1", "short1", "password: "),
        ("nodigitshere", "nodigitshere", "password: must contain at least one digit"),
        ("shalom123", "shalom124", "confirm_password: "),
    ] {
        let body = format!("username=moshe&email=&password={password}&confirm_password={confirm}");
        let (status, body) = app.json(post_form("/signup/", &body, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with(field), "{message}");
    }
    assert!(app.db.get_credentials_by_username("moshe").await.is_err());
}

#[tokio::test]
async fn login_sets_a_cookie_that_identifies_the_viewer() {
    let app = spawn_app().await;
    app.signup("rivka").await;

    let (status, body) = app
        .json(post_form("/login/", "username=rivka&password=wrong1234", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");

    let cookie = app.login("rivka").await;
    let (status, home) = app.json(get("/", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(home["viewer"]["username"], "rivka");

    let response = app.send(get("/logout/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let (_, home) = app.json(get("/", Some(&cookie))).await;
    assert!(home["viewer"].is_null());
}

#[tokio::test]
async fn member_pages_redirect_anonymous_visitors_to_login() {
    let app = spawn_app().await;
    for uri in ["/profile/", "/create-session/"] {
        let response = app.send(get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login/");
    }
}

//=========================================================================================
// Sessions
//=========================================================================================

#[tokio::test]
async fn duplicate_names_get_unique_slugs() {
    let app = spawn_app().await;
    let cookie = app.signup("yossef").await;

    let first = app.create_session(&cookie, "Daf Yomi").await;
    let second = app.create_session(&cookie, "Daf Yomi").await;
    assert_eq!(first, "daf-yomi");
    assert_eq!(second, "daf-yomi-1");

    let (status, detail) = app.json(get("/session/daf-yomi-1/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["session"]["name"], "Daf Yomi");
}

#[tokio::test]
async fn past_deadlines_are_rejected() {
    let app = spawn_app().await;
    let cookie = app.signup("yossef").await;

    let yesterday = (Utc::now() - Duration::days(1)).format("%Y-%m-%d");
    let body = format!(
        "name=Late&description=&date_limit={}&session_type={}",
        yesterday, app.study_type.id
    );
    let (status, body) = app.json(post_form("/create-session/", &body, Some(&cookie))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "date_limit: must be a future date");
    assert!(app.db.list_sessions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_owner_can_update_or_delete() {
    let app = spawn_app().await;
    let owner = app.signup("owner").await;
    let intruder = app.signup("intruder").await;
    let slug = app.create_session(&owner, "Siyum Tehilim").await;
    let session = app.db.get_session_by_slug(&slug).await.unwrap();

    let deadline = (Utc::now() + Duration::days(3)).format("%Y-%m-%d");
    let update = format!("name=Renamed&description=new&date_limit={deadline}");
    let update_uri = format!("/update-session/{}/", session.id);
    let delete_uri = format!("/delete-session/{}/", session.id);

    let (status, _) = app.json(post_form(&update_uri, &update, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.json(post_form(&update_uri, &update, Some(&intruder))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.json(post_form(&delete_uri, "", Some(&intruder))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.json(post_form(&update_uri, &update, Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let renamed = app.db.get_session_by_id(session.id).await.unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.slug, slug);

    let (status, _) = app.json(post_form(&delete_uri, "", Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.json(get(&format!("/session/{slug}/"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

//=========================================================================================
// Reservations
//=========================================================================================

#[tokio::test]
async fn reserving_and_unreserving_a_section() {
    let app = spawn_app().await;
    let cookie = app.signup("naomi").await;
    let slug = app.create_session(&cookie, "Tehilim Chain").await;
    let uri = format!("/session/{slug}/");

    let body = format!("sections={}", app.section(0, 2));
    let response = app.send(post_form(&uri, &body, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), uri);

    let session = app.db.get_session_by_slug(&slug).await.unwrap();
    let rows = app.db.list_reservations_for_session(session.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text_study_id, app.psalms[0].id);
    assert_eq!(rows[0].section, Some(2));

    let (_, detail) = app.json(get(&uri, Some(&cookie))).await;
    let slot = &detail["books"][0]["text_studies"][0]["sections"][1];
    assert_eq!(slot["chosen_by_name"], "naomi");
    assert_eq!(slot["reserved_by_viewer"], true);

    // Submitting without the key releases it
    let response = app.send(post_form(&uri, "", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.db.list_reservations_for_session(session.id).await.unwrap().is_empty());

    let (_, detail) = app.json(get(&uri, Some(&cookie))).await;
    assert!(detail["books"][0]["text_studies"][0]["sections"][1]["chosen_by_name"].is_null());
}

#[tokio::test]
async fn guests_reserve_with_a_name_and_email() {
    let app = spawn_app().await;
    let owner = app.signup("owner").await;
    let slug = app.create_session(&owner, "Guests Welcome").await;
    let uri = format!("/session/{slug}/");

    let body = format!("sections={}", app.section(1, 1));
    let (status, _) = app.json(post_form(&uri, &body, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = format!(
        "sections={}&guest_name=Leah&guest_email=leah%40example.com",
        app.section(1, 1)
    );
    let response = app.send(post_form(&uri, &body, None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // The owner asking for the same slot is turned away silently
    let body = format!("sections={}", app.section(1, 1));
    app.send(post_form(&uri, &body, Some(&owner))).await;

    let (_, detail) = app.json(get(&uri, Some(&owner))).await;
    let slot = &detail["books"][0]["text_studies"][1]["sections"][0];
    assert_eq!(slot["chosen_by_name"], "Leah");
    assert_eq!(slot["reserved_by_viewer"], false);
}

#[tokio::test]
async fn anonymous_posts_without_slots_change_nothing() {
    let app = spawn_app().await;
    let owner = app.signup("owner").await;
    let slug = app.create_session(&owner, "Quiet").await;
    let uri = format!("/session/{slug}/");
    let participants = app.db.count_participants().await.unwrap();

    let body = "guest_name=Leah&guest_email=leah%40example.com";
    let response = app.send(post_form(&uri, body, None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), uri);

    assert_eq!(app.db.count_participants().await.unwrap(), participants);
    let session = app.db.get_session_by_slug(&slug).await.unwrap();
    assert!(app.db.list_reservations_for_session(session.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_slots_are_rejected() {
    let app = spawn_app().await;
    let cookie = app.signup("naomi").await;
    let slug = app.create_session(&cookie, "Strict").await;
    let uri = format!("/session/{slug}/");

    for value in ["not-a-slot".to_string(), app.section(0, 3)] {
        let body = format!("sections={value}");
        let (status, body) = app.json(post_form(&uri, &body, Some(&cookie))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn session_completes_when_every_unit_is_covered() {
    let app = spawn_app().await;
    let cookie = app.signup("eliyahu").await;
    let slug = app.create_session(&cookie, "Full Circle").await;
    let uri = format!("/session/{slug}/");

    // Whole first psalm, both sections of the second
    let body = format!(
        "text_studies={}&sections={}&sections={}",
        app.psalms[0].id,
        app.section(1, 1),
        app.section(1, 2)
    );
    app.send(post_form(&uri, &body, Some(&cookie))).await;

    let (_, detail) = app.json(get(&uri, None)).await;
    assert_eq!(detail["session"]["is_completed"], true);
    assert_eq!(detail["session"]["covered_units"], 2);
    assert_eq!(detail["books"][0]["text_studies"][1]["all_sections_reserved"], true);

    let (_, home) = app.json(get("/", None)).await;
    assert_eq!(home["total_completed_sessions"], 1);
    assert_eq!(home["completed_sessions"][0]["slug"], slug);
}

#[tokio::test]
async fn expired_sessions_are_completed_and_frozen() {
    let app = spawn_app().await;
    let session = app
        .db
        .create_session(NewSession {
            name: "Last Year".to_string(),
            description: String::new(),
            deadline: (Utc::now() - Duration::days(2)).date_naive(),
            slug: "last-year".to_string(),
            owner_id: None,
            type_id: app.study_type.id,
        })
        .await
        .unwrap();
    let cookie = app.signup("late").await;

    let body = format!("sections={}", app.section(0, 1));
    let response = app.send(post_form("/session/last-year/", &body, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.db.list_reservations_for_session(session.id).await.unwrap().is_empty());

    let (_, detail) = app.json(get("/session/last-year/", None)).await;
    assert_eq!(detail["session"]["is_expired"], true);
    assert_eq!(detail["session"]["is_completed"], true);
}

#[tokio::test]
async fn holders_toggle_completion_of_their_own_slots() {
    let app = spawn_app().await;
    let holder = app.signup("holder").await;
    let other = app.signup("other").await;
    let slug = app.create_session(&holder, "Progress").await;

    let body = format!("sections={}", app.section(0, 1));
    app.send(post_form(&format!("/session/{slug}/"), &body, Some(&holder))).await;
    let session = app.db.get_session_by_slug(&slug).await.unwrap();
    let reservation = app.db.list_reservations_for_session(session.id).await.unwrap()[0].clone();
    let uri = format!("/mark_completed/reservation/{}/", reservation.id);

    let (status, _) = app.json(post_form(&uri, "", Some(&other))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.json(post_form(&uri, "", Some(&holder))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_completed"], true);
    assert!(app.db.get_reservation(reservation.id).await.unwrap().is_completed);

    let uri = format!("/mark_completed/textstudyreservation/{}/", reservation.id);
    let (_, body) = app.json(post_form(&uri, "", Some(&holder))).await;
    assert_eq!(body["is_completed"], false);

    let uri = format!("/mark_completed/session/{}/", reservation.id);
    let (status, _) = app.json(post_form(&uri, "", Some(&holder))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

//=========================================================================================
// Home, Profile & Admin
//=========================================================================================

#[tokio::test]
async fn sessions_are_listed_newest_first() {
    let app = spawn_app().await;
    let cookie = app.signup("dina").await;
    app.create_session(&cookie, "Older").await;
    app.create_session(&cookie, "Newer").await;

    let (_, home) = app.json(get("/", None)).await;
    assert_eq!(home["ongoing_sessions"][0]["name"], "Newer");
    assert_eq!(home["ongoing_sessions"][1]["name"], "Older");

    let (_, profile) = app.json(get("/profile/", Some(&cookie))).await;
    assert_eq!(profile["user_sessions"][0]["name"], "Newer");
    assert_eq!(profile["user_sessions"][1]["name"], "Older");
}

#[tokio::test]
async fn home_filters_by_type_name_and_counts_participants() {
    let app = spawn_app().await;
    let cookie = app.signup("shimon").await;
    app.create_session(&cookie, "Tehilim Week").await;

    let (_, home) = app.json(get("/?type=Tehilim&display=list", None)).await;
    assert_eq!(home["session_type"], "Tehilim");
    assert_eq!(home["display_type"], "list");
    assert_eq!(home["total_sessions"], 1);
    assert_eq!(home["total_ongoing_sessions"], 1);
    // The admin and shimon
    assert_eq!(home["total_users"], 2);
    assert_eq!(home["total_participants"], 2);

    let (_, home) = app.json(get("/?type=Mishna", None)).await;
    assert_eq!(home["total_sessions"], 0);
    assert_eq!(home["display_type"], "grid");
}

#[tokio::test]
async fn profile_lists_owned_and_joined_sessions() {
    let app = spawn_app().await;
    let owner = app.signup("owner").await;
    let member = app.signup("member").await;
    let slug = app.create_session(&owner, "Joined").await;
    app.create_session(&member, "Mine").await;

    let body = format!("sections={}", app.section(0, 1));
    app.send(post_form(&format!("/session/{slug}/"), &body, Some(&member))).await;

    let (status, profile) = app.json(get("/profile/", Some(&member))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user_sessions"][0]["name"], "Mine");
    assert_eq!(profile["reserved_sessions"][0]["slug"], slug);
    assert_eq!(profile["reservations"][0]["text_study_name"], "Psalm 1");
    assert_eq!(profile["reservations"][0]["section"], 1);
}

#[tokio::test]
async fn admin_console_is_limited_to_administrators() {
    let app = spawn_app().await;
    let member = app.signup("member").await;

    let response = app.send(get("/admin/", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let (status, _) = app.json(get("/admin/", Some(&member))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.login("gabbai").await;
    let start = (Utc::now() - Duration::hours(1)).to_rfc3339();
    let end = (Utc::now() + Duration::days(1)).to_rfc3339();
    let body = format!(
        "title=Siyum&description=Join+us&link=&start_date={}&end_date={}",
        start.replace('+', "%2B"),
        end.replace('+', "%2B")
    );
    let (status, created) = app
        .json(post_form("/admin/announcements/", &body, Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["link"].is_null());

    let (_, home) = app.json(get("/", None)).await;
    assert_eq!(home["announcements"][0]["title"], "Siyum");

    let body = format!(
        "type_id={}&name=Psalm+3&book=&link=&total_sections=3000000000",
        app.study_type.id
    );
    let (status, body) = app
        .json(post_form("/admin/text-studies/", &body, Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("total_sections: "));

    let (status, overview) = app.json(get("/admin/", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["announcements"], 1);
    assert_eq!(overview["text_study_types"], 1);
}
