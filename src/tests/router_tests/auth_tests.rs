// src/tests/router_tests/auth_tests.rs
use http::Method;
use serde_json::json;

use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{login, request, setup_db};

#[test]
fn post_session_lazily_creates_the_profile() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup_db();

    let req = request(
        Method::POST,
        "/auth/session",
        None,
        Some(json!({ "id": "ext-42", "email": "Student@Example.EDU" })),
    );
    let resp = handle(req, &db)?;
    assert_eq!(resp.status(), 201);

    // Profile exists with normalized email, and a session was stored.
    db.with_conn(|conn| {
        let email: String = conn
            .query_row("select email from profiles where id = 'ext-42'", [], |r| r.get(0))
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        assert_eq!(email, "student@example.edu");

        let sessions: i64 = conn
            .query_row("select count(*) from sessions", [], |r| r.get(0))
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        assert_eq!(sessions, 1);
        Ok(())
    })?;

    // A second login reuses the profile but issues a new session.
    let req = request(
        Method::POST,
        "/auth/session",
        None,
        Some(json!({ "id": "ext-42", "email": "student@example.edu" })),
    );
    let resp = handle(req, &db)?;
    assert_eq!(resp.status(), 201);

    db.with_conn(|conn| {
        let profiles: i64 = conn
            .query_row("select count(*) from profiles", [], |r| r.get(0))
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        assert_eq!(profiles, 1);

        let sessions: i64 = conn
            .query_row("select count(*) from sessions", [], |r| r.get(0))
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        assert_eq!(sessions, 2);
        Ok(())
    })?;

    Ok(())
}

#[test]
fn session_request_needs_a_plausible_identity() {
    let db = setup_db();

    let req = request(
        Method::POST,
        "/auth/session",
        None,
        Some(json!({ "id": "  ", "email": "a@b.edu" })),
    );
    assert!(matches!(handle(req, &db), Err(ServerError::BadRequest(_))));

    let req = request(
        Method::POST,
        "/auth/session",
        None,
        Some(json!({ "id": "u1", "email": "not-an-email" })),
    );
    assert!(matches!(handle(req, &db), Err(ServerError::BadRequest(_))));
}

#[test]
fn protected_routes_reject_missing_or_bogus_tokens() {
    let db = setup_db();

    let req = request(Method::GET, "/bookings", None, None);
    assert!(matches!(handle(req, &db), Err(ServerError::Unauthorized(_))));

    let req = request(Method::GET, "/bookings", Some("made-up-token"), None);
    assert!(matches!(handle(req, &db), Err(ServerError::Unauthorized(_))));
}

#[test]
fn valid_session_reaches_protected_routes() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup_db();
    let token = login(&db, "u1", "u1@b.edu", "User One");

    let resp = handle(request(Method::GET, "/bookings", Some(&token), None), &db)?;
    assert_eq!(resp.status(), 200);

    let resp = handle(request(Method::GET, "/profiles/me", Some(&token), None), &db)?;
    assert_eq!(resp.status(), 200);

    Ok(())
}

#[test]
fn unknown_routes_are_not_found() {
    let db = setup_db();
    let req = request(Method::GET, "/definitely/not/here", None, None);
    assert!(matches!(handle(req, &db), Err(ServerError::NotFound)));
}
