// src/router.rs
use astra::Request;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::sessions;
use crate::auth::token::generate_session_token;
use crate::db::{bookings, profiles, reviews, spaces, Database};
use crate::domain::booking::{BookingStatus, NewBooking};
use crate::domain::filters::SearchFilters;
use crate::domain::paging::DEFAULT_PAGE_SIZE;
use crate::domain::pricing;
use crate::domain::profile::ProfileUpdate;
use crate::domain::review::NewReview;
use crate::domain::space::{NewSpace, SizeCategory, SpaceUpdate, StorageType};
use crate::errors::{ResultResp, ServerError};
use crate::responses::{json_response, no_content};

pub fn handle(mut req: Request, db: &Database) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => json_response(200, &serde_json::json!({ "service": "campus-stash", "status": "ok" })),

        ("POST", ["auth", "session"]) => start_session(&mut req, db),

        ("GET", ["spaces"]) => search_spaces(&req, db),
        ("POST", ["spaces"]) => create_space(&mut req, db),
        ("GET", ["spaces", id]) => get_space(db, id),
        ("PATCH", ["spaces", id]) => update_space(&mut req, db, id),
        ("DELETE", ["spaces", id]) => delete_space(&req, db, id),
        ("GET", ["spaces", id, "reviews"]) => space_reviews(db, id),
        ("GET", ["spaces", id, "quote"]) => space_quote(&req, db, id),

        ("GET", ["bookings"]) => my_bookings(&req, db),
        ("POST", ["bookings"]) => create_booking(&mut req, db),
        ("POST", ["bookings", id, action]) => booking_action(&req, db, id, action),

        ("POST", ["reviews"]) => create_review(&mut req, db),

        ("GET", ["profiles", "me"]) => my_profile(&req, db),
        ("PATCH", ["profiles", "me"]) => update_my_profile(&mut req, db),
        ("GET", ["profiles", "me", "spaces"]) => my_spaces(&req, db),

        _ => Err(ServerError::NotFound),
    }
}

// ---------- auth ----------

/// Stand-in for the external auth provider: the client presents its
/// authenticated identity, we lazily create the profile and hand back
/// a bearer token.
#[derive(Debug, Deserialize)]
struct SessionRequest {
    id: String,
    email: String,
    full_name: Option<String>,
}

fn start_session(req: &mut Request, db: &Database) -> ResultResp {
    let body: SessionRequest = read_json(req)?;
    if body.id.trim().is_empty() {
        return Err(ServerError::BadRequest("id is required".into()));
    }

    let now = now_unix();
    let token = generate_session_token();

    let profile = db.with_conn(|conn| {
        let profile =
            profiles::ensure_profile(conn, body.id.trim(), &body.email, body.full_name.as_deref(), now)?;
        sessions::create_session(conn, &profile.id, &token, now)?;
        Ok(profile)
    })?;

    json_response(
        201,
        &serde_json::json!({ "token": token, "profile": profile }),
    )
}

/// Resolve the bearer token to a profile id, or 401.
fn authenticate(req: &Request, db: &Database) -> Result<String, ServerError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = match header.strip_prefix("Bearer ") {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => return Err(ServerError::Unauthorized("missing bearer token".into())),
    };

    let now = now_unix();
    db.with_conn(|conn| sessions::profile_id_from_session(conn, &token, now))?
        .ok_or_else(|| ServerError::Unauthorized("invalid or expired session".into()))
}

// ---------- spaces ----------

fn search_spaces(req: &Request, db: &Database) -> ResultResp {
    let q = parse_query(req);

    let filters = SearchFilters {
        storage_type: q.get("storage_type").map(|s| StorageType::parse(s)).transpose()?,
        size_category: q.get("size_category").map(|s| SizeCategory::parse(s)).transpose()?,
        min_price_cents: parse_i64(&q, "min_price_cents")?,
        max_price_cents: parse_i64(&q, "max_price_cents")?,
        campus_area: q.get("campus_area").cloned(),
        amenities: q
            .get("amenities")
            .map(|s| {
                s.split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        start_date: parse_date(&q, "start_date")?,
        end_date: parse_date(&q, "end_date")?,
    };

    let page_no = parse_usize(&q, "page")?.unwrap_or(1);
    let page_size = parse_usize(&q, "page_size")?.unwrap_or(DEFAULT_PAGE_SIZE);

    let page = db.with_conn(|conn| spaces::search_spaces(conn, &filters, page_no, page_size))?;

    json_response(
        200,
        &serde_json::json!({ "spaces": page.items, "total": page.total }),
    )
}

fn create_space(req: &mut Request, db: &Database) -> ResultResp {
    let actor = authenticate(req, db)?;
    let new: NewSpace = read_json(req)?;
    let now = now_unix();

    let space = db.with_conn(|conn| spaces::create_space(conn, &actor, &new, now))?;
    json_response(201, &space)
}

fn get_space(db: &Database, id: &str) -> ResultResp {
    let space = db.with_conn(|conn| spaces::get_space(conn, id))?;
    json_response(200, &space)
}

fn update_space(req: &mut Request, db: &Database, id: &str) -> ResultResp {
    let actor = authenticate(req, db)?;
    let update: SpaceUpdate = read_json(req)?;
    let now = now_unix();

    let space = db.with_conn(|conn| spaces::update_space(conn, &actor, id, &update, now))?;
    json_response(200, &space)
}

fn delete_space(req: &Request, db: &Database, id: &str) -> ResultResp {
    let actor = authenticate(req, db)?;
    let now = now_unix();

    db.with_conn(|conn| spaces::deactivate_space(conn, &actor, id, now))?;
    no_content()
}

fn space_reviews(db: &Database, id: &str) -> ResultResp {
    let list = db.with_conn(|conn| {
        // 404 for unknown spaces rather than an empty list.
        spaces::get_space(conn, id)?;
        reviews::reviews_for_space(conn, id)
    })?;
    json_response(200, &list)
}

fn space_quote(req: &Request, db: &Database, id: &str) -> ResultResp {
    let q = parse_query(req);
    let start = parse_date(&q, "start_date")?
        .ok_or_else(|| ServerError::BadRequest("start_date is required".into()))?;
    let end = parse_date(&q, "end_date")?
        .ok_or_else(|| ServerError::BadRequest("end_date is required".into()))?;

    let space = db.with_conn(|conn| spaces::get_space(conn, id))?;
    let quote = pricing::quote(space.space.price_per_month_cents, start, end)?;

    json_response(200, &quote)
}

// ---------- bookings ----------

fn my_bookings(req: &Request, db: &Database) -> ResultResp {
    let actor = authenticate(req, db)?;
    let q = parse_query(req);

    let list = db.with_conn(|conn| match q.get("role").map(String::as_str) {
        None => bookings::bookings_for_user(conn, &actor),
        Some("renter") => bookings::bookings_for_renter(conn, &actor),
        Some("host") => bookings::bookings_for_host(conn, &actor),
        Some(other) => Err(ServerError::BadRequest(format!("unknown role: {other}"))),
    })?;

    json_response(200, &list)
}

fn create_booking(req: &mut Request, db: &Database) -> ResultResp {
    let actor = authenticate(req, db)?;
    let new: NewBooking = read_json(req)?;
    let now = now_unix();

    let booking = db.with_conn(|conn| bookings::create_booking(conn, &actor, &new, now))?;
    json_response(201, &booking)
}

fn booking_action(req: &Request, db: &Database, id: &str, action: &str) -> ResultResp {
    let actor = authenticate(req, db)?;
    let next = match action {
        "confirm" => BookingStatus::Confirmed,
        "cancel" => BookingStatus::Cancelled,
        "complete" => BookingStatus::Completed,
        _ => return Err(ServerError::NotFound),
    };
    let now = now_unix();

    let booking = db.with_conn(|conn| bookings::set_booking_status(conn, &actor, id, next, now))?;
    json_response(200, &booking)
}

// ---------- reviews ----------

fn create_review(req: &mut Request, db: &Database) -> ResultResp {
    let actor = authenticate(req, db)?;
    let new: NewReview = read_json(req)?;
    let now = now_unix();

    let review = db.with_conn(|conn| reviews::create_review(conn, &actor, &new, now))?;
    json_response(201, &review)
}

// ---------- profiles ----------

fn my_profile(req: &Request, db: &Database) -> ResultResp {
    let actor = authenticate(req, db)?;
    let profile = db.with_conn(|conn| profiles::require_profile(conn, &actor))?;
    json_response(200, &profile)
}

fn update_my_profile(req: &mut Request, db: &Database) -> ResultResp {
    let actor = authenticate(req, db)?;
    let update: ProfileUpdate = read_json(req)?;
    let now = now_unix();

    let profile = db.with_conn(|conn| profiles::update_profile(conn, &actor, &update, now))?;
    json_response(200, &profile)
}

fn my_spaces(req: &Request, db: &Database) -> ResultResp {
    let actor = authenticate(req, db)?;
    let list = db.with_conn(|conn| spaces::spaces_by_host(conn, &actor))?;
    json_response(200, &serde_json::json!({ "spaces": list }))
}

// ---------- plumbing ----------

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn read_json<T: DeserializeOwned>(req: &mut Request) -> Result<T, ServerError> {
    serde_json::from_reader(req.body_mut().reader())
        .map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {e}")))
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    let mut map = HashMap::new();

    if let Some(q) = req.uri().query() {
        for pair in q.split('&') {
            let mut parts = pair.splitn(2, '=');
            if let (Some(k), Some(v)) = (parts.next(), parts.next()) {
                map.insert(k.to_string(), percent_decode(v));
            }
        }
    }

    map
}

/// Just enough decoding for query values: '+' and %XX escapes.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes.get(i + 1..i + 3);
                match hex.and_then(|h| std::str::from_utf8(h).ok()) {
                    Some(h) => match u8::from_str_radix(h, 16) {
                        Ok(b) => {
                            out.push(b);
                            i += 3;
                        }
                        Err(_) => {
                            out.push(bytes[i]);
                            i += 1;
                        }
                    },
                    None => {
                        out.push(bytes[i]);
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn parse_date(q: &HashMap<String, String>, key: &str) -> Result<Option<NaiveDate>, ServerError> {
    match q.get(key) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("{key} must be YYYY-MM-DD"))),
    }
}

fn parse_i64(q: &HashMap<String, String>, key: &str) -> Result<Option<i64>, ServerError> {
    match q.get(key) {
        None => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("{key} must be an integer"))),
    }
}

fn parse_usize(q: &HashMap<String, String>, key: &str) -> Result<Option<usize>, ServerError> {
    match q.get(key) {
        None => Ok(None),
        Some(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("{key} must be a non-negative integer"))),
    }
}
