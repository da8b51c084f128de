// src/tests/router_tests/search_tests.rs
use chrono::NaiveDate;
use http::Method;

use crate::db::{bookings, spaces, Database};
use crate::domain::booking::{BookingStatus, NewBooking};
use crate::domain::filters::SearchFilters;
use crate::domain::space::{NewSpace, SizeCategory, StorageType};
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{login, request, setup_db};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn seed_space(db: &Database, title: &str, t: StorageType, now: i64) -> String {
    db.with_conn(|conn| {
        Ok(spaces::create_space(
            conn,
            "host1",
            &NewSpace {
                title: title.into(),
                description: "seeded".into(),
                storage_type: t,
                size_category: SizeCategory::Medium,
                price_per_month_cents: 5000,
                address: "1 Bear Pl".into(),
                campus_area: Some("East Village".into()),
                available_from: d(2025, 5, 1),
                available_until: d(2025, 12, 31),
                amenities: vec![],
                images: vec![],
            },
            now,
        )?
        .space
        .id)
    })
    .unwrap()
}

fn confirmed_booking(db: &Database, space_id: &str, start: NaiveDate, end: NaiveDate) {
    db.with_conn(|conn| {
        let id = bookings::create_booking(
            conn,
            "renter1",
            &NewBooking {
                space_id: space_id.into(),
                start_date: start,
                end_date: end,
                special_requests: None,
            },
            500,
        )?
        .booking
        .id;
        bookings::set_booking_status(conn, "host1", &id, BookingStatus::Confirmed, 501)?;
        Ok(())
    })
    .unwrap();
}

/// The full pipeline: predicate filter, then confirmed-overlap
/// exclusion, over a five-listing catalog and a September window.
#[test]
fn search_excludes_conflicts_first_then_type_mismatches() {
    let db = setup_db();
    login(&db, "host1", "host1@b.edu", "Host One");
    login(&db, "renter1", "renter1@b.edu", "Renter One");

    let s1 = seed_space(&db, "Dorm taken", StorageType::DormRoom, 100);
    let s2 = seed_space(&db, "Garage taken", StorageType::Garage, 101);
    let s3 = seed_space(&db, "Dorm free", StorageType::DormRoom, 102);
    let s4 = seed_space(&db, "Dorm freed up", StorageType::DormRoom, 103);
    let _s5 = seed_space(&db, "Unit free", StorageType::StorageUnit, 104);

    // Two confirmed bookings overlap Sep 1-30 from either side.
    confirmed_booking(&db, &s1, d(2025, 9, 15), d(2025, 10, 15));
    confirmed_booking(&db, &s2, d(2025, 8, 20), d(2025, 9, 5));

    // A pending request on s3 must not reserve capacity.
    db.with_conn(|conn| {
        bookings::create_booking(
            conn,
            "renter1",
            &NewBooking {
                space_id: s3.clone(),
                start_date: d(2025, 9, 1),
                end_date: d(2025, 9, 30),
                special_requests: None,
            },
            600,
        )
        .map(|_| ())
    })
    .unwrap();

    // A cancelled confirmation on s4 frees it again.
    db.with_conn(|conn| {
        let id = bookings::create_booking(
            conn,
            "renter1",
            &NewBooking {
                space_id: s4.clone(),
                start_date: d(2025, 9, 1),
                end_date: d(2025, 9, 30),
                special_requests: None,
            },
            700,
        )?
        .booking
        .id;
        bookings::set_booking_status(conn, "host1", &id, BookingStatus::Confirmed, 701)?;
        bookings::set_booking_status(conn, "renter1", &id, BookingStatus::Cancelled, 702)?;
        Ok(())
    })
    .unwrap();

    let f = SearchFilters {
        storage_type: Some(StorageType::DormRoom),
        start_date: Some(d(2025, 9, 1)),
        end_date: Some(d(2025, 9, 30)),
        ..Default::default()
    };
    let page = db
        .with_conn(|conn| spaces::search_spaces(conn, &f, 1, 12))
        .unwrap();

    // s1 falls to the overlap despite matching the type; s2 to both;
    // s5 to the type filter. s3 (pending) and s4 (cancelled) survive.
    assert_eq!(page.total, 2);
    let ids: Vec<&str> = page.items.iter().map(|s| s.space.id.as_str()).collect();
    assert!(ids.contains(&s3.as_str()));
    assert!(ids.contains(&s4.as_str()));
}

#[test]
fn search_without_dates_ignores_bookings_entirely() {
    let db = setup_db();
    login(&db, "host1", "host1@b.edu", "Host One");
    login(&db, "renter1", "renter1@b.edu", "Renter One");

    let s1 = seed_space(&db, "Dorm taken", StorageType::DormRoom, 100);
    confirmed_booking(&db, &s1, d(2025, 9, 1), d(2025, 12, 1));

    let page = db
        .with_conn(|conn| spaces::search_spaces(conn, &SearchFilters::default(), 1, 12))
        .unwrap();
    assert_eq!(page.total, 1);
}

#[test]
fn search_route_parses_and_validates_query_params() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup_db();
    login(&db, "host1", "host1@b.edu", "Host One");
    seed_space(&db, "Dorm", StorageType::DormRoom, 100);

    let resp = handle(
        request(
            Method::GET,
            "/spaces?storage_type=dorm_room&min_price_cents=1000&campus_area=East+Village&start_date=2025-06-01&end_date=2025-07-01&page=1",
            None,
            None,
        ),
        &db,
    )?;
    assert_eq!(resp.status(), 200);

    let req = request(Method::GET, "/spaces?storage_type=attic", None, None);
    assert!(matches!(handle(req, &db), Err(ServerError::BadRequest(_))));

    let req = request(Method::GET, "/spaces?start_date=June+1st", None, None);
    assert!(matches!(handle(req, &db), Err(ServerError::BadRequest(_))));

    let req = request(Method::GET, "/spaces?page=minus-one", None, None);
    assert!(matches!(handle(req, &db), Err(ServerError::BadRequest(_))));

    Ok(())
}
