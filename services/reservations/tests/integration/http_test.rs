use axum::http::{StatusCode, header};
use futures::future::join_all;

use slotbook_domain::id::ScheduleId;
use slotbook_testing::session::MockSession;

use crate::helpers::{STAFF_EMAIL, memory_store, seed_schedule, seed_user, test_app};

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_healthy_and_ready() {
    let app = test_app(&memory_store(), false);
    assert_eq!(app.get("/healthz", None).await.status, StatusCode::OK);
    assert_eq!(app.get("/readyz", None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn should_attach_request_id_to_responses() {
    let app = test_app(&memory_store(), false);
    let resp = app.get("/api/schedules", None).await;
    assert!(resp.headers.contains_key("x-request-id"));
}

// ── Session ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_up_log_in_and_resolve_session() {
    let app = test_app(&memory_store(), false);

    let signup = app
        .post_form(
            "/api/signup",
            &[("email", "erin@example.com"), ("nickname", "erin")],
            None,
        )
        .await;
    assert_eq!(signup.status, StatusCode::OK);
    assert_eq!(signup.body["staff"], false);

    let login = app
        .post_form("/api/login", &[("email", "erin@example.com")], None)
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let cookie = login.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with(&format!("user_id={}", signup.body["id"].as_str().unwrap())));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=86400"));

    let user_id = signup.body["id"].as_str().unwrap().parse().unwrap();
    let session = app
        .get("/api/session", Some(MockSession::new(user_id)))
        .await;
    assert_eq!(session.status, StatusCode::OK);
    assert_eq!(session.body["email"], "erin@example.com");
}

#[tokio::test]
async fn should_return_null_session_when_anonymous() {
    let app = test_app(&memory_store(), false);
    let resp = app.get("/api/session", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.is_null());
}

#[tokio::test]
async fn should_reject_signup_without_nickname() {
    let app = test_app(&memory_store(), false);
    let resp = app
        .post_form("/api/signup", &[("email", "x@example.com")], None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.kind(), "MISSING_DATA");
}

#[tokio::test]
async fn should_reject_signup_with_taken_email() {
    let store = memory_store();
    seed_user(&store, "frank", false).await;
    let app = test_app(&store, false);

    let resp = app
        .post_form(
            "/api/signup",
            &[("email", "frank@example.com"), ("nickname", "frank2")],
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.kind(), "USER_ALREADY_EXISTS");
}

#[tokio::test]
async fn should_reject_login_for_unknown_email() {
    let app = test_app(&memory_store(), false);
    let resp = app
        .post_form("/api/login", &[("email", "ghost@example.com")], None)
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.kind(), "LOGIN_FAILED");
}

// ── Schedules ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_let_staff_create_schedule() {
    let store = memory_store();
    let staff = seed_user(&store, "staff", true).await;
    let app = test_app(&store, false);

    let resp = app
        .post_form(
            "/api/schedules",
            &[("title", "morning yoga"), ("capacity", "3")],
            Some(MockSession::new(staff.id)),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["title"], "morning yoga");
    assert_eq!(resp.body["capacity"], 3);
    assert_eq!(resp.body["reserved"], 0);
}

#[tokio::test]
async fn should_forbid_schedule_creation_by_non_staff() {
    let store = memory_store();
    let member = seed_user(&store, "member", false).await;
    let app = test_app(&store, false);

    let resp = app
        .post_form(
            "/api/schedules",
            &[("title", "t"), ("capacity", "1")],
            Some(MockSession::new(member.id)),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.kind(), "FORBIDDEN");

    let resp = app
        .post_form("/api/schedules", &[("title", "t"), ("capacity", "1")], None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_invalid_capacity() {
    let store = memory_store();
    let staff = seed_user(&store, "staff", true).await;
    let app = test_app(&store, false);

    for capacity in ["-1", "lots", "", "4294967296"] {
        let resp = app
            .post_form(
                "/api/schedules",
                &[("title", "t"), ("capacity", capacity)],
                Some(MockSession::new(staff.id)),
            )
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "capacity {capacity:?}");
        assert_eq!(resp.kind(), "INVALID_CAPACITY");
    }
}

#[tokio::test]
async fn should_hide_full_schedules_from_members_but_not_staff() {
    let store = memory_store();
    let staff = seed_user(&store, "staff", true).await;
    let member = seed_user(&store, "member", false).await;
    let full = seed_schedule(&store, "full", 0).await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let open = seed_schedule(&store, "open", 5).await;
    let app = test_app(&store, false);

    let listed = app
        .get("/api/schedules", Some(MockSession::new(member.id)))
        .await;
    let ids: Vec<&str> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![open.id.to_string()]);

    let listed = app
        .get("/api/schedules", Some(MockSession::new(staff.id)))
        .await;
    let ids: Vec<&str> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![open.id.to_string(), full.id.to_string()]);
}

#[tokio::test]
async fn should_drop_schedule_filled_by_reservations_from_member_list() {
    let store = memory_store();
    let staff = seed_user(&store, "staff", true).await;
    let member = seed_user(&store, "member", false).await;
    let first = seed_user(&store, "first", false).await;
    let second = seed_user(&store, "second", false).await;
    let schedule = seed_schedule(&store, "pilates", 2).await;
    let app = test_app(&store, false);
    let schedule_id = schedule.id.to_string();

    for user in [&first, &second] {
        let resp = app
            .post_form(
                "/api/reservations",
                &[("schedule_id", schedule_id.as_str())],
                Some(MockSession::new(user.id)),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK);
    }

    let listed = app
        .get("/api/schedules", Some(MockSession::new(member.id)))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert!(listed.body.as_array().unwrap().is_empty());

    let listed = app
        .get("/api/schedules", Some(MockSession::new(staff.id)))
        .await;
    let entries = listed.body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], schedule_id);
    assert_eq!(entries[0]["capacity"], 2);
    assert_eq!(entries[0]["reserved"], 2);
}

#[tokio::test]
async fn should_redact_roster_email_for_non_staff() {
    let store = memory_store();
    let staff = seed_user(&store, "staff", true).await;
    let holder = seed_user(&store, "holder", false).await;
    let schedule = seed_schedule(&store, "yoga", 2).await;
    let app = test_app(&store, false);

    let reserved = app
        .post_form(
            "/api/reservations",
            &[("schedule_id", &schedule.id.to_string())],
            Some(MockSession::new(holder.id)),
        )
        .await;
    assert_eq!(reserved.status, StatusCode::OK);

    let uri = format!("/api/schedules/{}", schedule.id);
    let anonymous = app.get(&uri, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
    assert_eq!(anonymous.body["reserved"], 1);
    assert_eq!(anonymous.body["reservations"][0]["user"]["nickname"], "holder");
    assert_eq!(anonymous.body["reservations"][0]["user"]["email"], "");

    let as_staff = app.get(&uri, Some(MockSession::new(staff.id))).await;
    assert_eq!(
        as_staff.body["reservations"][0]["user"]["email"],
        "holder@example.com"
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_schedule() {
    let app = test_app(&memory_store(), false);
    let resp = app
        .get(&format!("/api/schedules/{}", ScheduleId::new()), None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.kind(), "SCHEDULE_NOT_FOUND");

    let resp = app.get("/api/schedules/not-an-id", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_ignore_whitespace_around_schedule_ids() {
    let store = memory_store();
    let member = seed_user(&store, "member", false).await;
    let schedule = seed_schedule(&store, "yoga", 2).await;
    let app = test_app(&store, false);

    let detail = app
        .get(&format!("/api/schedules/%20{}%20", schedule.id), None)
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["id"], schedule.id.to_string());

    let padded = format!(" {} ", schedule.id);
    let reserved = app
        .post_form(
            "/api/reservations",
            &[("schedule_id", padded.as_str())],
            Some(MockSession::new(member.id)),
        )
        .await;
    assert_eq!(reserved.status, StatusCode::OK);
    assert_eq!(reserved.body["schedule_id"], schedule.id.to_string());
}

// ── Reservations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_login_to_reserve() {
    let store = memory_store();
    let schedule = seed_schedule(&store, "yoga", 2).await;
    let app = test_app(&store, false);

    let resp = app
        .post_form(
            "/api/reservations",
            &[("schedule_id", &schedule.id.to_string())],
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.kind(), "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_require_login_before_reading_an_empty_body() {
    let app = test_app(&memory_store(), false);
    let resp = app.post_empty("/api/reservations", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.kind(), "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_report_missing_data_for_empty_body_from_member() {
    let store = memory_store();
    let member = seed_user(&store, "member", false).await;
    let app = test_app(&store, false);
    let resp = app
        .post_empty("/api/reservations", Some(MockSession::new(member.id)))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.kind(), "MISSING_DATA");
}

#[tokio::test]
async fn should_accept_multipart_reservation() {
    let store = memory_store();
    let member = seed_user(&store, "member", false).await;
    let schedule = seed_schedule(&store, "yoga", 2).await;
    let app = test_app(&store, false);

    let resp = app
        .post_multipart(
            "/api/reservations",
            &[("schedule_id", &schedule.id.to_string())],
            Some(MockSession::new(member.id)),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["schedule_id"], schedule.id.to_string());
    assert_eq!(resp.body["user_id"], member.id.to_string());
}

#[tokio::test]
async fn should_accept_multipart_signup() {
    let app = test_app(&memory_store(), false);
    let resp = app
        .post_multipart(
            "/api/signup",
            &[("email", "mona@example.com"), ("nickname", "mona")],
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["nickname"], "mona");
}

#[tokio::test]
async fn should_answer_malformed_multipart_with_json_error() {
    let store = memory_store();
    let member = seed_user(&store, "member", false).await;
    let app = test_app(&store, false);
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/reservations")
        .header(header::COOKIE, MockSession::new(member.id).cookie())
        .header(header::CONTENT_TYPE, "multipart/form-data")
        .body(axum::body::Body::from("garbage"))
        .unwrap();
    let resp = app.send(request).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.kind(), "MISSING_DATA");
}

#[tokio::test]
async fn should_map_admission_outcomes_to_statuses() {
    let store = memory_store();
    let a = seed_user(&store, "a", false).await;
    let b = seed_user(&store, "b", false).await;
    let schedule = seed_schedule(&store, "yoga", 1).await;
    let app = test_app(&store, false);
    let form = [("schedule_id", schedule.id.to_string())];
    let form: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let ok = app
        .post_form("/api/reservations", &form, Some(MockSession::new(a.id)))
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["schedule_id"], schedule.id.to_string());
    assert_eq!(ok.body["user_id"], a.id.to_string());

    let dup = app
        .post_form("/api/reservations", &form, Some(MockSession::new(a.id)))
        .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(dup.kind(), "DUPLICATE_RESERVATION");

    let full = app
        .post_form("/api/reservations", &form, Some(MockSession::new(b.id)))
        .await;
    assert_eq!(full.status, StatusCode::CONFLICT);
    assert_eq!(full.kind(), "CAPACITY_EXCEEDED");

    let unknown = app
        .post_form(
            "/api/reservations",
            &[("schedule_id", &ScheduleId::new().to_string())],
            Some(MockSession::new(b.id)),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.kind(), "SCHEDULE_NOT_FOUND");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_not_overbook_through_http() {
    let store = memory_store();
    let schedule = seed_schedule(&store, "spin", 3).await;
    let mut users = Vec::new();
    for i in 0..12 {
        users.push(seed_user(&store, &format!("rider{i}"), false).await);
    }
    let app = test_app(&store, false);
    let schedule_id = schedule.id.to_string();

    let requests = users.iter().map(|user| {
        let app = app.clone();
        let schedule_id = schedule_id.clone();
        let session = MockSession::new(user.id);
        tokio::spawn(async move {
            app.post_form(
                "/api/reservations",
                &[("schedule_id", schedule_id.as_str())],
                Some(session),
            )
            .await
            .status
        })
    });
    let statuses: Vec<StatusCode> = join_all(requests)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 3);
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::CONFLICT)
            .count(),
        9
    );
    let detail = app.get(&format!("/api/schedules/{schedule_id}"), None).await;
    assert_eq!(detail.body["reserved"], 3);
}

// ── Initialize ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_not_mount_initialize_by_default() {
    let app = test_app(&memory_store(), false);
    let resp = app.post_form("/initialize", &[], None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_reset_store_and_seed_staff() {
    let store = memory_store();
    let member = seed_user(&store, "member", false).await;
    seed_schedule(&store, "yoga", 2).await;
    let app = test_app(&store, true);

    let resp = app.post_form("/initialize", &[], None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["language"], "rust");

    let listed = app.get("/api/schedules", None).await;
    assert!(listed.body.as_array().unwrap().is_empty());

    let stale = app
        .get("/api/session", Some(MockSession::new(member.id)))
        .await;
    assert!(stale.body.is_null());

    let login = app
        .post_form("/api/login", &[("email", STAFF_EMAIL)], None)
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["staff"], true);
}
