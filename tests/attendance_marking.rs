mod test_support;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;

use schoold::api::Method;
use schoold::model::AttendanceStatus;
use schoold::notify::Notices;
use schoold::screens::attendance::AttendanceScreen;
use test_support::{client, FakeTransport};

fn roster_backend() -> std::sync::Arc<FakeTransport> {
    let fake = FakeTransport::new();
    fake.ok(
        Method::Get,
        "/students",
        json!([
            {"id": "s1", "name": "Ada"},
            {"id": "s2", "name": "Alan"},
            {"id": "s3", "name": "Grace"}
        ]),
    );
    fake.ok(
        Method::Get,
        "/attendance",
        json!([{"student_id": "s2", "status": "absent", "date": "2024-03-04"}]),
    );
    fake.ok(Method::Get, "/attendance/stats", json!({"present": 10, "absent": 2}));
    fake
}

#[tokio::test]
async fn select_fetches_roster_records_and_stats_together() {
    let fake = roster_backend();
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = AttendanceScreen::default();

    let date = NaiveDate::from_ymd_opt(2024, 3, 4).expect("date");
    screen.select("c1", "sec1", Some(date), &api, &mut notices).await;

    assert!(notices.is_empty());
    let records = fake.requests_to(Method::Get, "/attendance");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].query_value("date"), Some("2024-03-04"));
    assert_eq!(records[0].query_value("section_id"), Some("sec1"));
    let roster = fake.requests_to(Method::Get, "/students");
    assert_eq!(roster[0].query_value("class_id"), Some("c1"));

    assert_eq!(screen.status_of("s1"), Some(AttendanceStatus::Present));
    assert_eq!(screen.status_of("s2"), Some(AttendanceStatus::Absent));
    assert_eq!(screen.stats(), Some(&json!({"present": 10, "absent": 2})));
}

#[tokio::test]
async fn submit_posts_every_student_in_roster_order() {
    let fake = roster_backend();
    fake.ok(Method::Post, "/attendance/bulk", json!({"message": "ok"}));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = AttendanceScreen::default();
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).expect("date");
    screen.select("c1", "sec1", Some(date), &api, &mut notices).await;

    assert!(screen.mark("s3", AttendanceStatus::Late));
    assert!(!screen.mark("nobody", AttendanceStatus::Absent));
    assert!(screen.submit(&api, &mut notices).await);

    let posts = fake.requests_to(Method::Post, "/attendance/bulk");
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].json_body(),
        Some(&json!({
            "attendance_records": [
                {"student_id": "s1", "class_id": "c1", "section_id": "sec1", "date": "2024-03-04", "status": "present"},
                {"student_id": "s2", "class_id": "c1", "section_id": "sec1", "date": "2024-03-04", "status": "absent"},
                {"student_id": "s3", "class_id": "c1", "section_id": "sec1", "date": "2024-03-04", "status": "late"}
            ]
        }))
    );
    let messages: Vec<&str> = notices.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["Attendance marked successfully"]);
    assert_eq!(fake.requests_to(Method::Get, "/attendance/stats").len(), 2);
}

#[tokio::test]
async fn rejected_submit_surfaces_server_detail_once() {
    let fake = roster_backend();
    fake.on(
        Method::Post,
        "/attendance/bulk",
        403,
        json!({"detail": "Not enough permissions"}),
    );
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = AttendanceScreen::default();
    screen.select("c1", "sec1", None, &api, &mut notices).await;

    assert!(!screen.submit(&api, &mut notices).await);
    let errors: Vec<&str> = notices.errors().map(|n| n.message.as_str()).collect();
    assert_eq!(errors, vec!["Not enough permissions"]);
    assert_eq!(fake.requests_to(Method::Get, "/attendance/stats").len(), 1);
}

#[tokio::test]
async fn failed_roster_fetch_leaves_an_empty_roster_and_one_notice() {
    let fake = FakeTransport::new();
    fake.unreachable(Method::Get, "/students");
    fake.ok(Method::Get, "/attendance", json!([]));
    fake.ok(Method::Get, "/attendance/stats", json!({}));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = AttendanceScreen::default();

    screen.select("c1", "sec1", None, &api, &mut notices).await;

    assert!(screen.roster().is_empty());
    let errors: Vec<&str> = notices.errors().map(|n| n.message.as_str()).collect();
    assert_eq!(errors, vec!["Failed to fetch students"]);
}

#[tokio::test]
async fn resubmitting_unchanged_statuses_sends_the_same_records() {
    let fake = roster_backend();
    fake.ok(Method::Post, "/attendance/bulk", json!({"message": "ok"}));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = AttendanceScreen::default();
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).expect("date");
    screen.select("c1", "sec1", Some(date), &api, &mut notices).await;
    assert!(screen.mark("s1", AttendanceStatus::Late));

    assert!(screen.submit(&api, &mut notices).await);
    assert!(screen.submit(&api, &mut notices).await);

    let posts = fake.requests_to(Method::Post, "/attendance/bulk");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].json_body(), posts[1].json_body());
    assert_eq!(screen.status_of("s1"), Some(AttendanceStatus::Late));
    assert_eq!(screen.status_of("s2"), Some(AttendanceStatus::Absent));
}
