mod test_support;

use pretty_assertions::assert_eq;
use serde_json::json;

use schoold::api::Method;
use schoold::model::PLACEHOLDER;
use schoold::notify::Notices;
use schoold::screens::timetable::{build_grid, DeleteOutcome, TimetableScreen, DAYS, TIME_SLOTS};
use schoold::screens::ScreenController;
use test_support::{client, FakeTransport};

fn backend() -> std::sync::Arc<FakeTransport> {
    let fake = FakeTransport::new();
    fake.ok(Method::Get, "/classes", json!([{"id": "c1", "name": "Grade 10"}]));
    fake.ok(Method::Get, "/sections", json!([{"id": "sec1", "name": "A", "class_id": "c1"}]));
    fake.ok(Method::Get, "/subjects", json!([{"id": "sub1", "name": "Mathematics"}]));
    fake.ok(Method::Get, "/teachers", json!([{"id": "t1", "name": "Ms Hopper"}]));
    fake.ok(
        Method::Get,
        "/timetable",
        json!([
            {"id": "e1", "class_id": "c1", "section_id": "sec1", "day_of_week": "monday",
             "start_time": "09:00:00", "end_time": "10:00:00", "subject_id": "sub1", "teacher_id": "t1",
             "room_number": "101"},
            {"id": "e2", "class_id": "c1", "section_id": "sec1", "day": "friday",
             "start_time": "14:00", "end_time": "15:00", "subject_id": "gone", "teacher_id": "t1"}
        ]),
    );
    fake
}

#[tokio::test]
async fn grid_places_entries_by_day_and_slot_start() {
    let fake = backend();
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = TimetableScreen::default();
    screen.activate(&api, &mut notices).await;
    assert!(fake.requests_to(Method::Get, "/timetable").is_empty());

    screen.select("c1", "sec1", &api, &mut notices).await;
    assert!(notices.is_empty());

    let grid = screen.grid();
    assert_eq!(grid.len(), TIME_SLOTS.len());
    assert!(grid.iter().all(|row| row.cells.len() == DAYS.len()));

    let monday_nine = &grid[1].cells[0];
    assert_eq!(monday_nine.entry_id.as_deref(), Some("e1"));
    assert_eq!(monday_nine.subject, "Mathematics");
    assert_eq!(monday_nine.teacher, "Ms Hopper");
    assert_eq!(monday_nine.room.as_deref(), Some("101"));

    let friday_two = &grid[6].cells[4];
    assert_eq!(friday_two.entry_id.as_deref(), Some("e2"));
    assert_eq!(friday_two.subject, PLACEHOLDER);

    let filled = grid.iter().flat_map(|r| r.cells.iter()).filter(|c| !c.is_empty()).count();
    assert_eq!(filled, 2);
}

#[tokio::test]
async fn delete_waits_for_confirmation_then_refetches() {
    let fake = backend();
    fake.ok(Method::Delete, "/timetable/e1", json!({"message": "deleted"}));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = TimetableScreen::default();
    screen.select("c1", "sec1", &api, &mut notices).await;

    let outcome = screen.delete("e1", false, &api, &mut notices).await;
    assert_eq!(outcome, DeleteOutcome::NeedsConfirmation);
    assert!(fake.requests_to(Method::Delete, "/timetable/e1").is_empty());

    let outcome = screen.delete("e1", true, &api, &mut notices).await;
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(fake.requests_to(Method::Delete, "/timetable/e1").len(), 1);
    assert_eq!(fake.requests_to(Method::Get, "/timetable").len(), 2);
    let messages: Vec<&str> = notices.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["Entry deleted successfully"]);
}

#[tokio::test]
async fn failed_delete_reports_once_and_keeps_entries() {
    let fake = backend();
    fake.on(Method::Delete, "/timetable/e1", 500, json!({"detail": "boom"}));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = TimetableScreen::default();
    screen.select("c1", "sec1", &api, &mut notices).await;

    let outcome = screen.delete("e1", true, &api, &mut notices).await;
    assert_eq!(outcome, DeleteOutcome::Failed);
    assert_eq!(screen.entries().len(), 2);
    let errors: Vec<&str> = notices.errors().map(|n| n.message.as_str()).collect();
    assert_eq!(errors, vec!["Failed to delete entry"]);
}

#[test]
fn empty_timetable_renders_every_cell_as_placeholder() {
    let grid = build_grid(&[], &[], &[]);

    let cells: Vec<_> = grid.iter().flat_map(|r| r.cells.iter()).collect();
    assert_eq!(cells.len(), DAYS.len() * TIME_SLOTS.len());
    assert_eq!(cells.len(), 48);
    for cell in cells {
        assert!(cell.is_empty());
        assert_eq!(cell.subject, PLACEHOLDER);
        assert_eq!(cell.teacher, PLACEHOLDER);
        assert_eq!(cell.room, None);
    }
}
