mod test_support;

use pretty_assertions::assert_eq;
use serde_json::json;

use schoold::api::Method;
use schoold::model::Role;
use schoold::notify::Notices;
use schoold::screens::classes::ClassesScreen;
use schoold::screens::finance::FinanceScreen;
use schoold::screens::students::StudentsScreen;
use schoold::screens::ScreenController;
use test_support::{client, FakeTransport};

fn finance_backend() -> std::sync::Arc<FakeTransport> {
    let fake = FakeTransport::new();
    for path in [
        "/fee-structures",
        "/invoices",
        "/payments",
        "/income",
        "/expenses",
        "/classes",
        "/students",
    ] {
        fake.ok(Method::Get, path, json!([]));
    }
    fake.ok(
        Method::Get,
        "/financial-reports",
        json!({"total_income": 1200, "total_expenses": 300.25, "total_fee_collected": 800,
               "total_pending_fees": 150, "net_profit": 899.75}),
    );
    fake
}

#[tokio::test]
async fn one_failed_collection_is_emptied_with_a_single_notice() {
    let fake = finance_backend();
    fake.on(Method::Get, "/fee-types", 500, json!({"detail": "database down"}));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = FinanceScreen::default();
    screen.set_viewer(Some(Role::Admin));

    screen.activate(&api, &mut notices).await;

    assert!(!screen.is_loading());
    let view = screen.view();
    assert_eq!(view["feeTypes"], json!([]));
    let errors: Vec<&str> = notices.errors().map(|n| n.message.as_str()).collect();
    assert_eq!(errors, vec!["Failed to fetch fee types"]);
    assert_eq!(view["report"]["netBalance"], json!("899.75"));
    assert_eq!(view["report"]["totalExpenses"], json!("300.25"));
}

#[tokio::test]
async fn unpaid_invoices_exclude_paid_ones() {
    let fake = finance_backend();
    fake.ok(Method::Get, "/fee-types", json!([]));
    fake.ok(
        Method::Get,
        "/invoices",
        json!([
            {"id": "i1", "status": "paid", "student_id": "s1", "amount": 100},
            {"id": "i2", "status": "pending", "student_id": "s1", "amount": 50},
            {"id": "i3", "status": "partially_paid", "student_id": "zz", "amount": 75}
        ]),
    );
    fake.ok(Method::Get, "/students", json!([{"id": "s1", "name": "Ada"}]));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = FinanceScreen::default();
    screen.set_viewer(Some(Role::Admin));
    screen.activate(&api, &mut notices).await;

    let ids: Vec<&str> = screen.unpaid_invoices().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["i2", "i3"]);
    let view = screen.view();
    assert_eq!(view["invoices"][0]["studentName"], json!("Ada"));
    assert_eq!(view["invoices"][2]["studentName"], json!("-"));
    assert_eq!(view["invoices"][1]["amountText"], json!("50.00"));
}

#[tokio::test]
async fn sections_are_grouped_under_their_class() {
    let fake = FakeTransport::new();
    fake.ok(
        Method::Get,
        "/classes",
        json!([{"id": "c1", "name": "Grade 9"}, {"id": "c2", "name": "Grade 10"}]),
    );
    fake.ok(
        Method::Get,
        "/sections",
        json!([
            {"id": "a", "name": "A", "class_id": "c1"},
            {"id": "b", "name": "B", "class_id": "c2"},
            {"id": "c", "name": "C", "class_id": "c1"}
        ]),
    );
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = ClassesScreen::default();
    screen.activate(&api, &mut notices).await;

    let names: Vec<&str> = screen
        .sections_for("c1")
        .into_iter()
        .filter_map(|s| s.text("name"))
        .collect();
    assert_eq!(names, vec!["A", "C"]);
    assert!(screen.sections_for("c9").is_empty());
}

#[tokio::test]
async fn student_search_matches_name_admission_number_and_email() {
    let fake = FakeTransport::new();
    fake.ok(
        Method::Get,
        "/students",
        json!([
            {"id": "s1", "name": "Ada Lovelace", "admission_number": "ADM-001", "email": "ada@school.test",
             "class_id": "c1", "section_id": "a", "parent_ids": ["p1", "p9"]},
            {"id": "s2", "name": "Alan Turing", "admission_number": "ADM-002", "email": "alan@school.test",
             "class_id": "c9", "section_id": "a", "parent_ids": []}
        ]),
    );
    fake.ok(Method::Get, "/classes", json!([{"id": "c1", "name": "Grade 9"}]));
    fake.ok(Method::Get, "/sections", json!([{"id": "a", "name": "A", "class_id": "c1"}]));
    fake.ok(Method::Get, "/parents", json!([{"id": "p1", "name": "Anne"}]));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = StudentsScreen::default();
    screen.activate(&api, &mut notices).await;

    screen.set_search("adm-002");
    let hits: Vec<&str> = screen.filtered().iter().map(|r| r.id()).collect();
    assert_eq!(hits, vec!["s2"]);

    screen.set_search("SCHOOL.TEST");
    assert_eq!(screen.filtered().len(), 2);

    screen.set_search("");
    let view = screen.view();
    assert_eq!(view["students"][0]["className"], json!("Grade 9"));
    assert_eq!(view["students"][0]["parentNames"], json!(["Anne", "-"]));
    assert_eq!(view["students"][1]["className"], json!("-"));
}
