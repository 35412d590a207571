mod test_support;

use pretty_assertions::assert_eq;
use serde_json::json;

use schoold::api::Method;
use schoold::form::{FieldValue, Form};
use schoold::notify::Notices;
use schoold::screens::finance::FinanceScreen;
use schoold::screens::students::STUDENT_FORM;
use schoold::screens::subjects::SubjectsScreen;
use schoold::screens::ScreenController;
use test_support::{client, FakeTransport};

fn fill_subject(screen: &mut SubjectsScreen, credit_hours: &str) {
    let form = screen.form_mut("subject").expect("subject form");
    form.open();
    form.set_text("name", "Physics").expect("name");
    form.set_text("code", "PHY101").expect("code");
    form.set_text("credit_hours", credit_hours).expect("credit_hours");
}

#[tokio::test]
async fn successful_create_sends_parsed_numbers_closes_and_refreshes() {
    let fake = FakeTransport::new();
    fake.ok(Method::Get, "/subjects", json!([]));
    fake.ok(Method::Post, "/subjects", json!({"id": "sub9"}));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = SubjectsScreen::default();
    screen.activate(&api, &mut notices).await;

    fill_subject(&mut screen, "3");
    assert_eq!(screen.submit_form("subject", &api, &mut notices).await, Some(true));

    let posts = fake.requests_to(Method::Post, "/subjects");
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].json_body(),
        Some(&json!({"name": "Physics", "code": "PHY101", "description": "", "credit_hours": 3}))
    );
    assert_eq!(posts[0].bearer.as_deref(), Some(test_support::TOKEN));

    let form = screen.form_mut("subject").expect("subject form");
    assert!(!form.is_open());
    assert_eq!(form.value("name"), Some(&FieldValue::Text(String::new())));
    assert_eq!(fake.requests_to(Method::Get, "/subjects").len(), 2);

    let messages: Vec<&str> = notices.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["Subject created successfully"]);
}

#[tokio::test]
async fn rejected_create_keeps_dialog_open_with_server_detail() {
    let fake = FakeTransport::new();
    fake.ok(Method::Get, "/subjects", json!([]));
    fake.on(Method::Post, "/subjects", 400, json!({"detail": "Subject code already exists"}));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = SubjectsScreen::default();

    fill_subject(&mut screen, "3");
    assert_eq!(screen.submit_form("subject", &api, &mut notices).await, Some(false));

    let form = screen.form_mut("subject").expect("subject form");
    assert!(form.is_open());
    assert_eq!(form.value("code"), Some(&FieldValue::Text("PHY101".to_string())));
    assert!(fake.requests_to(Method::Get, "/subjects").is_empty());
    let errors: Vec<&str> = notices.errors().map(|n| n.message.as_str()).collect();
    assert_eq!(errors, vec!["Subject code already exists"]);
}

#[tokio::test]
async fn unreachable_backend_falls_back_to_form_wording() {
    let fake = FakeTransport::new();
    fake.unreachable(Method::Post, "/subjects");
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = SubjectsScreen::default();

    fill_subject(&mut screen, "3");
    assert_eq!(screen.submit_form("subject", &api, &mut notices).await, Some(false));
    let errors: Vec<&str> = notices.errors().map(|n| n.message.as_str()).collect();
    assert_eq!(errors, vec!["Failed to create subject"]);
}

#[tokio::test]
async fn non_numeric_input_never_reaches_the_backend() {
    let fake = FakeTransport::new();
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = SubjectsScreen::default();

    fill_subject(&mut screen, "three");
    assert_eq!(screen.submit_form("subject", &api, &mut notices).await, Some(false));
    assert!(fake.requests().is_empty());
    assert_eq!(notices.errors().count(), 1);
    assert!(screen.form_mut("subject").expect("form").is_open());
}

#[tokio::test]
async fn payment_defaults_survive_reset() {
    let fake = FakeTransport::new();
    fake.ok(Method::Post, "/payments", json!({"id": "p1"}));
    let api = client(&fake);
    let mut notices = Notices::default();
    let mut screen = FinanceScreen::default();

    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    let form = screen.form_mut("payment").expect("payment form");
    assert_eq!(form.value("payment_method"), Some(&FieldValue::Text("cash".to_string())));
    form.set_text("invoice_id", "inv1").expect("invoice");
    form.set_text("amount", "120.5").expect("amount");
    form.set_text("payment_method", "card").expect("method");

    assert_eq!(screen.submit_form("payment", &api, &mut notices).await, Some(true));
    let posts = fake.requests_to(Method::Post, "/payments");
    let body = posts[0].json_body().expect("json body");
    assert_eq!(body["amount"], json!(120.5));
    assert_eq!(body["payment_method"], json!("card"));
    assert_eq!(body["payment_date"], json!(today));

    let form = screen.form_mut("payment").expect("payment form");
    assert_eq!(form.value("payment_method"), Some(&FieldValue::Text("cash".to_string())));
    assert_eq!(form.value("payment_date"), Some(&FieldValue::Text(today)));
}

#[test]
fn student_can_be_created_without_class_or_section() {
    let mut form = Form::new(&STUDENT_FORM);
    form.open();
    form.set_text("admission_number", "ADM-010").expect("admission_number");
    form.set_text("name", "Grace Hopper").expect("name");
    form.set_text("email", "grace@school.test").expect("email");
    form.set_text("date_of_birth", "2010-05-01").expect("date_of_birth");

    let body = form.payload().expect("class and section are optional");
    assert_eq!(body["class_id"], json!(""));
    assert_eq!(body["section_id"], json!(""));
}
