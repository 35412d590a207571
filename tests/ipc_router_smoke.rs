mod test_support;

use std::io::{BufRead, Write};

use serde_json::json;
use test_support::{error_code, request, request_ok, spawn_sidecar};

#[test]
fn sidecar_answers_core_methods_without_a_backend() {
    let workspace = tempfile::tempdir().expect("tempdir");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["version"], json!(env!("CARGO_PKG_VERSION")));
    assert_eq!(health["authenticated"], json!(false));

    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.path().to_string_lossy() }),
    );
    assert_eq!(selected["restored"], json!(false));
    assert!(workspace.path().join("schoold.sqlite3").exists());

    let menu = request_ok(&mut stdin, &mut reader, "3", "nav.menu", json!({}));
    let paths: Vec<&str> = menu["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|i| i["path"].as_str())
        .collect();
    assert_eq!(paths, vec!["/dashboard"]);

    let root = request_ok(&mut stdin, &mut reader, "4", "route.resolve", json!({ "path": "/" }));
    assert_eq!(root["redirect"], json!("/login"));

    let guarded = request(&mut stdin, &mut reader, "5", "screen.open", json!({ "path": "/classes" }));
    assert_eq!(error_code(&guarded), Some("unauthenticated"));
    assert_eq!(guarded["error"]["details"]["redirect"], json!("/login"));

    let login = request(
        &mut stdin,
        &mut reader,
        "6",
        "auth.login",
        json!({ "username": "admin", "password": "admin123" }),
    );
    assert_eq!(error_code(&login), Some("network_error"));

    let missing = request(&mut stdin, &mut reader, "7", "auth.login", json!({ "username": "admin" }));
    assert_eq!(error_code(&missing), Some("bad_params"));

    let out = request_ok(&mut stdin, &mut reader, "8", "auth.logout", json!({}));
    assert_eq!(out["wasActive"], json!(false));
    assert_eq!(out["redirect"], json!("/login"));

    let unknown = request(&mut stdin, &mut reader, "9", "grades.explode", json!({}));
    assert_eq!(error_code(&unknown), Some("not_implemented"));
    assert_eq!(unknown["notices"], json!([]));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn malformed_line_gets_bad_json_without_id() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "{{not json").expect("write");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("json");
    assert_eq!(value["ok"], json!(false));
    assert_eq!(value["error"]["code"], json!("bad_json"));
    assert!(value.get("id").is_none());

    // The loop keeps going after a bad line.
    let health = request_ok(&mut stdin, &mut reader, "2", "health", json!({}));
    assert!(health.get("version").is_some());

    drop(stdin);
    let _ = child.wait();
}
