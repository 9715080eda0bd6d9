mod common;

use axum::http::StatusCode;
use common::TestApp;
use inbox_dashboard::domain::models::subscription::Tier;
use serde_json::{json, Value};

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_staged_edits_commit_on_save() {
    let app = TestApp::new().await;
    let seeded = app.seed_company(Tier::Starter);
    app.backend.add_global_tag("Lead");

    let (status, body) = app.post("/api/tags", &seeded.token, json!({ "name": "VIP", "color": "#FFD700" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_changes"], true);
    assert_eq!(names(&body["draft"]), vec!["Lead", "VIP"]);
    assert_eq!(names(&body["tags"]), vec!["Lead"]);
    assert_eq!(app.backend.calls_to("tags.create"), 0);

    let (status, body) = app.post("/api/tags/save", &seeded.token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_changes"], false);
    assert_eq!(names(&body["tags"]), vec!["Lead", "VIP"]);
    assert_eq!(app.backend.calls_to("tags.create"), 1);

    let vip_id = body["tags"][1]["id"].as_str().unwrap().to_string();
    assert!(!vip_id.starts_with("local-"));

    let (status, body) = app
        .request("PUT", &format!("/api/tags/{}/color", vip_id), Some(&seeded.token), Some(json!({ "color": "#000000" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draft"][1]["color"], "#000000");
    assert_eq!(body["tags"][1]["color"], "#FFD700");

    let (status, body) = app.request("DELETE", &format!("/api/tags/{}", vip_id), Some(&seeded.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["draft"]), vec!["Lead"]);

    let (_, body) = app.post("/api/tags/save", &seeded.token, json!({})).await;
    assert_eq!(names(&body["tags"]), vec!["Lead"]);
    assert_eq!(app.backend.calls_to("tags.delete"), 1);
}

#[tokio::test]
async fn test_reset_discards_staged_edits() {
    let app = TestApp::new().await;
    let seeded = app.seed_company(Tier::Starter);

    app.post("/api/tags", &seeded.token, json!({ "name": "Temp", "color": "#123456" })).await;
    let (status, body) = app.post("/api/tags/reset", &seeded.token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_changes"], false);
    assert!(body["draft"].as_array().unwrap().is_empty());

    app.post("/api/tags/save", &seeded.token, json!({})).await;
    assert_eq!(app.backend.calls_to("tags.create"), 0);
}

#[tokio::test]
async fn test_global_tags_are_read_only() {
    let app = TestApp::new().await;
    let seeded = app.seed_company(Tier::Starter);
    let global = app.backend.add_global_tag("Lead");

    let (status, _) = app
        .request("PATCH", &format!("/api/tags/{}", global.id), Some(&seeded.token), Some(json!({ "name": "Mine" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.request("DELETE", &format!("/api/tags/{}", global.id), Some(&seeded.token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_and_duplicate_tags_are_rejected() {
    let app = TestApp::new().await;
    let seeded = app.seed_company(Tier::Starter);
    app.backend.add_global_tag("Lead");

    let (status, _) = app.post("/api/tags", &seeded.token, json!({ "name": "lead", "color": "#000000" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post("/api/tags", &seeded.token, json!({ "name": "Blue", "color": "blue" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_save_keeps_draft_for_retry() {
    let app = TestApp::new().await;
    let seeded = app.seed_company(Tier::Starter);
    app.backend.fail("tags.create");

    app.post("/api/tags", &seeded.token, json!({ "name": "VIP", "color": "#FFD700" })).await;
    let (status, _) = app.post("/api/tags/save", &seeded.token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    app.backend.heal("tags.create");
    let (status, body) = app.post("/api/tags/save", &seeded.token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["tags"]), vec!["VIP"]);
}

#[tokio::test]
async fn test_tags_added_elsewhere_survive_a_save() {
    let app = TestApp::new().await;
    let seeded = app.seed_company(Tier::Starter);
    let lead = app.backend.add_company_tag(&seeded.company.id, "Lead", "#2e7d32");

    let (status, _) = app
        .request("PUT", &format!("/api/tags/{}/color", lead.id), Some(&seeded.token), Some(json!({ "color": "#000000" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    // A teammate adds a tag while the recolor is still staged
    app.backend.add_company_tag(&seeded.company.id, "Urgent", "#ff0000");
    let (_, body) = app.get("/api/tags", &seeded.token).await;
    assert_eq!(names(&body["tags"]), vec!["Lead", "Urgent"]);
    assert_eq!(names(&body["draft"]), vec!["Lead", "Urgent"]);
    assert_eq!(body["draft"][0]["color"], "#000000");

    let (status, body) = app.post("/api/tags/save", &seeded.token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["tags"]), vec!["Lead", "Urgent"]);
    assert_eq!(body["tags"][0]["color"], "#000000");
    assert_eq!(app.backend.calls_to("tags.delete"), 0);
    assert_eq!(app.backend.calls_to("tags.update"), 1);
}

#[tokio::test]
async fn test_retry_after_partial_save_does_not_duplicate_creates() {
    let app = TestApp::new().await;
    let seeded = app.seed_company(Tier::Starter);
    let lead = app.backend.add_company_tag(&seeded.company.id, "Lead", "#2e7d32");
    app.get("/api/tags", &seeded.token).await;

    app.post("/api/tags", &seeded.token, json!({ "name": "New", "color": "#123456" })).await;
    app.request("PUT", &format!("/api/tags/{}/color", lead.id), Some(&seeded.token), Some(json!({ "color": "#000000" })))
        .await;
    app.backend.fail("tags.update");

    let (status, _) = app.post("/api/tags/save", &seeded.token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(app.backend.calls_to("tags.create"), 1);

    app.backend.heal("tags.update");
    let (status, body) = app.post("/api/tags/save", &seeded.token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_changes"], false);
    assert_eq!(names(&body["tags"]), vec!["Lead", "New"]);
    assert_eq!(app.backend.calls_to("tags.create"), 1);
    assert_eq!(app.backend.tags.lock().iter().filter(|t| t.name == "New").count(), 1);
}
