mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{TestApp, contract_body, days_from_now};
use contractdesk::db::NewContract;
use contractdesk::domain::{ContractStatus, HistoryEntry};
use serde_json::{Value, json};

async fn create(app: &TestApp, token: &str, inn: &str, end_date: &str) -> Value {
    let (status, body) = app
        .post("/contracts", token, contract_body(inn, end_date))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn test_create_contract_derives_status_and_history() {
    let app = TestApp::spawn().await;
    let (alice_id, alice) = app.lawyer("alice").await;

    let contract = create(&app, &alice, "7701234567", &days_from_now(10)).await;

    assert_eq!(contract["status"], json!("expiring_soon"));
    assert_eq!(contract["days_left"], json!(10));
    assert_eq!(contract["lawyer_id"], json!(alice_id));

    let history = contract["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["action"], json!("create"));
    assert_eq!(history[0]["userId"], json!(alice_id));
    assert_eq!(history[0]["username"], json!("alice"));
}

#[tokio::test]
async fn test_status_boundaries() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let far = create(&app, &admin, "7700000001", &days_from_now(45)).await;
    assert_eq!(far["status"], json!("active"));
    assert_eq!(far["days_left"], json!(45));

    let edge = create(&app, &admin, "7700000002", &days_from_now(30)).await;
    assert_eq!(edge["status"], json!("expiring_soon"));
    assert_eq!(edge["days_left"], json!(30));

    let past = create(&app, &admin, "7700000003", &days_from_now(-5)).await;
    assert_eq!(past["status"], json!("expired"));
    assert_eq!(past["days_left"], json!(0));
}

#[tokio::test]
async fn test_reads_do_not_touch_history() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.lawyer("alice").await;
    let contract = create(&app, &alice, "7701234567", &days_from_now(60)).await;
    let uri = format!("/contracts/{}", contract["id"]);

    for _ in 0..3 {
        let (status, body) = app.get(&uri, &alice).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["history"].as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_comment_update_appends_one_history_entry() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.lawyer("alice").await;
    let admin = app.admin_token().await;
    let contract = create(&app, &alice, "7701234567", &days_from_now(10)).await;
    let uri = format!("/contracts/{}", contract["id"]);

    let (status, body) = app
        .put(&uri, &admin, json!({ "comments": "Renewal under negotiation" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let updated = &body["data"];
    assert_eq!(updated["status"], json!("expiring_soon"));
    assert_eq!(updated["comments"], json!("Renewal under negotiation"));

    let history = updated["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["action"], json!("update"));
    assert_eq!(history[1]["username"], json!("admin"));
    assert_eq!(
        history[1]["changes"],
        json!({ "comments": { "old": null, "new": "Renewal under negotiation" } })
    );
}

#[tokio::test]
async fn test_noop_update_appends_nothing() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.lawyer("alice").await;
    let contract = create(&app, &alice, "7701234567", &days_from_now(90)).await;
    let uri = format!("/contracts/{}", contract["id"]);

    let (status, body) = app
        .put(
            &uri,
            &alice,
            json!({ "company_name": contract["company_name"], "has_nd": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_explicit_null_clears_comment_and_absent_keeps_it() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let mut payload = contract_body("7701234567", &days_from_now(90));
    payload["comments"] = json!("keep me");
    let (_, body) = app.post("/contracts", &admin, payload).await;
    let uri = format!("/contracts/{}", body["data"]["id"]);

    let (_, body) = app.put(&uri, &admin, json!({ "has_nd": true })).await;
    assert_eq!(body["data"]["comments"], json!("keep me"));
    assert_eq!(body["data"]["has_nd"], json!(true));

    let (_, body) = app.put(&uri, &admin, json!({ "comments": null })).await;
    assert_eq!(body["data"]["comments"], Value::Null);
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_end_date_change_moves_status() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let contract = create(&app, &admin, "7701234567", &days_from_now(10)).await;
    let uri = format!("/contracts/{}", contract["id"]);

    let (status, body) = app
        .put(&uri, &admin, json!({ "end_date": days_from_now(120) }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("active"));
    assert_eq!(body["data"]["days_left"], json!(120));
    assert!(body["data"]["history"][1]["changes"]["end_date"].is_object());
}

#[tokio::test]
async fn test_reassign_to_missing_lawyer_changes_nothing() {
    let app = TestApp::spawn().await;
    let (alice_id, alice) = app.lawyer("alice").await;
    let admin = app.admin_token().await;
    let contract = create(&app, &alice, "7701234567", &days_from_now(10)).await;
    let uri = format!("/contracts/{}", contract["id"]);

    let (status, _) = app
        .put(
            &uri,
            &admin,
            json!({ "lawyer_id": 9999, "comments": "should not stick" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get(&uri, &admin).await;
    assert_eq!(body["data"]["lawyer_id"], json!(alice_id));
    assert_eq!(body["data"]["comments"], Value::Null);
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_admin_reassigns() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.lawyer("alice").await;
    let (bob_id, _) = app.lawyer("bob").await;
    let admin = app.admin_token().await;
    let contract = create(&app, &alice, "7701234567", &days_from_now(10)).await;
    let uri = format!("/contracts/{}", contract["id"]);

    let (status, _) = app.put(&uri, &alice, json!({ "lawyer_id": bob_id })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.put(&uri, &admin, json!({ "lawyer_id": bob_id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lawyer_id"], json!(bob_id));

    let (status, _) = app.get(&uri, &alice).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_lawyer_cannot_create_for_someone_else() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.lawyer("alice").await;
    let (bob_id, _) = app.lawyer("bob").await;

    let mut payload = contract_body("7701234567", &days_from_now(10));
    payload["lawyer_id"] = json!(bob_id);
    let (status, _) = app.post("/contracts", &alice, payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_creates_on_behalf_of_existing_lawyer_only() {
    let app = TestApp::spawn().await;
    let (alice_id, _) = app.lawyer("alice").await;
    let admin = app.admin_token().await;

    let mut payload = contract_body("7701234567", &days_from_now(10));
    payload["lawyer_id"] = json!(alice_id);
    let (status, body) = app.post("/contracts", &admin, payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lawyer_id"], json!(alice_id));

    let mut payload = contract_body("7707654321", &days_from_now(10));
    payload["lawyer_id"] = json!(9999);
    let (status, _) = app.post("/contracts", &admin, payload).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_inn_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    create(&app, &admin, "7701234567", &days_from_now(10)).await;
    let other = create(&app, &admin, "7707654321", &days_from_now(10)).await;

    let (status, body) = app
        .post("/contracts", &admin, contract_body("7701234567", &days_from_now(20)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("7701234567"));

    let (status, _) = app
        .put(
            &format!("/contracts/{}", other["id"]),
            &admin,
            json!({ "inn": "7701234567" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_field_validation() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let mut bad_inn = contract_body("12345", &days_from_now(10));
    let (status, _) = app.post("/contracts", &admin, bad_inn.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    bad_inn["inn"] = json!("770123456X");
    let (status, _) = app.post("/contracts", &admin, bad_inn).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut short_address = contract_body("7701234567", &days_from_now(10));
    short_address["address"] = json!("Msk");
    let (status, _) = app.post("/contracts", &admin, short_address).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let contract = create(&app, &admin, "7701234567", &days_from_now(10)).await;
    let (status, _) = app
        .put(
            &format!("/contracts/{}", contract["id"]),
            &admin,
            json!({ "status": "archived" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_payloads_use_error_envelope() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let dotted_date = contract_body("7701234567", "30.06.2025");
    let (status, body) = app.post("/contracts", &admin, dotted_date).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());

    let mut no_director = contract_body("7701234567", &days_from_now(10));
    no_director.as_object_mut().unwrap().remove("director");
    let (status, body) = app.post("/contracts", &admin, no_director).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["success"], json!(false));

    let contract = create(&app, &admin, "7701234567", &days_from_now(10)).await;
    let (status, body) = app
        .put(
            &format!("/contracts/{}", contract["id"]),
            &admin,
            json!({ "has_nd": "yes" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["success"], json!(false));

    let (status, body) = app.get("/contracts?limit=lots", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["success"], json!(false));

    let (_, listed) = app.get("/contracts", &admin).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_status_in_update_is_not_stored() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let contract = create(&app, &admin, "7701234567", &days_from_now(90)).await;

    let (status, body) = app
        .put(
            &format!("/contracts/{}", contract["id"]),
            &admin,
            json!({ "status": "expired" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("active"));
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_visibility_and_ownership() {
    let app = TestApp::spawn().await;
    let (alice_id, alice) = app.lawyer("alice").await;
    let (_, bob) = app.lawyer("bob").await;
    let admin = app.admin_token().await;
    let contract = create(&app, &alice, "7701234567", &days_from_now(10)).await;
    let uri = format!("/contracts/{}", contract["id"]);

    let (status, _) = app.get(&uri, &bob).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.put(&uri, &bob, json!({ "comments": "mine now" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&uri, &admin).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/contracts", &bob).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // A foreign lawyer_id filter quietly falls back to the caller's own contracts.
    let (status, body) = app
        .get(&format!("/contracts?lawyer_id={alice_id}"), &bob)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = app
        .get(&format!("/contracts?lawyer_id={alice_id}"), &admin)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_filters() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let mut first = contract_body("7701234567", &days_from_now(10));
    first["company_name"] = json!("Horns and Hooves LLC");
    app.post("/contracts", &admin, first).await;

    let mut second = contract_body("7707654321", &days_from_now(200));
    second["company_name"] = json!("Acme Industries");
    second["director"] = json!("Wile E. Coyote");
    app.post("/contracts", &admin, second).await;

    let (_, body) = app.get("/contracts?search=HORNS", &admin).await;
    let found = body["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["inn"], json!("7701234567"));

    let (_, body) = app.get("/contracts?search=coyote", &admin).await;
    assert_eq!(body["data"][0]["inn"], json!("7707654321"));

    let (_, body) = app.get("/contracts?search=765432", &admin).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/contracts?status=active", &admin).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], json!("active"));

    let (_, body) = app.get("/contracts?skip=1&limit=1", &admin).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["inn"], json!("7707654321"));

    let (status, _) = app.get("/contracts?status=archived", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/contracts?limit=0", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stale_status_is_corrected_on_read() {
    let app = TestApp::spawn().await;
    let store = app.state.store();
    let admin = store.get_user_by_username("admin").await.unwrap().unwrap();
    let actor = admin.principal();

    let end_date = Utc::now() - chrono::Duration::days(3);
    let record = store
        .insert_contract(NewContract {
            company_name: "Stale Status LLC".to_string(),
            inn: "7701234567".to_string(),
            director: "Петров П.П.".to_string(),
            address: "г Казань, ул Баумана, д 5".to_string(),
            end_date,
            status: ContractStatus::Active,
            comments: None,
            has_nd: false,
            history: vec![HistoryEntry::created(&actor, end_date)],
            lawyer_id: admin.id,
        })
        .await
        .unwrap();

    let token = app.admin_token().await;
    let (_, body) = app.get(&format!("/contracts/{}", record.id), &token).await;
    assert_eq!(body["data"]["status"], json!("expired"));
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 1);

    let stored = store.get_contract(record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, Some(ContractStatus::Expired));
}

#[tokio::test]
async fn test_stats() {
    let app = TestApp::spawn().await;
    let (alice_id, alice) = app.lawyer("alice").await;
    let admin = app.admin_token().await;

    create(&app, &alice, "7700000001", &days_from_now(10)).await;
    create(&app, &alice, "7700000002", &days_from_now(100)).await;
    create(&app, &admin, "7700000003", &days_from_now(-1)).await;

    let (status, body) = app.get("/contracts/stats", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["total"], json!(3));
    assert_eq!(stats["active"], json!(1));
    assert_eq!(stats["expiring_soon"], json!(1));
    assert_eq!(stats["expired"], json!(1));
    assert_eq!(stats["per_lawyer"]["alice"]["total"], json!(2));
    assert_eq!(stats["per_lawyer"]["admin"]["expired"], json!(1));

    let (_, body) = app
        .get(&format!("/contracts/stats?lawyer_id={alice_id}"), &admin)
        .await;
    assert_eq!(body["data"]["total"], json!(2));
    assert!(body["data"].get("per_lawyer").is_none());

    let (_, body) = app.get("/contracts/stats", &alice).await;
    assert_eq!(body["data"]["total"], json!(2));
    assert!(body["data"].get("per_lawyer").is_none());
}

#[tokio::test]
async fn test_delete_is_admin_only() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.lawyer("alice").await;
    let admin = app.admin_token().await;
    let contract = create(&app, &alice, "7701234567", &days_from_now(10)).await;
    let uri = format!("/contracts/{}", contract["id"]);

    let (status, _) = app.delete(&uri, &alice).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&uri, &admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&uri, &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&uri, &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
