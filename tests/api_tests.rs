mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::{SECRET, TestApp};
use contractdesk::services::credentials::TokenSigner;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_liveness_is_public() {
    let app = TestApp::spawn().await;

    let (status, body) = app.send(Method::GET, "/api", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    assert_eq!(body["database"], json!(true));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::spawn().await;

    for uri in ["/me", "/users", "/contracts", "/contracts/stats", "/api/dadata/suggest?query=abc"] {
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    let (status, body) = app.get("/me", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Could not validate credentials"));
}

#[tokio::test]
async fn test_token_endpoint_accepts_form_credentials() {
    let app = TestApp::spawn().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=admin&password=admin"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["token_type"], json!("bearer"));

    let token = body["access_token"].as_str().unwrap();
    let (status, me) = app.get("/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["username"], json!("admin"));
    assert_eq!(me["data"]["role"], json!("admin"));
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::spawn().await;

    for (username, password) in [("admin", "wrong"), ("nobody", "admin")] {
        let (status, body) = app
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], json!("Incorrect username or password"));
    }
}

#[tokio::test]
async fn test_unreadable_credentials_get_bad_request() {
    let app = TestApp::spawn().await;

    let requests = [
        ("/token", "application/x-www-form-urlencoded", "username=admin"),
        ("/login", "application/json", "{\"username\": \"admin\""),
        ("/login", "application/json", "{\"username\": \"admin\"}"),
    ];

    for (uri, content_type, body) in requests {
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], json!(false));
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn test_register_defaults_to_lawyer() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": "alice", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], json!("lawyer"));
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());

    let token = app.login("alice", "secret1").await;
    let (status, me) = app.get("/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["username"], json!("alice"));
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = TestApp::spawn().await;

    let cases = [
        json!({ "username": "admin", "password": "secret1" }),
        json!({ "username": "bob", "password": "secret1", "role": "superuser" }),
        json!({ "username": "bo", "password": "secret1" }),
        json!({ "username": "bobby", "password": "123" }),
    ];

    for payload in cases {
        let (status, body) = app
            .send(Method::POST, "/register", None, Some(payload.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["success"], json!(false));
    }
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::spawn().await;
    let signer = TokenSigner::new(SECRET.as_bytes(), chrono::Duration::minutes(30));

    let stale = signer
        .issue_at("admin", chrono::Utc::now() - chrono::Duration::hours(2))
        .unwrap();
    let (status, body) = app.get("/me", &stale).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Token has expired"));

    let fresh = signer.issue("admin").unwrap();
    let (status, _) = app.get("/me", &fresh).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_signed_with_another_secret_is_rejected() {
    let app = TestApp::spawn().await;
    let forged = TokenSigner::new(b"someone-else", chrono::Duration::minutes(30))
        .issue("admin")
        .unwrap();

    let (status, _) = app.get("/me", &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let app = TestApp::spawn().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("referrer-policy").is_some());
}

#[tokio::test]
async fn test_role_change_applies_to_existing_token() {
    let app = TestApp::spawn().await;
    let (alice_id, alice) = app.lawyer("alice").await;
    let admin = app.admin_token().await;

    let (status, _) = app.get("/users", &alice).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(
            &format!("/users/{alice_id}"),
            &admin,
            json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/users", &alice).await;
    assert_eq!(status, StatusCode::OK);
}
