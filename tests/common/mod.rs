//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use contractdesk::api::AppState;
use contractdesk::clients::dadata::{
    CompanyRegistry, PartyAddress, PartyData, PartyManagement, PartySuggestion,
};
use contractdesk::config::Config;
use contractdesk::state::SharedState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "secret1";

/// Registry double with one known company.
pub struct StaticRegistry;

pub fn known_company() -> PartySuggestion {
    PartySuggestion {
        value: "ООО \"РОМАШКА\"".to_string(),
        unrestricted_value: None,
        data: PartyData {
            inn: Some("7701234567".to_string()),
            ogrn: Some("1027700000001".to_string()),
            address: Some(PartyAddress {
                value: Some("г Москва, ул Тверская, д 1".to_string()),
            }),
            management: Some(PartyManagement {
                name: Some("Иванов Иван Иванович".to_string()),
                post: Some("ГЕНЕРАЛЬНЫЙ ДИРЕКТОР".to_string()),
            }),
            ..Default::default()
        },
    }
}

#[async_trait]
impl CompanyRegistry for StaticRegistry {
    async fn find_by_tax_id(&self, tax_id: &str) -> anyhow::Result<Option<PartySuggestion>> {
        Ok(Some(known_company()).filter(|c| c.data.inn.as_deref() == Some(tax_id)))
    }

    async fn suggest(&self, _query: &str, count: u32) -> anyhow::Result<Vec<PartySuggestion>> {
        Ok(vec![known_company(); count.min(2) as usize])
    }
}

pub fn test_config() -> Config {
    let db_path = std::env::temp_dir().join(format!(
        "contractdesk-test-{}.db",
        uuid::Uuid::new_v4()
    ));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.auth.secret_key = SECRET.to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(), Arc::new(StaticRegistry)).await
    }

    pub async fn spawn_with(config: Config, registry: Arc<dyn CompanyRegistry>) -> Self {
        let shared = SharedState::with_registry(config, registry)
            .await
            .expect("failed to create shared state");
        let state = contractdesk::api::create_app_state(Arc::new(shared), None);
        let router = contractdesk::api::router(state.clone());
        Self { state, router }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed for {username}: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login("admin", "admin").await
    }

    /// Creates a lawyer through the admin API and logs them in.
    pub async fn lawyer(&self, username: &str) -> (i32, String) {
        let admin = self.admin_token().await;
        let (status, body) = self
            .post(
                "/users",
                &admin,
                json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let id = i32::try_from(body["data"]["id"].as_i64().unwrap()).unwrap();
        (id, self.login(username, PASSWORD).await)
    }
}

/// RFC 3339 instant `days` whole days plus one hour from now.
pub fn days_from_now(days: i64) -> String {
    (chrono::Utc::now() + chrono::Duration::days(days) + chrono::Duration::hours(1)).to_rfc3339()
}

pub fn contract_body(inn: &str, end_date: &str) -> Value {
    json!({
        "company_name": "ООО Ромашка",
        "inn": inn,
        "director": "Иванов И.И.",
        "address": "г Москва, ул Тверская, д 1",
        "end_date": end_date,
    })
}
