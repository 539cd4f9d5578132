#![allow(dead_code)]

use chrono::Utc;
use db::models::user::{Role, User};
use serde_json::{Value, json};
use server::{AppState, build_router};
use services::services::{
    rbac::RbacPolicy,
    store::{MemoryStore, Store},
};
use tokio::net::TcpListener;
use uuid::Uuid;

pub struct TestApp {
    pub base: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("GET")
    }

    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST")
    }

    pub async fn put(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.expect("DELETE")
    }

    /// POSTs and returns the created row, asserting 201.
    pub async fn create(&self, path: &str, body: &Value) -> Value {
        let response = self.post(path, body).await;
        assert_eq!(response.status(), 201, "POST {path} {body}");
        response.json().await.expect("json body")
    }
}

/// Serves the API over the in-memory store on an ephemeral port.
pub async fn spawn_app_with(policy: RbacPolicy, users: Vec<User>) -> TestApp {
    let memory = MemoryStore::new();
    for user in users {
        memory.insert_user(user).await;
    }
    let app = build_router(AppState::new(Store::Memory(memory), policy));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestApp {
        base: format!("http://{addr}/api"),
        client: reqwest::Client::new(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(RbacPolicy::default(), Vec::new()).await
}

pub fn user(role: Option<Role>) -> User {
    let id = Uuid::new_v4();
    User {
        id,
        email: format!("{id}@example.com"),
        full_name: None,
        role,
        created_at: Utc::now(),
    }
}

pub fn lead_body(name: &str, email: &str, phone: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "phone": phone,
        "status": "New",
        "client_domain": "Ecommerce",
        "contact_platform": "LinkedIn",
        "location": "Berlin, Germany",
        "note": "Met at a trade fair"
    })
}

pub async fn create_lead(app: &TestApp, name: &str) -> Value {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    app.create("/leads", &lead_body(name, &email, "+1 555 0100")).await
}

pub fn id_of(row: &Value) -> String {
    row["id"].as_str().expect("id").to_string()
}
