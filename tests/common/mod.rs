// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use daily_quiz::{
    config::Config,
    models::user::{NewUser, ROLE_ADMIN},
    routes,
    state::AppState,
    store::{DynStore, MemoryStore, UserStore},
    utils::jwt::sign_jwt,
};

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
        port: 0,
    }
}

/// Spawns the app on a random port, backed by a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: DynStore = store.clone();

    let app = routes::create_router(AppState {
        store: dyn_store,
        config: test_config(),
    });

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        store,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    /// Registers a student through the API and logs in. Returns (id, token).
    pub async fn student(&self, username: &str, name: &str) -> (i64, String) {
        let password = "password123";

        let registered = self
            .client
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
                "name": name
            }))
            .send()
            .await
            .expect("Register failed");
        assert_eq!(registered.status().as_u16(), 201);
        let user: serde_json::Value = registered.json().await.unwrap();

        let login: serde_json::Value = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        (
            user["id"].as_i64().expect("id missing"),
            login["token"].as_str().expect("Token not found").to_string(),
        )
    }

    /// Creates an admin directly in the store and signs a token for it.
    pub async fn admin_token(&self) -> String {
        let admin = self
            .store
            .create_user(NewUser {
                username: format!("admin_{}", &uuid::Uuid::new_v4().to_string()[..8]),
                name: "Admin".to_string(),
                password_hash: "unused".to_string(),
                role: ROLE_ADMIN.to_string(),
            })
            .await
            .unwrap();

        sign_jwt(admin.id, &admin.role, TEST_SECRET, 600).unwrap()
    }

    /// Creates `count` questions in a bucket through the admin API. Returns their ids.
    pub async fn seed_bucket(&self, admin_token: &str, date: &str, level: &str, count: usize) -> Vec<i64> {
        let mut ids = Vec::new();
        for i in 0..count {
            let resp = self
                .client
                .post(self.url("/quiz-questions"))
                .bearer_auth(admin_token)
                .json(&serde_json::json!({
                    "date": date,
                    "level": level,
                    "question": format!("Question {}", i),
                    "options": ["A", "B", "C", "D"],
                    "correctAnswer": "A"
                }))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status().as_u16(), 201);
            let body: serde_json::Value = resp.json().await.unwrap();
            ids.push(body["id"].as_i64().unwrap());
        }
        ids
    }

    pub async fn answer(
        &self,
        token: &str,
        question_id: i64,
        date: &str,
        level: &str,
        is_correct: bool,
    ) -> serde_json::Value {
        let resp = self
            .client
            .post(self.url("/student-quiz/answer"))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "questionId": question_id,
                "date": date,
                "level": level,
                "isCorrect": is_correct
            }))
            .send()
            .await
            .expect("Answer request failed");
        assert_eq!(resp.status().as_u16(), 200);
        resp.json().await.unwrap()
    }
}
