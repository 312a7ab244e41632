#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use consulting_portal::auth::jwt::JwtManager;
use consulting_portal::config::Config;
use consulting_portal::db::models::Role;
use consulting_portal::db::{pool, queries};
use consulting_portal::feed::{ChangeFeed, Topic};
use consulting_portal::routes::create_router;
use consulting_portal::AppState;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use tower::ServiceExt;

pub const PASSWORD: &str = "CorrectHorse9";

// ─── TestResponse ────────────────────────────────────────────────────────────

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).to_string()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body_bytes).unwrap_or_else(|e| {
            panic!(
                "Failed to deserialize response as {}: {e}\nBody: {}",
                std::any::type_name::<T>(),
                self.text()
            )
        })
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status, expected,
            "Expected status {expected}, got {}. Body: {}",
            self.status,
            self.text()
        );
    }

    pub fn error_code(&self) -> String {
        let json: serde_json::Value = self.json();
        json["error"].as_str().unwrap_or_default().to_string()
    }
}

// ─── EventStream ─────────────────────────────────────────────────────────────

/// Reads server-sent events off a live response body.
pub struct EventStream {
    body: Body,
    buffer: String,
}

impl EventStream {
    /// Next `data` payload, skipping keep-alive comments.
    pub async fn next_json(&mut self) -> serde_json::Value {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let raw: String = self.buffer.drain(..end + 2).collect();
                let data = raw
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(str::trim_start)
                    .collect::<Vec<_>>()
                    .join("\n");
                if data.is_empty() {
                    continue;
                }
                return serde_json::from_str(&data)
                    .unwrap_or_else(|e| panic!("bad event payload {data}: {e}"));
            }

            let frame = tokio::time::timeout(Duration::from_secs(2), self.body.frame())
                .await
                .expect("no event arrived in time")
                .expect("stream ended")
                .expect("stream failed");
            if let Ok(bytes) = frame.into_data() {
                self.buffer.push_str(std::str::from_utf8(&bytes).expect("non-utf8 event"));
            }
        }
    }

    /// Asserts nothing arrives for a short while.
    pub async fn assert_quiet(&mut self) {
        let idle = tokio::time::timeout(Duration::from_millis(100), self.body.frame()).await;
        assert!(idle.is_err(), "unexpected event");
    }
}

// ─── SignedIn ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user_id: String,
    pub email: String,
    pub token: String,
}

impl SignedIn {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// ─── TestApp ─────────────────────────────────────────────────────────────────

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "integration-test-secret-0123456789".to_string(),
            jwt_issuer: "consulting-portal-test".to_string(),
            jwt_access_token_expiry_secs: 3600,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_allowed_origins: "http://localhost:5173".to_string(),
            feed_capacity: 64,
        };

        let db = pool::connect(&config.database_url)
            .await
            .expect("Failed to connect to in-memory SQLite");

        migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let jwt = JwtManager::new(&config).expect("Failed to init JwtManager");
        let feed = ChangeFeed::new(config.feed_capacity);

        let state = AppState {
            db,
            jwt,
            config,
            feed,
        };

        let router = create_router(state.clone());

        Self { router, state }
    }

    pub async fn request(&self, req: Request<Body>) -> TestResponse {
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("oneshot failed");

        let status = resp.status();
        let body_bytes = resp
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes()
            .to_vec();

        TestResponse { status, body_bytes }
    }

    pub async fn stream(&self, uri: &str, bearer: Option<&SignedIn>) -> EventStream {
        let mut builder = Request::builder().uri(uri);
        if let Some(user) = bearer {
            builder = builder.header("Authorization", user.bearer());
        }
        let resp = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .expect("oneshot failed");
        assert_eq!(resp.status(), StatusCode::OK, "stream {uri} refused");

        EventStream {
            body: resp.into_body(),
            buffer: String::new(),
        }
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        bearer: Option<&SignedIn>,
        body: Option<serde_json::Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = bearer {
            builder = builder.header("Authorization", user.bearer());
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        self.request(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str, bearer: Option<&SignedIn>) -> TestResponse {
        self.send("GET", uri, bearer, None).await
    }

    pub async fn post(&self, uri: &str, bearer: Option<&SignedIn>, body: serde_json::Value) -> TestResponse {
        self.send("POST", uri, bearer, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, bearer: Option<&SignedIn>, body: serde_json::Value) -> TestResponse {
        self.send("PATCH", uri, bearer, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, bearer: Option<&SignedIn>) -> TestResponse {
        self.send("DELETE", uri, bearer, None).await
    }

    // ── Auth helpers ─────────────────────────────────────────────────────

    pub async fn register_user(&self, email: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        self.post("/api/auth/register", None, body).await
    }

    pub async fn login_user(&self, email: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        self.post("/api/auth/login", None, body).await
    }

    /// Registers a fresh account and returns its bearer credentials.
    pub async fn sign_up(&self, email: &str) -> SignedIn {
        let resp = self.register_user(email, PASSWORD).await;
        resp.assert_status(StatusCode::OK);
        let json: serde_json::Value = resp.json();
        SignedIn {
            user_id: json["user_id"].as_str().unwrap().to_string(),
            email: json["email"].as_str().unwrap().to_string(),
            token: json["access_token"].as_str().unwrap().to_string(),
        }
    }

    /// Registers an account and gives its profile `role` directly in the store.
    pub async fn sign_up_as(&self, email: &str, role: Role) -> SignedIn {
        let user = self.sign_up(email).await;
        queries::users::set_role(&self.state.db, &user.user_id, role)
            .await
            .expect("failed to set role");
        self.state.feed.publish(Topic::User(user.user_id.clone()));
        user
    }

    // ── Domain helpers ───────────────────────────────────────────────────

    pub async fn create_public_event(&self, admin: &SignedIn, title: &str, date: &str) -> serde_json::Value {
        let body = serde_json::json!({
            "title": title,
            "description": "An evening of admissions advice.",
            "imageUrl": "https://example.com/poster.png",
            "location": "Main Hall",
            "time": "18:00",
            "date": date,
            "type": "Workshop",
        });
        let resp = self.post("/admin/public-events", Some(admin), body).await;
        resp.assert_status(StatusCode::OK);
        resp.json()
    }
}
