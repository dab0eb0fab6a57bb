#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rollcall::router::init_router;
use rollcall::state::AppState;
use rollcall_auth::create_access_token;
use rollcall_config::{CorsConfig, EmailConfig, JwtConfig, RateLimitConfig};
use rollcall_core::hash_password;
use rollcall_db::{MemoryStore, Store};
use rollcall_models::{Class, ClassId, NewUser, Role, UniqueId, User};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub jwt_config: JwtConfig,
    pub state: AppState,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_rate_limit(RateLimitConfig::disabled())
}

pub fn spawn_app_with_rate_limit(rate_limit_config: RateLimitConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let jwt_config = JwtConfig::new("test-secret");
    let state = AppState::new(
        store.clone(),
        jwt_config.clone(),
        EmailConfig::default(),
        CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit_config,
    );

    TestApp {
        router: init_router(state.clone()),
        store,
        jwt_config,
        state,
    }
}

impl TestApp {
    /// Inserts a user directly into the store with [`TEST_PASSWORD`].
    pub async fn create_user(
        &self,
        unique_id: &str,
        role: Role,
        class_id: Option<ClassId>,
    ) -> User {
        let user = NewUser {
            name: format!("Test {}", unique_id),
            email: format!("{}@college.edu", unique_id.to_lowercase()),
            unique_id: UniqueId::new(unique_id).unwrap(),
            role,
            class_id,
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
        };
        self.store.create_user(user).await.unwrap()
    }

    pub async fn create_class(&self, name: &str, section: &str) -> Class {
        self.store.create_class(name, section).await.unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        create_access_token(user.id, user.role, &self.jwt_config).unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("DELETE", uri, token, None).await
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        read_response(response).await
    }
}

pub async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
