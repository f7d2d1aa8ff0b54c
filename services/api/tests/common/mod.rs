#![allow(dead_code)]

use api_lib::{
    adapters::InMemoryDb,
    config::Config,
    web::{router, state::AppState},
};
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, Method, Request, StatusCode},
    Router,
};
use cookbook_core::domain::User;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tracing::Level;

pub struct TestApp {
    pub router: Router,
    pub db: Arc<InMemoryDb>,
}

/// An app backed by the in-memory store, with users `u1` (Ada) and `u2` (Bob).
pub fn test_app() -> TestApp {
    let db = Arc::new(InMemoryDb::with_users(vec![
        User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
        },
        User {
            id: "u2".to_string(),
            name: "Bob".to_string(),
        },
    ]));
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "memory://".to_string(),
        db_max_connections: 1,
        log_level: Level::DEBUG,
        cors_allowed_origin: HeaderValue::from_static("http://localhost:3000"),
    };
    let state = Arc::new(AppState {
        db: db.clone(),
        config: Arc::new(config),
    });
    TestApp {
        router: router(state),
        db,
    }
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// Sends `body` verbatim, with the given `Content-Type` if any.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Every response body is either empty or JSON; anything else fails the test.
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    /// Creates a recipe and returns its id.
    pub async fn create_recipe(&self, user_id: &str, body: Value) -> String {
        let (status, created) = self
            .request(Method::POST, &format!("/recipes?userId={}", user_id), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        created["id"].as_str().unwrap().to_string()
    }
}

pub fn soup() -> Value {
    json!({
        "title": "Soup",
        "ingredients": [{"quantity": 1, "unitOfMeasurement": "L", "product": "water"}],
        "directions": [{"description": "boil"}]
    })
}

pub fn recipe_body(title: &str, servings: i32, minutes: i32, products: &[&str]) -> Value {
    json!({
        "title": title,
        "servings": servings,
        "totalTimeInMinutes": minutes,
        "ingredients": products
            .iter()
            .map(|p| json!({"quantity": 1, "unitOfMeasurement": "pc", "product": p}))
            .collect::<Vec<_>>(),
        "directions": [{"description": "cook"}]
    })
}

pub fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}
