#![allow(dead_code)]

use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::json;
use wiremock::{Match, MockServer, Request};

use sweetshop_lib::api::ApiClient;
use sweetshop_lib::session::{MemoryStore, Session};
use sweetshop_lib::shop::ShopManager;

const SECRET: &str = "test-secret";

#[derive(Serialize)]
struct TestClaims<'a> {
    sub: &'a str,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_admin: Option<bool>,
}

/// HS256 token shaped like the server's, expiring `ttl_secs` from now.
pub fn mint_token(sub: &str, ttl_secs: i64, is_admin: Option<bool>) -> String {
    let claims = TestClaims {
        sub,
        exp: chrono::Utc::now().timestamp() + ttl_secs,
        is_admin,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn client(server: &MockServer, session: Session) -> ApiClient {
    ApiClient::new(&server.uri(), session)
}

pub fn shop(server: &MockServer, token: Option<&str>) -> ShopManager {
    let store = match token {
        Some(token) => MemoryStore::with_token(token),
        None => MemoryStore::new(),
    };
    ShopManager::new(client(server, Session::new(Arc::new(store))))
}

pub fn sweets_json() -> serde_json::Value {
    json!([
        { "id": 1, "name": "Fudge", "category": "Chocolate", "price": 2.5, "quantity": 5 },
        { "id": 2, "name": "Gobstopper", "category": "Hard candy", "price": 0.75, "quantity": 0 }
    ])
}

pub fn sweet_json(id: i64, name: &str, quantity: i64) -> serde_json::Value {
    json!({ "id": id, "name": name, "category": "Chocolate", "price": 2.5, "quantity": quantity })
}

pub fn stock_json(action: &str, id: i64, quantity: i64, delta: i64) -> serde_json::Value {
    let mut body = json!({
        "message": format!("{} successful", action),
        "sweet_id": id,
        "name": "Fudge",
        "quantity": quantity,
    });
    let key = if action == "Purchase" { "purchased" } else { "restocked" };
    body[key] = json!(delta);
    body
}

/// Matches requests that carry no `Authorization` header at all.
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}
