use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::session::Session;

use super::error::ApiError;
use super::types::*;

/// Typed facade over the Sweet Shop HTTP API.
///
/// Every request carries `Authorization: Bearer <token>` when the session
/// holds a non-empty token and no `Authorization` header at all otherwise.
/// One request per call: no retries, no timeout of its own, no caching.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, read fresh from the session.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.current_token() {
            Some(token) if !token.is_empty() => builder.bearer_auth(token),
            _ => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = self.authorize(builder).send().await?;
        let status = resp.status();
        log::debug!("{} {}", status.as_u16(), resp.url().path());

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let resp = self.send(builder).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ── Auth ────────────────────────────────────────────────────────────

    /// Returns the created account as raw JSON. Callers only need success.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let req = RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        self.send_json(self.client.post(self.url("/api/auth/register")).json(&req))
            .await
    }

    /// Credentials go form-encoded. The caller decides whether to store
    /// the returned token.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.send_json(self.client.post(self.url("/api/auth/login")).form(&req))
            .await
    }

    // ── Sweets ──────────────────────────────────────────────────────────

    pub async fn list_all(&self) -> Result<Vec<Sweet>, ApiError> {
        self.send_json(self.client.get(self.url("/api/sweets"))).await
    }

    /// Always hits the search endpoint, even for an empty filter.
    pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<Sweet>, ApiError> {
        self.send_json(
            self.client
                .get(self.url("/api/sweets/search"))
                .query(&filter.query_pairs()),
        )
        .await
    }

    pub async fn create(&self, form: &SweetForm) -> Result<Sweet, ApiError> {
        self.send_json(self.client.post(self.url("/api/sweets")).json(form))
            .await
    }

    pub async fn update(&self, id: i64, update: &SweetUpdate) -> Result<Sweet, ApiError> {
        self.send_json(
            self.client
                .put(self.url(&format!("/api/sweets/{}", id)))
                .json(update),
        )
        .await
    }

    /// The response body is ignored.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(&format!("/api/sweets/{}", id))))
            .await?;
        Ok(())
    }

    pub async fn purchase(&self, id: i64, quantity: i64) -> Result<StockChange, ApiError> {
        self.send_json(
            self.client
                .post(self.url(&format!("/api/sweets/{}/purchase", id)))
                .json(&QuantityRequest { quantity }),
        )
        .await
    }

    pub async fn restock(&self, id: i64, quantity: i64) -> Result<StockChange, ApiError> {
        self.send_json(
            self.client
                .post(self.url(&format!("/api/sweets/{}/restock", id)))
                .json(&QuantityRequest { quantity }),
        )
        .await
    }
}
