//! Typed HTTP client for the sweetshop API.

use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use sweetshop_core::SweetId;

use crate::error::ClientError;
use crate::types::{AuthSession, NewSweetBody, SearchQuery, SweetChanges, SweetView, UserView};

pub struct SweetshopClient {
    api_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl SweetshopClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_token(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut client = Self::new(api_url);
        client.token = Some(token.into());
        client
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Check connectivity by hitting the health endpoint.
    pub async fn health(&self) -> bool {
        match self.http.get(self.url("/health")).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!("health check failed: {e}");
                false
            }
        }
    }

    /// Register a new account; the returned token is kept for later calls.
    pub async fn register(&mut self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let session: AuthSession = self
            .send_json(
                Method::POST,
                "/api/auth/register",
                Some(&json!({ "email": email, "password": password })),
            )
            .await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    /// Log in; the returned token is kept for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let session: AuthSession = self
            .send_json(
                Method::POST,
                "/api/auth/login",
                Some(&json!({ "email": email, "password": password })),
            )
            .await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    pub async fn me(&self) -> Result<UserView, ClientError> {
        self.send_json::<_, ()>(Method::GET, "/api/auth/me", None).await
    }

    pub async fn list_sweets(&self, query: &SearchQuery) -> Result<Vec<SweetView>, ClientError> {
        let mut req = self.request(Method::GET, "/api/sweets");
        if !query.is_empty() {
            req = req.query(query);
        }
        decode(req.send().await?).await
    }

    pub async fn get_sweet(&self, id: SweetId) -> Result<SweetView, ClientError> {
        self.send_json::<_, ()>(Method::GET, &format!("/api/sweets/{id}"), None)
            .await
    }

    pub async fn create_sweet(&self, sweet: &NewSweetBody) -> Result<SweetView, ClientError> {
        self.send_json(Method::POST, "/api/sweets", Some(sweet)).await
    }

    pub async fn update_sweet(
        &self,
        id: SweetId,
        changes: &SweetChanges,
    ) -> Result<SweetView, ClientError> {
        self.send_json(Method::PUT, &format!("/api/sweets/{id}"), Some(changes))
            .await
    }

    pub async fn purchase(&self, id: SweetId, quantity: i64) -> Result<SweetView, ClientError> {
        self.send_json(
            Method::POST,
            &format!("/api/sweets/{id}/purchase"),
            Some(&json!({ "quantity": quantity })),
        )
        .await
    }

    pub async fn restock(&self, id: SweetId, quantity: i64) -> Result<SweetView, ClientError> {
        self.send_json(
            Method::POST,
            &format!("/api/sweets/{id}/restock"),
            Some(&json!({ "quantity": quantity })),
        )
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        decode(req.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::from_response(status.as_u16(), &body));
    }
    resp.json::<T>()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}
