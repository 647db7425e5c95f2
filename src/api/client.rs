use super::error::{message_of, ApiError};
use super::CatalogApi;
use crate::model::{ApiConfig, Credentials, DataEnvelope, Product, ProductPage, SigninResponse};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

/// reqwest-backed client for the catalog REST API.
pub(crate) struct HttpCatalogClient {
    http: Client,
    base_url: String,
    api_path: String,
    token: Option<String>,
}

impl HttpCatalogClient {
    pub(crate) fn new(cfg: &ApiConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(cfg.user_agent.clone());
        if let Some(timeout) = cfg.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_path: cfg.api_path.trim_matches('/').to_string(),
            token: None,
        })
    }

    fn admin_url(&self, rest: &str) -> String {
        format!("{}/v2/api/{}/admin/{}", self.base_url, self.api_path, rest)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let req = self.http.request(method, url);
        match self.token.as_deref() {
            Some(token) => req.header(AUTHORIZATION, token),
            None => req,
        }
    }

    /// Send a request and return its JSON body if the API accepted it.
    ///
    /// Non-2xx statuses and bodies carrying `"success": false` are both failures.
    async fn send(&self, req: RequestBuilder, what: &'static str) -> Result<Value, ApiError> {
        let resp = req.send().await.map_err(|e| {
            warn!(what, error = %e, "request did not complete");
            ApiError::from(e)
        })?;
        let status = resp.status();
        let text = resp.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        debug!(what, status = status.as_u16(), "response received");

        if !status.is_success() {
            let message = message_of(&body);
            warn!(what, status = status.as_u16(), %message, "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = message_of(&body);
            warn!(what, %message, "request rejected");
            return Err(ApiError::Rejected(message));
        }
        Ok(body)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    async fn check_session(&self) -> Result<(), ApiError> {
        let url = format!("{}/v2/api/user/check", self.base_url);
        self.send(self.request(Method::POST, url), "check").await?;
        Ok(())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SigninResponse, ApiError> {
        let url = format!("{}/v2/admin/signin", self.base_url);
        let body = self
            .send(self.request(Method::POST, url).json(credentials), "signin")
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn list_products(&self, page: u32) -> Result<ProductPage, ApiError> {
        let req = self
            .request(Method::GET, self.admin_url("products"))
            .query(&[("page", page)]);
        let body = self.send(req, "list").await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn create_product(&self, product: &Product) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST, self.admin_url("product"))
            .json(&DataEnvelope { data: product });
        self.send(req, "create").await?;
        Ok(())
    }

    async fn update_product(&self, id: &str, product: &Product) -> Result<(), ApiError> {
        let req = self
            .request(Method::PUT, self.admin_url(&format!("product/{id}")))
            .json(&DataEnvelope { data: product });
        self.send(req, "update").await?;
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, self.admin_url(&format!("product/{id}")));
        self.send(req, "delete").await?;
        Ok(())
    }
}
