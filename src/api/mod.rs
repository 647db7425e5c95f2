//! Remote catalog API.
//!
//! `CatalogApi` is the seam between the controller and the network; `HttpCatalogClient`
//! is the reqwest-backed implementation.

mod client;
mod error;

pub(crate) use client::HttpCatalogClient;
pub(crate) use error::ApiError;

use crate::model::{Credentials, Product, ProductPage, SigninResponse};
use async_trait::async_trait;

#[async_trait]
pub(crate) trait CatalogApi: Send + Sync {
    /// Attach (or detach) the token sent as `Authorization` on every later request.
    fn set_token(&mut self, token: Option<String>);

    async fn check_session(&self) -> Result<(), ApiError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<SigninResponse, ApiError>;

    async fn list_products(&self, page: u32) -> Result<ProductPage, ApiError>;

    async fn create_product(&self, product: &Product) -> Result<(), ApiError>;

    async fn update_product(&self, id: &str, product: &Product) -> Result<(), ApiError>;

    async fn delete_product(&self, id: &str) -> Result<(), ApiError>;
}
