use reqwest::{Method, Url};
use serde_json::{json, Value};

use crate::api_client::{ApiClient, ApiError, Body};
use crate::models::admin::AdminLoginRequest;
use crate::models::user::{AdminLoginResponse, Provider, TokenResponse, User};
use crate::store::TokenScope;

impl ApiClient {
    /// Browser entry point of the provider's OAuth flow.
    pub fn login_url(&self, provider: Provider) -> Result<Url, ApiError> {
        self.endpoint(&["auth", provider.as_str(), "login"])
    }

    /// GET /auth/me
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get(&["auth", "me"], &[], TokenScope::User).await
    }

    /// POST /auth/refresh
    pub async fn refresh_token(&self) -> Result<TokenResponse, ApiError> {
        self.send(
            Method::POST,
            &["auth", "refresh"],
            &[],
            TokenScope::User,
            Body::Json(json!({})),
        )
        .await
    }

    /// POST /auth/logout
    pub async fn logout(&self) -> Result<(), ApiError> {
        let _: Value = self
            .send(Method::POST, &["auth", "logout"], &[], TokenScope::User, Body::Empty)
            .await?;
        Ok(())
    }

    /// POST /admin/auth/login
    pub async fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminLoginResponse, ApiError> {
        let body = serde_json::to_value(AdminLoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        self.send(
            Method::POST,
            &["admin", "auth", "login"],
            &[],
            TokenScope::Admin,
            Body::Json(body),
        )
        .await
    }
}
