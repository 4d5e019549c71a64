//! Login, profile and logout flows for both token scopes.

pub mod callback;

use std::fmt;

use tracing::{info, warn};

use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::user::User;
use crate::routes::Route;
use crate::store::Session;

pub use callback::wait_for_token;

/// Stores the token delivered by the OAuth callback. Without one the user is
/// sent back to the login view.
pub fn complete_oauth(session: &Session, token: Option<String>) -> Result<Route, ClientError> {
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        warn!("login callback carried no token");
        return Ok(Route::Login);
    };
    session.user().set_token(Some(token))?;
    info!("user token stored from login callback");
    Ok(Route::MyPage)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileView {
    Loaded(User),
    Redirect(Route),
}

/// My-page: fetches the current user. No token, or a rejected one, means the
/// login view.
pub async fn profile(api: &ApiClient) -> Result<ProfileView, ClientError> {
    if !api.session().user().has_token() {
        return Ok(ProfileView::Redirect(Route::Login));
    }

    match api.current_user().await {
        Ok(user) => {
            api.session().user().set_identity(Some(user.clone()))?;
            Ok(ProfileView::Loaded(user))
        }
        Err(e) => {
            let err = ClientError::from(e);
            if err.is_auth() {
                Ok(ProfileView::Redirect(Route::Login))
            } else {
                Err(err)
            }
        }
    }
}

pub async fn refresh(api: &ApiClient) -> Result<(), ClientError> {
    let response = api.refresh_token().await?;
    api.session().user().set_token(Some(response.access_token))?;
    info!("access token refreshed");
    Ok(())
}

/// Tells the backend, then forgets the local identity whatever it answered.
pub async fn logout(api: &ApiClient) -> Result<Route, ClientError> {
    if let Err(e) = api.logout().await {
        warn!("backend logout failed; clearing local session anyway: {e}");
    }
    api.session().user().logout()?;
    Ok(Route::CheckForm)
}

pub async fn admin_login(
    api: &ApiClient,
    username: &str,
    password: &str,
) -> Result<Route, ClientError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(ClientError::Validation(
            "Enter both username and password.".to_string(),
        ));
    }
    let response = api.admin_login(username.trim(), password).await?;
    api.session()
        .admin()
        .login(response.admin, response.access_token)?;
    Ok(Route::Admin)
}

pub fn admin_logout(session: &Session) -> Result<Route, ClientError> {
    session.admin().logout()?;
    Ok(Route::AdminLogin)
}

impl fmt::Display for ProfileView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileView::Loaded(user) => {
                writeln!(f, "Name:     {}", user.name.as_deref().unwrap_or("-"))?;
                writeln!(f, "Email:    {}", user.email)?;
                writeln!(f, "Provider: {}", user.provider.as_str())
            }
            ProfileView::Redirect(route) => {
                writeln!(f, "You are not logged in. Run: {}", route.command())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method as MockMethod, StatusCode as MockStatus};
    use serde_json::json;

    use super::*;
    use crate::api_client::test_support::client_for;
    use crate::models::user::Provider;
    use crate::store::durable::testing::MemoryStorage;
    use crate::store::DurableStorage;
    use crate::testing::MockBackend;

    #[test]
    fn test_callback_token_routes_to_mypage() {
        let storage = Arc::new(MemoryStorage::default());
        let session = Session::hydrate(storage.clone()).unwrap();

        assert_eq!(complete_oauth(&session, Some("jwt".to_string())).unwrap(), Route::MyPage);
        assert_eq!(storage.raw("access_token").as_deref(), Some("jwt"));
    }

    #[test]
    fn test_callback_without_token_routes_to_login() {
        let storage = Arc::new(MemoryStorage::default());
        let session = Session::hydrate(storage.clone()).unwrap();

        assert_eq!(complete_oauth(&session, None).unwrap(), Route::Login);
        assert_eq!(complete_oauth(&session, Some(" ".to_string())).unwrap(), Route::Login);
        assert_eq!(storage.writes(), 0);
    }

    #[tokio::test]
    async fn test_profile_without_token_skips_fetch() {
        let backend = MockBackend::start().await;
        let client = client_for(&backend.base_url, Arc::new(MemoryStorage::default()));

        assert_eq!(profile(&client).await.unwrap(), ProfileView::Redirect(Route::Login));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_profile_stores_identity() {
        let backend = MockBackend::start().await;
        backend.respond(
            MockMethod::GET,
            "/api/v1/auth/me",
            MockStatus::OK,
            json!({ "id": "u1", "email": "kim@example.com", "name": "Kim", "provider": "kakao" }),
        );
        let storage = Arc::new(MemoryStorage::default());
        storage.set("access_token", "user-jwt").unwrap();
        let client = client_for(&backend.base_url, storage.clone());

        let ProfileView::Loaded(user) = profile(&client).await.unwrap() else {
            panic!("expected profile");
        };
        assert_eq!(user.provider, Provider::Kakao);
        assert!(client.session().user().is_authenticated());
        assert!(storage.raw("auth-storage").unwrap().contains("kim@example.com"));
    }

    #[tokio::test]
    async fn test_rejected_profile_clears_token_and_routes_to_login() {
        let backend = MockBackend::start().await;
        backend.respond(
            MockMethod::GET,
            "/api/v1/auth/me",
            MockStatus::UNAUTHORIZED,
            json!({ "detail": "Token expired" }),
        );
        let storage = Arc::new(MemoryStorage::default());
        storage.set("access_token", "user-jwt").unwrap();
        let client = client_for(&backend.base_url, storage.clone());

        assert_eq!(profile(&client).await.unwrap(), ProfileView::Redirect(Route::Login));
        assert_eq!(storage.raw("access_token"), None);
    }

    #[tokio::test]
    async fn test_logout_clears_locally_when_backend_fails() {
        let backend = MockBackend::start().await;
        backend.respond(
            MockMethod::POST,
            "/api/v1/auth/logout",
            MockStatus::INTERNAL_SERVER_ERROR,
            json!({}),
        );
        let storage = Arc::new(MemoryStorage::default());
        storage.set("access_token", "user-jwt").unwrap();
        storage.set("auth-storage", r#"{"id":"u1","email":"a@b.c"}"#).unwrap();
        let client = client_for(&backend.base_url, storage.clone());

        assert_eq!(logout(&client).await.unwrap(), Route::CheckForm);
        assert_eq!(storage.raw("access_token"), None);
        assert_eq!(storage.raw("auth-storage"), None);
        assert_eq!(backend.hits(&MockMethod::POST, "/api/v1/auth/logout"), 1);
    }

    #[tokio::test]
    async fn test_refresh_replaces_token() {
        let backend = MockBackend::start().await;
        backend.respond(
            MockMethod::POST,
            "/api/v1/auth/refresh",
            MockStatus::OK,
            json!({ "access_token": "fresh", "token_type": "bearer" }),
        );
        let storage = Arc::new(MemoryStorage::default());
        storage.set("access_token", "old").unwrap();
        let client = client_for(&backend.base_url, storage.clone());

        refresh(&client).await.unwrap();
        assert_eq!(storage.raw("access_token").as_deref(), Some("fresh"));
        assert_eq!(
            backend.requests()[0].authorization.as_deref(),
            Some("Bearer old")
        );
    }

    #[tokio::test]
    async fn test_admin_login_stores_admin_scope_only() {
        let backend = MockBackend::start().await;
        backend.respond(
            MockMethod::POST,
            "/api/v1/admin/auth/login",
            MockStatus::OK,
            json!({
                "access_token": "admin-jwt",
                "token_type": "bearer",
                "admin": { "id": "a1", "username": "admin", "name": "Admin" }
            }),
        );
        let storage = Arc::new(MemoryStorage::default());
        let client = client_for(&backend.base_url, storage.clone());

        assert_eq!(admin_login(&client, "admin", "pw").await.unwrap(), Route::Admin);
        assert_eq!(storage.raw("admin_token").as_deref(), Some("admin-jwt"));
        assert_eq!(storage.raw("access_token"), None);
        assert_eq!(
            backend.requests()[0].json(),
            json!({ "username": "admin", "password": "pw" })
        );

        assert_eq!(admin_logout(client.session()).unwrap(), Route::AdminLogin);
        assert_eq!(storage.raw("admin_token"), None);
        assert_eq!(storage.raw("admin-auth-storage"), None);
    }

    #[tokio::test]
    async fn test_admin_login_requires_both_fields() {
        let backend = MockBackend::start().await;
        let client = client_for(&backend.base_url, Arc::new(MemoryStorage::default()));

        let err = admin_login(&client, " ", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(backend.requests().is_empty());
    }
}
