use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Kakao,
    Naver,
    Google,
    /// Accounts the backend created without a social provider.
    #[serde(other)]
    #[value(skip)]
    Other,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Kakao => "kakao",
            Provider::Naver => "naver",
            Provider::Google => "google",
            Provider::Other => "other",
        }
    }
}

/// End-user identity as returned by `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default = "unknown_provider")]
    pub provider: Provider,
}

fn unknown_provider() -> Provider {
    Provider::Other
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "tokenType", default)]
    pub token_type: Option<String>,
    pub admin: AdminUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_provider_maps_to_other() {
        let user: User = serde_json::from_value(json!({
            "id": "demo-user",
            "email": "demo@example.com",
            "name": "Demo User",
            "provider": "demo"
        }))
        .unwrap();
        assert_eq!(user.provider, Provider::Other);
    }

    #[test]
    fn test_admin_login_accepts_camel_case_token() {
        let response: AdminLoginResponse = serde_json::from_value(json!({
            "accessToken": "jwt",
            "tokenType": "Bearer",
            "admin": { "id": "a1", "username": "root", "name": null }
        }))
        .unwrap();
        assert_eq!(response.access_token, "jwt");
        assert_eq!(response.admin.username, "root");
    }
}
