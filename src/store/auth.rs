//! Identity Provider client.
//!
//! Password and magic-link sign-in, bearer-token verification for the
//! admin endpoints, and service-role identity creation. All calls go
//! through the shared store client, so they carry the same timeout and
//! the same no-retry contract.

use serde::{Deserialize, Serialize};

use super::{StoreClient, StoreError};

/// The authenticated identity behind a bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A granted session after password sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PasswordGrantBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct MagicLinkBody<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct AdminCreateUserBody<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
}

impl StoreClient {
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url(), path)
    }

    /// Email/password sign-in. The granted access token becomes a `Session`.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenGrant, StoreError> {
        let request = self
            .http()
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", self.anon_key())
            .json(&PasswordGrantBody { email, password });
        let resp = self.send(request).await?;
        resp.json().await.map_err(StoreError::Http)
    }

    /// Request a passwordless sign-in link for `email`.
    pub async fn send_magic_link(&self, email: &str) -> Result<(), StoreError> {
        let request = self
            .http()
            .post(self.auth_url("magiclink"))
            .header("apikey", self.anon_key())
            .json(&MagicLinkBody { email });
        self.send(request).await?;
        Ok(())
    }

    /// Resolve a bearer token to its identity. A 401/403 from the provider
    /// means the token is missing, expired or forged.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, StoreError> {
        let request = self
            .http()
            .get(self.auth_url("user"))
            .header("apikey", self.anon_key())
            .bearer_auth(access_token);
        let resp = self.send(request).await?;
        resp.json().await.map_err(StoreError::Http)
    }

    /// Create a new identity using the service-role key (admin-only path;
    /// never reachable with the anon key).
    pub async fn admin_create_identity(
        &self,
        service_role_key: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, StoreError> {
        let request = self
            .http()
            .post(self.auth_url("admin/users"))
            .header("apikey", self.anon_key())
            .bearer_auth(service_role_key)
            .json(&AdminCreateUserBody {
                email,
                password,
                email_confirm: true,
            });
        let resp = self.send(request).await?;
        resp.json().await.map_err(StoreError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Config;

    #[test]
    fn test_auth_url_shape() {
        let config = Config {
            store_url: "https://db.example.com".to_string(),
            anon_key: "anon".to_string(),
            service_role_key: None,
            admin_bootstrap_secret: None,
            bind_addr: "127.0.0.1:0".to_string(),
            request_timeout_secs: 5,
            rate_feed_url: None,
        };
        let client = StoreClient::new(&config).unwrap();
        assert_eq!(client.auth_url("user"), "https://db.example.com/auth/v1/user");
        assert_eq!(
            client.auth_url("admin/users"),
            "https://db.example.com/auth/v1/admin/users"
        );
    }

    #[test]
    fn test_token_grant_deserialization() {
        let json = r#"{
            "access_token": "jwt-abc",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r-123",
            "user": {"id": "u1", "email": "a@example.com"}
        }"#;
        let grant: TokenGrant = serde_json::from_str(json).unwrap();
        assert_eq!(grant.access_token, "jwt-abc");
        assert_eq!(grant.expires_in, Some(3600));
    }

    #[test]
    fn test_auth_user_tolerates_missing_email() {
        let user: AuthUser = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
        assert_eq!(user.id, "u1");
        assert!(user.email.is_none());
    }
}
