//! Authentication against the Rosalution auth endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::requests::{RequestError, RequestResult, Requests};

const AUTH_ROOT: &str = "/rosalution/api/auth";

/// Bearer token issued by a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,

    #[serde(default)]
    pub token_type: String,
}

/// The authenticated user's session as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,

    #[serde(default)]
    pub roles: Vec<String>,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, context: &str) -> RequestResult<T> {
    serde_json::from_value(value).map_err(|source| RequestError::Decode {
        url: context.to_string(),
        source,
    })
}

/// Exchange credentials for a session token
pub async fn login(
    requests: &dyn Requests,
    username: &str,
    password: &str,
) -> RequestResult<AuthToken> {
    let path = format!("{}/token", AUTH_ROOT);
    let mut fields = std::collections::HashMap::new();
    fields.insert("grant_type".to_string(), "password".to_string());
    fields.insert("username".to_string(), username.to_string());
    fields.insert("password".to_string(), password.to_string());
    let value = requests.post_form(&path, fields).await?;
    decode(value, &path)
}

/// Validate the current session token and fetch the user it belongs to
pub async fn verify(requests: &dyn Requests) -> RequestResult<Session> {
    let path = format!("{}/verify_token", AUTH_ROOT);
    let value = requests.get(&path).await?;
    decode(value, &path)
}

/// Invalidate the current session
pub async fn logout(requests: &dyn Requests) -> RequestResult<()> {
    let path = format!("{}/logout", AUTH_ROOT);
    requests.get(&path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::testing::FakeRequests;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_posts_password_grant_form() {
        let fake = FakeRequests::new();
        fake.respond_with(json!({"access_token": "jwt-token", "token_type": "bearer"}));

        let token = login(&fake, "vrr-prep", "secret").await.unwrap();
        assert_eq!(token.access_token, "jwt-token");

        let call = &fake.calls()[0];
        assert_eq!(call.method, "POST");
        assert_eq!(call.path, "/rosalution/api/auth/token");
        let fields = call.fields.as_ref().unwrap();
        assert_eq!(fields.get("grant_type").unwrap(), "password");
        assert_eq!(fields.get("username").unwrap(), "vrr-prep");
    }

    #[tokio::test]
    async fn test_verify_decodes_the_session() {
        let fake = FakeRequests::new();
        fake.respond_with(json!({"username": "vrr-prep", "roles": ["write"]}));

        let session = verify(&fake).await.unwrap();
        assert_eq!(session.username, "vrr-prep");
        assert_eq!(session.roles, vec!["write"]);
        assert_eq!(fake.calls()[0].path, "/rosalution/api/auth/verify_token");
    }

    #[tokio::test]
    async fn test_logout_hits_the_logout_endpoint() {
        let fake = FakeRequests::new();
        logout(&fake).await.unwrap();
        assert_eq!(fake.calls()[0].path, "/rosalution/api/auth/logout");
    }
}
