//! HTTP client for the portal API collaborators
//!
//! The core only talks to the auth endpoints (login, session verification)
//! and code verification. Everything else the portal does goes through its
//! own presentation-layer clients.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::gate::AuthResponse;
use crate::session::{Role, UserIdentity};

/// Error type for API calls
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// The server answered with a 4xx status
    pub fn is_client_error(&self) -> bool {
        matches!(self, ClientError::Status(status) if (400..500).contains(status))
    }
}

/// JSON client for the portal API
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    /// Create a client with authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => req.header("Authorization", format!("Bearer {}", token)),
            None => req,
        }
    }

    /// POST a JSON body and decode a JSON reply
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let req = self.authorize(self.client.post(&url).json(body));
        Self::decode(req.send().await?).await
    }

    /// GET and decode a JSON reply
    pub async fn get_json<R>(&self, path: &str) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let req = self.authorize(self.client.get(&url));
        Self::decode(req.send().await?).await
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for a session (`POST /auth/login`)
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse, ClientError> {
        self.post_json(
            "/auth/login",
            &LoginRequest {
                identifier,
                password,
            },
        )
        .await
    }
}

// ============================================================================
// Session verification collaborator
// ============================================================================

/// Verdict of the auth API on a stored session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionVerdict {
    pub valid: bool,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub identity: Option<UserIdentity>,
}

impl SessionVerdict {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            role: None,
            identity: None,
        }
    }
}

/// Session verification (`verifySession(token) -> {valid, role, identity}`)
#[async_trait(?Send)]
pub trait SessionVerifier {
    async fn verify_session(&self, token: &str) -> Result<SessionVerdict, ClientError>;
}

/// Verifies sessions against `GET /auth/session`
#[derive(Clone)]
pub struct RemoteSessionVerifier {
    client: ApiClient,
}

impl RemoteSessionVerifier {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl SessionVerifier for RemoteSessionVerifier {
    async fn verify_session(&self, token: &str) -> Result<SessionVerdict, ClientError> {
        let client = self.client.clone().with_token(token);
        match client.get_json::<SessionVerdict>("/auth/session").await {
            Ok(verdict) => Ok(verdict),
            Err(ClientError::Status(401)) | Err(ClientError::Status(403)) => {
                Ok(SessionVerdict::invalid())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_url_join() {
        let client = ApiClient::new("http://localhost:8080/api/");
        assert_eq!(client.url("/codes/verify"), "http://localhost:8080/api/codes/verify");
        assert_eq!(client.url("auth/session"), "http://localhost:8080/api/auth/session");
    }

    #[tokio::test]
    async fn test_session_verifier_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/session"))
            .and(header("Authorization", "Bearer tok-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "valid": true,
                "role": "director",
                "identity": { "id": "u-9", "name": "Ines", "institutionCode": "INST-3" }
            })))
            .mount(&server)
            .await;

        let verifier = RemoteSessionVerifier::new(ApiClient::new(server.uri()));
        let verdict = verifier.verify_session("tok-9").await.unwrap();

        assert!(verdict.valid);
        assert_eq!(verdict.role, Some(Role::Director));
        assert_eq!(
            verdict.identity.map(|i| i.name),
            Some("Ines".to_string())
        );
    }

    #[tokio::test]
    async fn test_session_verifier_unauthorized_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/session"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let verifier = RemoteSessionVerifier::new(ApiClient::new(server.uri()));
        let verdict = verifier.verify_session("stale").await.unwrap();

        assert_eq!(verdict, SessionVerdict::invalid());
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/session"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let verifier = RemoteSessionVerifier::new(ApiClient::new(server.uri()));
        let err = verifier.verify_session("tok").await.unwrap_err();

        assert!(matches!(err, ClientError::Status(503)));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_login_returns_session_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "identifier": "ines@school.test", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-9",
                "identity": { "id": "u-9", "name": "Ines" },
                "role": "supervisor"
            })))
            .mount(&server)
            .await;

        let auth = ApiClient::new(server.uri())
            .login("ines@school.test", "pw")
            .await
            .unwrap();

        assert_eq!(auth.token, "tok-9");
        assert_eq!(auth.role, Role::Supervisor);
        assert_eq!(auth.identity.id, "u-9");
    }

    #[tokio::test]
    async fn test_login_bad_credentials_is_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = ApiClient::new(server.uri())
            .login("ines@school.test", "wrong")
            .await
            .unwrap_err();

        assert!(err.is_client_error());
    }
}
