// src/services/auth.rs
use crate::core::api_client::ApiClient;
use crate::core::session::Session;
use crate::error::{ApiError, Result};
use crate::types::response::{LoginRequest, LoginResponse};

const LOGIN_ENDPOINT: &str = "/auth/login";

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session; the caller decides where to persist it
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::validation("email", "email and password are required"));
        }

        let response: LoginResponse = self
            .client
            .post(
                LOGIN_ENDPOINT,
                &LoginRequest {
                    email: email.trim().to_string(),
                    password: password.to_string(),
                },
            )
            .await?;

        Ok(Session::new(response.access_token, response.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::MockTransport;

    #[tokio::test]
    async fn test_login_builds_session() {
        let transport = MockTransport::new().respond_json(
            200,
            serde_json::json!({
                "access_token": "jwt-here",
                "token_type": "bearer",
                "user": {"id": "u1", "name": "Ada", "email": "ada@example.com", "role": "admin"}
            }),
        );
        let service = AuthService::new(ApiClient::with_transport(transport.clone(), None));

        let session = service.login("ada@example.com ", "pw").await.unwrap();
        assert_eq!(session.access_token, "jwt-here");
        assert_eq!(session.user.unwrap().name, "Ada");
        assert_eq!(
            transport.only_request().json_body().unwrap()["email"],
            "ada@example.com"
        );
    }

    #[tokio::test]
    async fn test_bad_credentials_surface_server_text() {
        let transport = MockTransport::new().respond(400, r#"{"detail": "Incorrect email or password"}"#);
        let service = AuthService::new(ApiClient::with_transport(transport, None));
        let err = service.login("ada@example.com", "nope").await.unwrap_err();
        assert_eq!(err.user_message(), "Incorrect email or password");
    }
}
