use crate::core::types::Scope;

/// `/token` body parameters exactly as received.
#[derive(Debug, Clone, Default)]
#[derive(serde::Deserialize)]
pub struct RawTokenRequest {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl RawTokenRequest {
    /// Credentials from an `Authorization: Basic` header take precedence over
    /// body parameters.
    pub fn with_credentials(mut self, credentials: Option<super::ClientCredentials>) -> Self {
        if let Some(credentials) = credentials {
            self.client_id = Some(credentials.client_id);
            self.client_secret = Some(credentials.client_secret);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize)]
pub enum TokenType {
    Bearer,
}

#[derive(Debug)]
#[derive(serde::Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: TokenType,
    pub expires_in: u64,
    pub scope: Scope,
}
