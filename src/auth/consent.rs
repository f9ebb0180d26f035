use crate::core::types::{AuthCode, ClientId};

use super::{error::ErrorResponse, Redirect, WithState};

/// `/confirm_auth` query parameters exactly as received.
#[derive(Debug, Clone, Default)]
#[derive(serde::Deserialize)]
pub struct RawConsentRequest {
    pub authorize: Option<String>,
    pub client_id: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConsentRequest {
    pub authorize: bool,
    pub client_id: ClientId,
    pub state: String,
}

#[derive(Debug)]
#[derive(serde::Serialize)]
pub struct AuthorizationCodeResponse {
    pub code: AuthCode,
    pub state: String,
}

#[derive(Debug)]
#[derive(serde::Serialize)]
#[serde(untagged)]
pub enum ConsentResponse {
    Code(AuthorizationCodeResponse),
    Error(WithState<ErrorResponse>),
}

pub type ConsentRedirect = Redirect<ConsentResponse>;
