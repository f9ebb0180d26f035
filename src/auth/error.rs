/// Fixed error vocabulary used on the wire. Nothing else is ever placed in
/// an `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    InvalidState,
    InvalidClient,
    InvalidGrant,
    AccessDenied,
    UnsupportedGrantType,
    ServerError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        use ErrorKind::*;

        match self {
            InvalidRequest => "invalid_request",
            InvalidState => "invalid_state",
            InvalidClient => "invalid_client",
            InvalidGrant => "invalid_grant",
            AccessDenied => "access_denied",
            UnsupportedGrantType => "unsupported_grant_type",
            ServerError => "server_error",
        }
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, ErrorKind::ServerError)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "error")]
    pub kind: ErrorKind,
}

impl From<ErrorKind> for ErrorResponse {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}
