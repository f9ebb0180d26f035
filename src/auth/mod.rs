use crate::core::models::{Client, Decision, PendingAuthorization, RedeemedCode};
use crate::core::types::{ClientId, HashedAuthCode, RedirectUri, SessionToken, Timestamp};
use crate::provider::error::Error;

pub mod access_token;
pub mod authorization;
pub mod consent;
pub mod error;

pub use access_token::*;
pub use authorization::*;
pub use consent::*;
pub use error::{ErrorKind, ErrorResponse};

#[derive(Debug, Clone)]
#[derive(serde::Serialize)]
pub struct WithState<T> {
    #[serde(flatten)]
    pub inner: T,
    pub state: String,
}

impl<T> From<(T, String)> for WithState<T> {
    fn from((inner, state): (T, String)) -> Self {
        Self { inner, state }
    }
}

/// A response delivered by sending the user agent back to a client's
/// redirect URI with `params` appended to the query.
#[derive(Debug, Clone)]
pub struct Redirect<T> {
    pub uri: RedirectUri,
    pub params: T,
}

impl<T> Redirect<T> {
    pub fn new(uri: RedirectUri, params: T) -> Self {
        Redirect { uri, params }
    }
}

/// Client credentials taken from an HTTP Basic `Authorization` header.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Outcome of an atomic redemption attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Redemption {
    Redeemed(RedeemedCode),
    NoLiveCode,
    CodeMismatch,
    RedirectMismatch,
}

#[async_trait::async_trait]
pub trait ClientRegistry: Send + Sync {
    async fn get_client(&self, client_id: &ClientId) -> Result<Option<Client>, Error>;
}

/// Holds pending authorizations and the redeemable codes they turn into.
///
/// Every method is a single atomic transition on the backing store.
#[async_trait::async_trait]
pub trait AuthorizationCodeStore: Send + Sync {
    async fn create_pending(&self, pending: PendingAuthorization) -> Result<SessionToken, Error>;

    /// Returns the pending authorization only while it is live at `now`.
    async fn resolve_pending(
        &self,
        session: &SessionToken,
        now: Timestamp,
    ) -> Result<Option<PendingAuthorization>, Error>;

    /// Removes the pending authorization and, on approval, stores its code as
    /// the client's redeemable code. Returns `None` when the session is
    /// absent or expired, in which case nothing is written.
    async fn finalize(
        &self,
        session: &SessionToken,
        decision: Decision,
        now: Timestamp,
    ) -> Result<Option<PendingAuthorization>, Error>;

    /// Clears the client's redeemable code if and only if it is live and
    /// matches both `code` and `redirect_uri`.
    async fn redeem(
        &self,
        client_id: &ClientId,
        code: &HashedAuthCode,
        redirect_uri: &RedirectUri,
        now: Timestamp,
    ) -> Result<Redemption, Error>;

    async fn clean_up(&self, now: Timestamp) -> Result<(), Error>;
}

pub trait Store: ClientRegistry + AuthorizationCodeStore {}

impl<T: ClientRegistry + AuthorizationCodeStore> Store for T {}
