use crate::auth::{AccessTokenResponse, ErrorKind, RawTokenRequest, Redemption, Store};
use crate::core::types::{
    AuthCode, ClientId, ClientSecret, HashedAuthCode, RedirectUri, Timestamp,
    GRANT_TYPE_AUTHORIZATION_CODE,
};
use crate::provider::error::ResultExt;
use crate::provider::token::TokenService;
use crate::util::hash::HashingService;

use super::OAuth2Provider;

use tracing::{event, Level};

fn required(value: Option<String>) -> Result<String, ErrorKind> {
    value.filter(|v| !v.is_empty()).ok_or(ErrorKind::InvalidRequest)
}

impl<S: Store> OAuth2Provider<S> {
    /// `/token`: exchange a redeemable code for a signed bearer token.
    #[tracing::instrument(skip_all, fields(client_id = ?req.client_id))]
    pub async fn access_token_request(
        &self,
        req: RawTokenRequest,
    ) -> Result<AccessTokenResponse, ErrorKind> {
        event!(Level::TRACE, "Handling access token request");

        if req.grant_type.as_deref() != Some(GRANT_TYPE_AUTHORIZATION_CODE) {
            event!(Level::DEBUG, grant_type = ?req.grant_type, "Unsupported grant_type");
            return Err(ErrorKind::UnsupportedGrantType);
        }

        let client_id = ClientId(required(req.client_id)?);
        let code = AuthCode(required(req.code)?);
        let redirect_uri = RedirectUri(required(req.redirect_uri)?);
        let client_secret = ClientSecret(required(req.client_secret)?);

        let client = self
            .store
            .get_client(&client_id)
            .await
            .or_server_error("Client lookup failed")?
            .ok_or_else(|| {
                event!(Level::DEBUG, "Unknown client");
                self.hasher.verify_absent(&client_secret);
                ErrorKind::InvalidClient
            })?;

        let authenticated = self
            .hasher
            .verify(&client_secret, &client.secret)
            .or_server_error("Client secret verification failed")?;
        if !authenticated {
            event!(Level::WARN, "Bad client secret");
            return Err(ErrorKind::InvalidClient);
        }

        let hashed_code: HashedAuthCode = HashingService::hash_without_salt(&code);
        let redeemed = match self
            .store
            .redeem(&client.id, &hashed_code, &redirect_uri, Timestamp::now())
            .await
            .or_server_error("Code redemption failed")?
        {
            Redemption::Redeemed(redeemed) => redeemed,
            rejected => {
                event!(Level::WARN, reason = ?rejected, "Code redemption refused");
                return Err(ErrorKind::InvalidGrant);
            }
        };

        let access_token = self
            .token
            .new_token(&redeemed.client_id, &redeemed.scope)
            .or_server_error("Failed to sign access token")?;

        Ok(AccessTokenResponse {
            access_token,
            token_type: TokenService::token_type(),
            expires_in: self.token.lifetime().as_secs(),
            scope: redeemed.scope,
        })
    }
}
