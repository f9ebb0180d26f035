use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::auth::{RawAuthorizationRequest, RawConsentRequest, RawTokenRequest, Store};
use crate::core::types::SessionToken;
use crate::http::encoding::error::error_response;
use crate::http::encoding::{self, reply};
use crate::provider::OAuth2Provider;

pub fn oauth_endpoint<S: Store + 'static>(
    provider: Arc<OAuth2Provider<S>>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_provider = warp::any().map(move || provider.clone());

    // Consent prompt plus the session cookie that binds this browser to it.
    let authorize = warp::path("auth")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_provider.clone())
        .and(encoding::query::<RawAuthorizationRequest>())
        .and_then(|provider: Arc<OAuth2Provider<S>>, req| async move {
            let challenge = reply::accept(provider.authorization_request(req).await)?;
            let cookie = reply::session_cookie(&challenge.session, challenge.max_age);
            let prompt = warp::reply::json(&challenge.prompt);
            Ok::<_, Rejection>(warp::reply::with_header(prompt, "set-cookie", cookie))
        });

    let confirm = warp::path("confirm_auth")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_provider.clone())
        .and(warp::cookie::optional::<String>(reply::SESSION_COOKIE))
        .and(encoding::query::<RawConsentRequest>())
        .and_then(
            |provider: Arc<OAuth2Provider<S>>, session: Option<String>, req| async move {
                let session = session.map(SessionToken);
                // The cookie is single-shot whatever the outcome.
                let response = match provider.confirm_authorization(session, req).await {
                    Ok(redirect) => redirect.into_response(),
                    Err(kind) => error_response(kind),
                };
                Ok::<_, Rejection>(warp::reply::with_header(
                    response,
                    "set-cookie",
                    reply::expired_session_cookie(),
                ))
            },
        );

    // Either a direct success or a direct error
    let token = warp::path("token")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_provider)
        .and(encoding::basic_credentials())
        .and(encoding::token_request())
        .and_then(
            |provider: Arc<OAuth2Provider<S>>, credentials, req: RawTokenRequest| async move {
                let result = provider
                    .access_token_request(req.with_credentials(credentials))
                    .await;
                let response = reply::json_encode(result)?;
                let response = warp::reply::with_header(response, "cache-control", "no-store");
                Ok::<_, Rejection>(warp::reply::with_header(response, "pragma", "no-cache"))
            },
        );

    authorize.or(confirm).or(token)
}
