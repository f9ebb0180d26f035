pub mod error;
pub mod reply;

use crate::auth::{ClientCredentials, ErrorKind, RawTokenRequest};
use http_basic_auth::Credential as BasicCredentials;
use warp::hyper::body::Bytes;
use warp::{Filter, Rejection};

use self::error::AuthRejection;

/// Upper bound on `/token` request bodies.
pub const BODY_LIMIT: u64 = 16 * 1024;

impl From<BasicCredentials> for ClientCredentials {
    fn from(credentials: BasicCredentials) -> Self {
        Self {
            client_id: credentials.user_id,
            client_secret: credentials.password,
        }
    }
}

fn invalid_request() -> Rejection {
    warp::reject::custom(AuthRejection::from(ErrorKind::InvalidRequest))
}

/// Query parameters, treating an absent query string as empty.
pub fn query<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send + 'static,
{
    warp::query::raw()
        .or(warp::any().map(String::new))
        .unify()
        .and_then(|raw: String| async move {
            serde_urlencoded::from_str::<T>(&raw).map_err(|_| invalid_request())
        })
}

/// Client credentials from `Authorization: Basic`, if present and well formed.
pub fn basic_credentials(
) -> impl Filter<Extract = (Option<ClientCredentials>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").map(|value: Option<String>| {
        value
            .and_then(|v| v.parse::<BasicCredentials>().ok())
            .map(ClientCredentials::from)
    })
}

/// A `/token` body, JSON when declared as such and form-encoded otherwise.
pub fn token_request() -> impl Filter<Extract = (RawTokenRequest,), Error = Rejection> + Clone {
    warp::body::content_length_limit(BODY_LIMIT)
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
        .and_then(|content_type: Option<String>, body: Bytes| async move {
            let is_json = content_type
                .map(|ct| ct.trim_start().starts_with("application/json"))
                .unwrap_or(false);

            let parsed = if is_json {
                serde_json::from_slice::<RawTokenRequest>(&body).ok()
            } else {
                serde_urlencoded::from_bytes::<RawTokenRequest>(&body).ok()
            };

            parsed.ok_or_else(invalid_request)
        })
}
