use std::time::Duration;

use super::error::AuthRejection;
use crate::auth::ErrorKind;
use crate::core::types::SessionToken;
use warp::reply::{Reply, Response};
use warp::Rejection;

/// Cookie carrying the session token between `/auth` and `/confirm_auth`.
pub const SESSION_COOKIE: &str = "auth_request_session";

pub fn session_cookie(session: &SessionToken, max_age: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session.0,
        max_age.as_secs()
    )
}

pub fn expired_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    )
}

pub fn json_encode(value: Result<impl serde::Serialize, ErrorKind>) -> Result<Response, Rejection> {
    value
        .map(|v| warp::reply::json(&v).into_response())
        .map_err(|e| warp::reject::custom(AuthRejection::from(e)))
}

pub fn accept<T>(result: Result<T, ErrorKind>) -> Result<T, Rejection> {
    result.map_err(|e| warp::reject::custom(AuthRejection::from(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_locked_down() {
        let cookie = session_cookie(&SessionToken("abc".to_string()), Duration::from_secs(3600));
        assert_eq!(
            cookie,
            "auth_request_session=abc; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=3600"
        );
        assert!(expired_session_cookie().ends_with("Max-Age=0"));
    }
}
