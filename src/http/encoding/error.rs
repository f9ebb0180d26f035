use crate::auth::{ErrorKind, ErrorResponse};
use warp::http::StatusCode;
use warp::reject::{LengthRequired, PayloadTooLarge};
use warp::reply::{Reply, Response};
use warp::Rejection;

#[derive(Debug, Clone, Copy)]
pub struct AuthRejection {
    pub kind: ErrorKind,
}

impl warp::reject::Reject for AuthRejection {}

impl From<ErrorKind> for AuthRejection {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    if kind.is_server_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    }
}

pub fn error_response(kind: ErrorKind) -> Response {
    let body = warp::reply::json(&ErrorResponse::from(kind));
    warp::reply::with_status(body, status_for(kind)).into_response()
}

pub async fn handle_reject(err: Rejection) -> Result<Response, Rejection> {
    if let Some(rejection) = err.find::<AuthRejection>() {
        return Ok(error_response(rejection.kind));
    }

    if err.find::<PayloadTooLarge>().is_some() || err.find::<LengthRequired>().is_some() {
        return Ok(error_response(ErrorKind::InvalidRequest));
    }

    Err(err)
}
