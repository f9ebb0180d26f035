use crate::auth::Redirect;
use crate::core::types::RedirectUri;

use tracing::{event, Level};
use url::Url;
use warp::http::{header, HeaderValue, StatusCode};
use warp::reply::{Reply, Response};

fn append_params(uri: &RedirectUri, params: impl serde::Serialize) -> Option<Url> {
    let mut url = Url::parse(&uri.0).ok()?;
    let encoded = serde_urlencoded::to_string(params).ok()?;
    let pairs = form_urlencoded::parse(encoded.as_bytes());
    url.query_pairs_mut().extend_pairs(pairs);
    Some(url)
}

impl<T: serde::Serialize + Send> Reply for Redirect<T> {
    fn into_response(self) -> Response {
        let location = append_params(&self.uri, &self.params)
            .and_then(|url| HeaderValue::from_str(url.as_str()).ok());

        match location {
            Some(location) => {
                let mut response = Response::new(warp::hyper::Body::empty());
                *response.status_mut() = StatusCode::FOUND;
                response.headers_mut().insert(header::LOCATION, location);
                response
            }
            None => {
                event!(Level::ERROR, uri = %self.uri, "Failed to build redirect location");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
