use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{event, Level};
use warp::{Filter, Rejection, Reply};

use crate::auth::Store;
use crate::provider::OAuth2Provider;

mod endpoints;

use endpoints::oauth::oauth_endpoint;

use super::encoding::error::handle_reject;

/// Every route the service exposes, with error recovery and access logging.
pub fn routes<S: Store + 'static>(
    provider: Arc<OAuth2Provider<S>>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    oauth_endpoint(provider)
        .recover(handle_reject)
        .with(warp::log("authorization-service"))
}

#[derive(Debug)]
pub struct Server<S> {
    provider: Arc<OAuth2Provider<S>>,
}

impl<S: Store + 'static> Server<S> {
    pub fn new(provider: Arc<OAuth2Provider<S>>) -> Self {
        Self { provider }
    }

    pub async fn serve(self, addr: SocketAddr) {
        event!(Level::INFO, %addr, "Listening");
        warp::serve(routes(self.provider)).run(addr).await;
    }
}
