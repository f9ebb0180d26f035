use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{event, Level};

use authorization_service::auth::Store;
use authorization_service::core::models::Client;
use authorization_service::db::MemoryStore;
use authorization_service::http::server::Server;
use authorization_service::provider::token::TokenService;
use authorization_service::provider::{Error, OAuth2Provider, ProviderConfig};
use authorization_service::util::cli::Options;
use authorization_service::util::hash::HashingService;

const CLEAN_UP_PERIOD: Duration = Duration::from_secs(60);

struct Parts {
    hasher: HashingService,
    token: TokenService,
    config: ProviderConfig,
    seed: Option<Client>,
}

async fn serve<S: Store + 'static>(provider: OAuth2Provider<S>, addr: SocketAddr) {
    let provider = Arc::new(provider);
    tokio::spawn(provider.clone().start_clean_up_worker(CLEAN_UP_PERIOD));
    Server::new(provider).serve(addr).await;
}

#[cfg(feature = "postgres")]
async fn serve_database(url: &str, parts: Parts, addr: SocketAddr) -> Result<(), Error> {
    use authorization_service::db::DbStore;

    let store = DbStore::acquire(url)?;
    store.migrate()?;
    if let Some(client) = parts.seed {
        store.put_client(client)?;
    }

    serve(OAuth2Provider::new(store, parts.hasher, parts.token, parts.config), addr).await;
    Ok(())
}

#[cfg(not(feature = "postgres"))]
async fn serve_database(_url: &str, _parts: Parts, _addr: SocketAddr) -> Result<(), Error> {
    Err(Error::Config(
        "DATABASE_URL is set but this build has no postgres support".to_string(),
    ))
}

async fn serve_memory(parts: Parts, addr: SocketAddr) -> Result<(), Error> {
    event!(Level::WARN, "No DATABASE_URL, state is kept in memory");

    let store = MemoryStore::new();
    if let Some(client) = parts.seed {
        store.put_client(client)?;
    }

    serve(OAuth2Provider::new(store, parts.hasher, parts.token, parts.config), addr).await;
    Ok(())
}

async fn authd(opts: Options) -> Result<(), Error> {
    let config = opts.provider_config();
    let hasher = opts.hashing_service()?;
    let token = TokenService::new(opts.signing_key()?, &config)?;

    let seed = match opts.seed_client(&hasher)? {
        Some(seed) => {
            if let Some(secret) = &seed.generated_secret {
                println!("Seeded client {} with secret {}", seed.client.id, secret.0);
            }
            event!(Level::INFO, client_id = %seed.client.id, "Seeding client");
            Some(seed.client)
        }
        None => None,
    };

    let parts = Parts {
        hasher,
        token,
        config,
        seed,
    };

    match &opts.database_url {
        Some(url) => serve_database(url, parts, opts.listen_addr).await,
        None => serve_memory(parts, opts.listen_addr).await,
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let opts = Options::parse();
    if let Err(e) = authd(opts).await {
        event!(Level::ERROR, error = %e, "Failed to start");
        std::process::exit(1);
    }
}
