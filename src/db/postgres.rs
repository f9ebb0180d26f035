use std::fmt::Debug;

use crate::auth::{AuthorizationCodeStore, ClientRegistry, Redemption};
use crate::core::models::{Client, Decision, PendingAuthorization, RedeemedCode};
use crate::core::types::{
    AuthCode, ClientId, HashedAuthCode, HashedClientSecret, RedirectUri, Scope, SessionToken,
    Timestamp,
};
use crate::provider::error::Error;
use crate::util::hash::HashingService;

use diesel::prelude::*;
use diesel::r2d2::{Builder as PoolBuilder, ConnectionManager, Pool, PooledConnection};
use tokio::task::block_in_place;
use tracing::{event, Level};

use super::models;
use super::schema;

diesel_migrations::embed_migrations!("migrations");

type PooledPg = PooledConnection<ConnectionManager<PgConnection>>;

/// Postgres-backed store. Each transition is one statement or one
/// transaction on a single pooled connection.
pub struct DbStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl DbStore {
    pub fn acquire(uri: &str) -> Result<Self, Error> {
        let pool = PoolBuilder::new()
            .max_size(10)
            .build(ConnectionManager::new(uri))
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledPg, Error> {
        Ok(self.pool.get()?)
    }

    pub fn migrate(&self) -> Result<(), Error> {
        let conn = self.conn()?;
        block_in_place(|| embedded_migrations::run(&*conn))
            .map_err(|e| Error::Storage(e.to_string()))?;
        event!(Level::INFO, "Ran migrations");
        Ok(())
    }

    /// Inserts or replaces a client. Replacing drops any outstanding code.
    pub fn put_client(&self, client: Client) -> Result<(), Error> {
        use schema::clients::dsl::{self, clients};

        let model = models::Client {
            client_id: client.id.0,
            name: client.name,
            website: client.website,
            logo: client.logo,
            redirect_uri: client.redirect_uri.0,
            secret_hash: client.secret.0,
            code: None,
            code_redirect_uri: None,
            code_scope: None,
            code_invalid_after: None,
        };

        let conn = self.conn()?;
        block_in_place(|| {
            diesel::insert_into(clients)
                .values(&model)
                .on_conflict(dsl::client_id)
                .do_update()
                .set((
                    dsl::name.eq(&model.name),
                    dsl::website.eq(&model.website),
                    dsl::logo.eq(&model.logo),
                    dsl::redirect_uri.eq(&model.redirect_uri),
                    dsl::secret_hash.eq(&model.secret_hash),
                    dsl::code.eq(None::<String>),
                    dsl::code_redirect_uri.eq(None::<String>),
                    dsl::code_scope.eq(None::<String>),
                    dsl::code_invalid_after.eq(None::<i64>),
                ))
                .execute(&*conn)
        })?;

        Ok(())
    }
}

impl Debug for DbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbStore").finish()
    }
}

impl From<models::PendingAuthorization> for PendingAuthorization {
    fn from(p: models::PendingAuthorization) -> Self {
        PendingAuthorization {
            session: SessionToken(p.session_token),
            code: AuthCode(p.code),
            client_id: ClientId(p.client_id),
            redirect_uri: RedirectUri(p.redirect_uri),
            scope: Scope::from_delimited_parts(&p.scope),
            state: p.state,
            created_at: Timestamp(p.created_at),
            invalid_after: Timestamp(p.invalid_after),
        }
    }
}

#[async_trait::async_trait]
impl ClientRegistry for DbStore {
    async fn get_client(&self, id: &ClientId) -> Result<Option<Client>, Error> {
        use schema::clients::dsl::clients;

        let conn = self.conn()?;
        let found = block_in_place(|| {
            clients
                .find(&id.0)
                .first::<models::Client>(&*conn)
                .optional()
        })?;

        Ok(found.map(|c| Client {
            id: ClientId(c.client_id),
            name: c.name,
            website: c.website,
            logo: c.logo,
            redirect_uri: RedirectUri(c.redirect_uri),
            secret: HashedClientSecret(c.secret_hash),
        }))
    }
}

#[async_trait::async_trait]
impl AuthorizationCodeStore for DbStore {
    async fn create_pending(&self, pending: PendingAuthorization) -> Result<SessionToken, Error> {
        use schema::pending_authorizations::dsl::pending_authorizations;

        let session = pending.session.clone();
        let model = models::PendingAuthorization {
            session_token: pending.session.0,
            code: pending.code.0,
            client_id: pending.client_id.0,
            redirect_uri: pending.redirect_uri.0,
            scope: pending.scope.as_joined(),
            state: pending.state,
            created_at: pending.created_at.into(),
            invalid_after: pending.invalid_after.into(),
        };

        let conn = self.conn()?;
        block_in_place(|| {
            diesel::insert_into(pending_authorizations)
                .values(&model)
                .execute(&*conn)
        })?;

        Ok(session)
    }

    async fn resolve_pending(
        &self,
        session: &SessionToken,
        now: Timestamp,
    ) -> Result<Option<PendingAuthorization>, Error> {
        use schema::pending_authorizations::dsl::{self, pending_authorizations};

        let conn = self.conn()?;
        let found = block_in_place(|| {
            pending_authorizations
                .find(&session.0)
                .filter(dsl::invalid_after.gt(now.0))
                .first::<models::PendingAuthorization>(&*conn)
                .optional()
        })?;

        Ok(found.map(Into::into))
    }

    async fn finalize(
        &self,
        session: &SessionToken,
        decision: Decision,
        now: Timestamp,
    ) -> Result<Option<PendingAuthorization>, Error> {
        use schema::clients::dsl::{self as clients_dsl, clients};
        use schema::pending_authorizations::dsl::pending_authorizations;

        let conn = self.conn()?;
        let taken = block_in_place(|| {
            conn.transaction::<_, diesel::result::Error, _>(|| {
                let removed = diesel::delete(pending_authorizations.find(&session.0))
                    .get_result::<models::PendingAuthorization>(&*conn)
                    .optional()?;

                let pending: PendingAuthorization = match removed {
                    Some(p) if p.invalid_after > now.0 => p.into(),
                    _ => return Ok(None),
                };

                if let Decision::Approve { code_invalid_after } = decision {
                    let live_code = clients
                        .find(&pending.client_id.0)
                        .select(clients_dsl::code_invalid_after)
                        .first::<Option<i64>>(&*conn)
                        .optional()?
                        .flatten()
                        .map_or(false, |invalid_after| invalid_after > now.0);
                    if live_code {
                        event!(
                            Level::WARN,
                            client_id = %pending.client_id,
                            "Approval replaces an unredeemed code"
                        );
                    }

                    let hashed = HashingService::hash_without_salt(&pending.code);
                    let updated = diesel::update(clients.find(&pending.client_id.0))
                        .set((
                            clients_dsl::code.eq(Some(hashed.0)),
                            clients_dsl::code_redirect_uri.eq(Some(pending.redirect_uri.0.clone())),
                            clients_dsl::code_scope.eq(Some(pending.scope.as_joined())),
                            clients_dsl::code_invalid_after.eq(Some(code_invalid_after.0)),
                        ))
                        .execute(&*conn)?;
                    if updated == 0 {
                        return Ok(None);
                    }
                }

                Ok(Some(pending))
            })
        })?;

        Ok(taken)
    }

    async fn redeem(
        &self,
        client_id: &ClientId,
        code: &HashedAuthCode,
        redirect_uri: &RedirectUri,
        now: Timestamp,
    ) -> Result<Redemption, Error> {
        use schema::clients::dsl::{self, clients};

        let conn = self.conn()?;

        // The conditional update is the redemption; concurrent callers race on
        // the row and at most one sees it.
        let redeemed = block_in_place(|| {
            diesel::update(
                clients
                    .find(&client_id.0)
                    .filter(dsl::code.eq(&code.0))
                    .filter(dsl::code_redirect_uri.eq(&redirect_uri.0))
                    .filter(dsl::code_invalid_after.gt(now.0)),
            )
            .set((
                dsl::code.eq(None::<String>),
                dsl::code_redirect_uri.eq(None::<String>),
                dsl::code_invalid_after.eq(None::<i64>),
            ))
            .returning(dsl::code_scope)
            .get_result::<Option<String>>(&*conn)
            .optional()
        })?;

        if let Some(scope) = redeemed {
            return Ok(Redemption::Redeemed(RedeemedCode {
                client_id: client_id.clone(),
                scope: Scope::from_delimited_parts(scope.as_deref().unwrap_or_default()),
            }));
        }

        let current = block_in_place(|| {
            clients
                .find(&client_id.0)
                .select((dsl::code, dsl::code_redirect_uri, dsl::code_invalid_after))
                .first::<(Option<String>, Option<String>, Option<i64>)>(&*conn)
                .optional()
        })?;

        let outcome = match current {
            Some((Some(stored), Some(stored_uri), Some(invalid_after)))
                if invalid_after > now.0 =>
            {
                if stored != code.0 {
                    Redemption::CodeMismatch
                } else if stored_uri != redirect_uri.0 {
                    Redemption::RedirectMismatch
                } else {
                    Redemption::NoLiveCode
                }
            }
            _ => Redemption::NoLiveCode,
        };

        Ok(outcome)
    }

    async fn clean_up(&self, now: Timestamp) -> Result<(), Error> {
        use schema::clients::dsl::{self as clients_dsl, clients};
        use schema::pending_authorizations::dsl::{self, pending_authorizations};

        let conn = self.conn()?;
        let (pending, codes) = block_in_place(|| {
            conn.transaction::<_, diesel::result::Error, _>(|| {
                let pending = diesel::delete(
                    pending_authorizations.filter(dsl::invalid_after.le(now.0)),
                )
                .execute(&*conn)?;
                let codes = diesel::update(
                    clients.filter(clients_dsl::code_invalid_after.le(now.0)),
                )
                .set((
                    clients_dsl::code.eq(None::<String>),
                    clients_dsl::code_redirect_uri.eq(None::<String>),
                    clients_dsl::code_scope.eq(None::<String>),
                    clients_dsl::code_invalid_after.eq(None::<i64>),
                ))
                .execute(&*conn)?;
                Ok((pending, codes))
            })
        })?;

        event!(Level::DEBUG, pending, codes, "Removed expired rows");
        Ok(())
    }
}
