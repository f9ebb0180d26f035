use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::auth::{AuthorizationCodeStore, ClientRegistry, Redemption};
use crate::core::models::{Client, Decision, PendingAuthorization, RedeemableCode, RedeemedCode};
use crate::core::types::{ClientId, HashedAuthCode, RedirectUri, SessionToken, Timestamp};
use crate::provider::error::Error;
use crate::util::hash::HashingService;

use tracing::{event, Level};

#[derive(Debug)]
struct ClientRecord {
    client: Client,
    code: Option<RedeemableCode>,
}

#[derive(Debug, Default)]
struct State {
    clients: HashMap<ClientId, ClientRecord>,
    pending: HashMap<SessionToken, PendingAuthorization>,
}

/// Process-local store. Every operation runs under one lock, which makes
/// each transition atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, Error> {
        self.state
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))
    }

    /// Inserts or replaces a client. Replacing drops any outstanding code.
    pub fn put_client(&self, client: Client) -> Result<(), Error> {
        let mut state = self.lock()?;
        state
            .clients
            .insert(client.id.clone(), ClientRecord { client, code: None });
        Ok(())
    }

    pub fn pending_count(&self) -> Result<usize, Error> {
        Ok(self.lock()?.pending.len())
    }
}

#[async_trait::async_trait]
impl ClientRegistry for MemoryStore {
    async fn get_client(&self, client_id: &ClientId) -> Result<Option<Client>, Error> {
        let state = self.lock()?;
        Ok(state.clients.get(client_id).map(|r| r.client.clone()))
    }
}

#[async_trait::async_trait]
impl AuthorizationCodeStore for MemoryStore {
    async fn create_pending(&self, pending: PendingAuthorization) -> Result<SessionToken, Error> {
        let mut state = self.lock()?;
        if state.pending.contains_key(&pending.session) {
            return Err(Error::Storage("session token collision".to_string()));
        }
        let session = pending.session.clone();
        state.pending.insert(session.clone(), pending);
        Ok(session)
    }

    async fn resolve_pending(
        &self,
        session: &SessionToken,
        now: Timestamp,
    ) -> Result<Option<PendingAuthorization>, Error> {
        let state = self.lock()?;
        Ok(state
            .pending
            .get(session)
            .filter(|p| !p.is_expired(now))
            .cloned())
    }

    async fn finalize(
        &self,
        session: &SessionToken,
        decision: Decision,
        now: Timestamp,
    ) -> Result<Option<PendingAuthorization>, Error> {
        let mut state = self.lock()?;

        let pending = match state.pending.remove(session) {
            Some(p) if !p.is_expired(now) => p,
            _ => return Ok(None),
        };

        if let Decision::Approve { code_invalid_after } = decision {
            let record = match state.clients.get_mut(&pending.client_id) {
                Some(record) => record,
                None => return Ok(None),
            };
            if record.code.as_ref().map_or(false, |c| !c.is_expired(now)) {
                event!(
                    Level::WARN,
                    client_id = %pending.client_id,
                    "Approval replaces an unredeemed code"
                );
            }
            record.code = Some(RedeemableCode {
                code: HashingService::hash_without_salt(&pending.code),
                client_id: pending.client_id.clone(),
                redirect_uri: pending.redirect_uri.clone(),
                scope: pending.scope.clone(),
                invalid_after: code_invalid_after,
            });
        }

        Ok(Some(pending))
    }

    async fn redeem(
        &self,
        client_id: &ClientId,
        code: &HashedAuthCode,
        redirect_uri: &RedirectUri,
        now: Timestamp,
    ) -> Result<Redemption, Error> {
        let mut state = self.lock()?;

        let slot = match state.clients.get_mut(client_id) {
            Some(record) => &mut record.code,
            None => return Ok(Redemption::NoLiveCode),
        };

        let outcome = match slot.as_ref() {
            None => Redemption::NoLiveCode,
            Some(stored) if stored.is_expired(now) => Redemption::NoLiveCode,
            Some(stored) if stored.code != *code => Redemption::CodeMismatch,
            Some(stored) if stored.redirect_uri != *redirect_uri => Redemption::RedirectMismatch,
            Some(stored) => Redemption::Redeemed(RedeemedCode {
                client_id: stored.client_id.clone(),
                scope: stored.scope.clone(),
            }),
        };

        if let Redemption::Redeemed(_) = outcome {
            *slot = None;
        }

        Ok(outcome)
    }

    async fn clean_up(&self, now: Timestamp) -> Result<(), Error> {
        let mut state = self.lock()?;
        state.pending.retain(|_, p| !p.is_expired(now));
        for record in state.clients.values_mut() {
            if record.code.as_ref().map_or(false, |c| c.is_expired(now)) {
                record.code = None;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AuthCode, HashedClientSecret, Scope};
    use std::time::Duration;

    fn client(id: &str) -> Client {
        Client {
            id: ClientId(id.to_string()),
            name: id.to_string(),
            website: format!("https://{}.example", id),
            logo: format!("https://{}.example/logo.png", id),
            redirect_uri: RedirectUri(format!("https://{}.example/cb", id)),
            secret: HashedClientSecret("unused".to_string()),
        }
    }

    fn pending(session: &str, client_id: &str, now: Timestamp, lifetime: u64) -> PendingAuthorization {
        PendingAuthorization {
            session: SessionToken(session.to_string()),
            code: AuthCode(format!("code-{}", session)),
            client_id: ClientId(client_id.to_string()),
            redirect_uri: RedirectUri(format!("https://{}.example/cb", client_id)),
            scope: Scope::from_delimited_parts("read"),
            state: "xyz".to_string(),
            created_at: now,
            invalid_after: now.after(Duration::from_secs(lifetime)),
        }
    }

    fn approve(now: Timestamp) -> Decision {
        Decision::Approve {
            code_invalid_after: now.after(Duration::from_secs(600)),
        }
    }

    fn hashed(code: &str) -> HashedAuthCode {
        HashingService::hash_without_salt(&AuthCode(code.to_string()))
    }

    #[tokio::test]
    async fn finalize_consumes_the_pending_authorization() {
        let store = MemoryStore::new();
        store.put_client(client("acme")).unwrap();
        let now = Timestamp::now();
        let session = store.create_pending(pending("s1", "acme", now, 3600)).await.unwrap();

        assert!(store.finalize(&session, approve(now), now).await.unwrap().is_some());
        assert!(store.finalize(&session, approve(now), now).await.unwrap().is_none());
        assert!(store.resolve_pending(&session, now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_pending_cannot_be_finalized() {
        let store = MemoryStore::new();
        store.put_client(client("acme")).unwrap();
        let now = Timestamp::now();
        let session = store.create_pending(pending("s1", "acme", now, 0)).await.unwrap();

        assert!(store.resolve_pending(&session, now).await.unwrap().is_none());
        assert!(store.finalize(&session, approve(now), now).await.unwrap().is_none());
        let redemption = store
            .redeem(&ClientId("acme".to_string()), &hashed("code-s1"), &RedirectUri("https://acme.example/cb".to_string()), now)
            .await
            .unwrap();
        assert_eq!(redemption, Redemption::NoLiveCode);
    }

    #[tokio::test]
    async fn denial_leaves_nothing_redeemable() {
        let store = MemoryStore::new();
        store.put_client(client("acme")).unwrap();
        let now = Timestamp::now();
        let session = store.create_pending(pending("s1", "acme", now, 3600)).await.unwrap();

        assert!(store.finalize(&session, Decision::Deny, now).await.unwrap().is_some());
        let redemption = store
            .redeem(&ClientId("acme".to_string()), &hashed("code-s1"), &RedirectUri("https://acme.example/cb".to_string()), now)
            .await
            .unwrap();
        assert_eq!(redemption, Redemption::NoLiveCode);
    }

    #[tokio::test]
    async fn redemption_is_single_use_and_bound() {
        let store = MemoryStore::new();
        store.put_client(client("acme")).unwrap();
        let now = Timestamp::now();
        let session = store.create_pending(pending("s1", "acme", now, 3600)).await.unwrap();
        store.finalize(&session, approve(now), now).await.unwrap();

        let acme = ClientId("acme".to_string());
        let uri = RedirectUri("https://acme.example/cb".to_string());

        let wrong_code = store.redeem(&acme, &hashed("guess"), &uri, now).await.unwrap();
        assert_eq!(wrong_code, Redemption::CodeMismatch);

        let other_uri = RedirectUri("https://acme.example/other".to_string());
        let wrong_uri = store.redeem(&acme, &hashed("code-s1"), &other_uri, now).await.unwrap();
        assert_eq!(wrong_uri, Redemption::RedirectMismatch);

        let first = store.redeem(&acme, &hashed("code-s1"), &uri, now).await.unwrap();
        assert!(matches!(first, Redemption::Redeemed(_)));

        let second = store.redeem(&acme, &hashed("code-s1"), &uri, now).await.unwrap();
        assert_eq!(second, Redemption::NoLiveCode);
    }

    #[tokio::test]
    async fn a_later_approval_supersedes_an_unredeemed_code() {
        let store = MemoryStore::new();
        store.put_client(client("acme")).unwrap();
        let now = Timestamp::now();
        let first = store.create_pending(pending("s1", "acme", now, 3600)).await.unwrap();
        let second = store.create_pending(pending("s2", "acme", now, 3600)).await.unwrap();
        store.finalize(&first, approve(now), now).await.unwrap();
        store.finalize(&second, approve(now), now).await.unwrap();

        let acme = ClientId("acme".to_string());
        let uri = RedirectUri("https://acme.example/cb".to_string());
        let stale = store.redeem(&acme, &hashed("code-s1"), &uri, now).await.unwrap();
        assert_eq!(stale, Redemption::CodeMismatch);
        let fresh = store.redeem(&acme, &hashed("code-s2"), &uri, now).await.unwrap();
        assert!(matches!(fresh, Redemption::Redeemed(_)));
    }

    #[tokio::test]
    async fn expired_codes_are_not_redeemable() {
        let store = MemoryStore::new();
        store.put_client(client("acme")).unwrap();
        let now = Timestamp::now();
        let session = store.create_pending(pending("s1", "acme", now, 3600)).await.unwrap();
        store
            .finalize(&session, Decision::Approve { code_invalid_after: now }, now)
            .await
            .unwrap();

        let redemption = store
            .redeem(&ClientId("acme".to_string()), &hashed("code-s1"), &RedirectUri("https://acme.example/cb".to_string()), now)
            .await
            .unwrap();
        assert_eq!(redemption, Redemption::NoLiveCode);
    }

    #[tokio::test]
    async fn clean_up_drops_expired_rows_only() {
        let store = MemoryStore::new();
        store.put_client(client("acme")).unwrap();
        let now = Timestamp::now();
        store.create_pending(pending("old", "acme", now, 0)).await.unwrap();
        let live = store.create_pending(pending("new", "acme", now, 3600)).await.unwrap();

        store.clean_up(now).await.unwrap();

        assert_eq!(store.pending_count().unwrap(), 1);
        assert!(store.resolve_pending(&live, now).await.unwrap().is_some());
    }
}
