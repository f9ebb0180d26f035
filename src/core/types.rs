use std::{
    convert::TryInto,
    fmt,
    time::{Duration, SystemTime},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The only `response_type` accepted at the authorization endpoint.
pub const RESPONSE_TYPE_CODE: &str = "code";

/// The only `grant_type` accepted at the token endpoint.
pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";

/// Whitespace-delimited set of scope tokens, kept in request order.
#[derive(Debug, Clone, Eq, Default)]
pub struct Scope(Vec<String>);

impl Scope {
    pub fn from_parts(parts: Vec<String>) -> Self {
        let mut scope = Self(Vec::with_capacity(parts.len()));
        for part in parts {
            scope.push(part);
        }
        scope
    }

    pub fn from_delimited_parts(parts: &str) -> Self {
        Self::from_parts(parts.split_whitespace().map(ToString::to_string).collect())
    }

    fn push(&mut self, part: String) {
        if !part.is_empty() && !self.0.contains(&part) {
            self.0.push(part);
        }
    }

    pub fn as_joined(&self) -> String {
        self.0.join(" ")
    }

    pub fn as_parts(&self) -> Vec<String> {
        self.0.clone()
    }

    pub fn borrow_parts(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.iter().any(|s| s == scope)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        let mut lhs = self.as_parts();
        let mut rhs = other.as_parts();
        lhs.sort();
        rhs.sort();
        lhs == rhs
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parts = String::deserialize(deserializer)?;
        Ok(Self::from_delimited_parts(&parts))
    }
}

impl Serialize for Scope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_joined())
    }
}

/// Registry-assigned, immutable client identifier. Distinct from the
/// client's display name.
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl std::str::FromStr for ClientId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct RedirectUri(pub String);

impl fmt::Display for RedirectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
#[derive(serde::Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(pub String);

impl AsRef<str> for ClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret([redacted])")
    }
}

/// Argon2-encoded client secret as held by the registry.
#[derive(Clone, Eq, PartialEq)]
pub struct HashedClientSecret(pub String);

impl From<String> for HashedClientSecret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for HashedClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedClientSecret([redacted])")
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AuthCode(pub String);

impl AsRef<str> for AuthCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthCode([redacted])")
    }
}

/// Digest of an [`AuthCode`]; the only form a redeemable code is stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedAuthCode(pub String);

impl From<String> for HashedAuthCode {
    fn from(from: String) -> Self {
        Self(from)
    }
}

impl AsRef<str> for HashedAuthCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque lookup key binding a browser session to a pending authorization.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(pub String);

impl std::str::FromStr for SessionToken {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([redacted])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct TokenId(pub String);

/// Seconds since the Unix epoch, as stored alongside expiring records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();
        Self(secs.try_into().unwrap_or(i64::MAX))
    }

    pub fn after(self, lifetime: Duration) -> Self {
        let secs: i64 = lifetime.as_secs().try_into().unwrap_or(i64::MAX);
        Self(self.0.saturating_add(secs))
    }

    /// A record stamped with `invalid_after` is live strictly before that instant.
    pub fn has_passed(self, now: Timestamp) -> bool {
        self <= now
    }

    pub fn as_secs(self) -> u64 {
        self.0.try_into().unwrap_or(0)
    }
}

impl From<Timestamp> for i64 {
    fn from(t: Timestamp) -> i64 {
        t.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_keeps_request_order_and_drops_duplicates() {
        let scope = Scope::from_delimited_parts("read  write\tread ");
        assert_eq!(scope.borrow_parts(), &["read".to_string(), "write".to_string()]);
        assert_eq!(scope.as_joined(), "read write");
    }

    #[test]
    fn blank_scope_is_empty() {
        assert!(Scope::from_delimited_parts("   ").is_empty());
    }

    #[test]
    fn scope_equality_ignores_order() {
        assert_eq!(
            Scope::from_delimited_parts("a b"),
            Scope::from_delimited_parts("b a")
        );
    }

    #[test]
    fn zero_lifetime_is_already_expired() {
        let now = Timestamp::now();
        assert!(now.after(Duration::from_secs(0)).has_passed(now));
        assert!(!now.after(Duration::from_secs(60)).has_passed(now));
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let secret = ClientSecret("hunter2".to_string());
        assert!(!format!("{:?}", secret).contains("hunter2"));
        let code = AuthCode("abc".to_string());
        assert!(!format!("{:?}", code).contains("abc"));
    }
}
