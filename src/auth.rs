use async_trait::async_trait;
use dashmap::DashMap;

use crate::engine::EngineError;
use crate::model::Actor;

/// Credential and token mechanics live behind this seam. The engine itself
/// only ever sees resolved [`Actor`]s.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange credentials for an actor identity.
    async fn login(&self, username: &str, password: &str) -> Result<Actor, EngineError>;

    /// Resolve a bearer token to the current actor.
    async fn resolve(&self, token: &str) -> Result<Actor, EngineError>;
}

/// Table-backed authenticator for embedding and tests. A real deployment
/// puts its password-hash/JWT stack behind the same trait.
#[derive(Default)]
pub struct TokenAuthenticator {
    /// username → (shared secret, actor)
    credentials: DashMap<String, (String, Actor)>,
    tokens: DashMap<String, Actor>,
}

impl TokenAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, username: impl Into<String>, secret: impl Into<String>, actor: Actor) {
        self.credentials.insert(username.into(), (secret.into(), actor));
    }

    pub fn issue(&self, token: impl Into<String>, actor: Actor) {
        self.tokens.insert(token.into(), actor);
    }

    pub fn revoke(&self, token: &str) {
        self.tokens.remove(token);
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn login(&self, username: &str, password: &str) -> Result<Actor, EngineError> {
        match self.credentials.get(username) {
            Some(entry) if entry.value().0 == password => Ok(entry.value().1),
            _ => Err(EngineError::Unauthorized),
        }
    }

    async fn resolve(&self, token: &str) -> Result<Actor, EngineError> {
        self.tokens
            .get(token)
            .map(|e| *e.value())
            .ok_or(EngineError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use ulid::Ulid;

    #[tokio::test]
    async fn login_checks_secret() {
        let auth = TokenAuthenticator::new();
        let actor = Actor::new(Ulid::new(), Role::Regular);
        auth.register("alice", "s3cret", actor);

        assert_eq!(auth.login("alice", "s3cret").await.unwrap(), actor);
        assert!(matches!(
            auth.login("alice", "wrong").await,
            Err(EngineError::Unauthorized)
        ));
        assert!(matches!(
            auth.login("bob", "s3cret").await,
            Err(EngineError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn resolve_and_revoke() {
        let auth = TokenAuthenticator::new();
        let actor = Actor::new(Ulid::new(), Role::Admin);
        auth.issue("tok-1", actor);

        assert_eq!(auth.resolve("tok-1").await.unwrap(), actor);
        auth.revoke("tok-1");
        assert!(matches!(
            auth.resolve("tok-1").await,
            Err(EngineError::Unauthorized)
        ));
    }
}
