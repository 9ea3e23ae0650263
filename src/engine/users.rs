use tracing::debug;

use crate::model::{Actor, NewUser, User, UserPatch};

use super::{policy, Engine, EngineError, Entity};

impl Engine {
    /// Register an account. The credential arrives pre-hashed — hashing is
    /// the Authenticator's concern, not the engine's.
    pub async fn register_user(&self, new: NewUser) -> Result<User, EngineError> {
        if self
            .store
            .username_or_email_taken(&new.username, &new.email)
            .await?
        {
            return Err(EngineError::AlreadyExists("username or email already exists"));
        }

        let user = User {
            id: ulid::Ulid::new(),
            name: new.name,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
        };
        self.store.insert_user(user.clone()).await?;
        debug!(user = %user.id, username = %user.username, role = %user.role, "user registered");
        Ok(user)
    }

    /// Admin-only lookup by username.
    pub async fn get_user(&self, actor: &Actor, username: &str) -> Result<User, EngineError> {
        policy::require_admin(actor, "not enough permissions")?;
        self.store
            .get_user_by_username(username)
            .await?
            .ok_or(EngineError::NotFound(Entity::User))
    }

    /// Admin-only: full profiles of every user.
    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<User>, EngineError> {
        policy::require_admin(actor, "not enough permissions")?;
        Ok(self.store.list_users().await?)
    }

    /// Partial profile update. The target user themself or an admin; the
    /// role field is admin-only even on a self-edit.
    pub async fn update_user(
        &self,
        actor: &Actor,
        username: &str,
        patch: UserPatch,
    ) -> Result<User, EngineError> {
        let mut user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(EngineError::NotFound(Entity::User))?;

        if actor.id != user.id {
            policy::require_admin(actor, "not allowed to update this user")?;
        }
        if patch.role.is_some() && !policy::may_change_role(actor) {
            return Err(EngineError::Forbidden("not allowed to change role"));
        }

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        self.store.update_user(user.clone()).await?;
        Ok(user)
    }

    /// Admin-only forced credential reset. The new hash is opaque here.
    pub async fn reset_password(
        &self,
        actor: &Actor,
        username: &str,
        new_hash: String,
    ) -> Result<(), EngineError> {
        policy::require_admin(actor, "not enough permissions")?;
        let mut user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(EngineError::NotFound(Entity::User))?;
        user.password_hash = new_hash;
        self.store.update_user(user).await?;
        debug!(username = %username, "password reset");
        Ok(())
    }

    /// Admin-only, irreversible. The repository cascades to the user's
    /// bookings and reviews.
    pub async fn delete_user(&self, actor: &Actor, username: &str) -> Result<(), EngineError> {
        policy::require_admin(actor, "not enough permissions")?;
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(EngineError::NotFound(Entity::User))?;
        self.store.delete_user(user.id).await?;
        debug!(user = %user.id, username = %username, "user deleted");
        Ok(())
    }
}
