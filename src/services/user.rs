//! User business logic

use anyhow::Context;
use std::sync::Arc;
use validator::Validate;

use crate::auth::{Credential, JwtService, PasswordService};
use crate::database::models::{LoginInput, NewUser, RegisterInput, UpdateUserInput, User};
use crate::error::{AppError, Result};
use crate::services::authenticate;
use crate::store::{StoreError, UserStore};

pub struct UserService {
    store: Arc<dyn UserStore>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordService,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        jwt_service: Arc<JwtService>,
        hasher: PasswordService,
    ) -> Self {
        Self {
            store,
            jwt_service,
            hasher,
        }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<User> {
        input.validate()?;

        let password = input.password.unwrap_or_default();
        let password_hash = self.hash_password(password).await?;
        let new_user = NewUser {
            name: input.name.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            address: input.address.unwrap_or_default(),
            phone: input.phone.unwrap_or_default(),
            password_hash,
        };

        let user = self
            .store
            .insert(&new_user)
            .await
            .map_err(|e| AppError::from_store(e, "user"))?;

        tracing::info!("registered user {}", user.id);
        Ok(user)
    }

    /// Verify credentials and issue a token
    pub async fn login(&self, input: LoginInput) -> Result<(String, User)> {
        input.validate()?;
        let email = input.email.unwrap_or_default();
        let password = input.password.unwrap_or_default();

        let user = self.store.find_by_email(&email).await.map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound("user not found".to_string()),
            other => AppError::from_store(other, "user"),
        })?;

        if !self.verify_password(password, user.password_hash.clone()).await? {
            tracing::warn!("password mismatch for user {}", user.id);
            return Err(AppError::Unauthenticated("password mismatch".to_string()));
        }

        let token = self.jwt_service.issue(user.id)?;
        Ok((token, user))
    }

    pub async fn profile(&self, credential: &Credential) -> Result<User> {
        let principal = authenticate(credential)?;

        let mut user = self
            .store
            .find_by_id(principal.user_id())
            .await
            .map_err(|e| AppError::from_store(e, "user"))?;
        user.id = principal.user_id();
        Ok(user)
    }

    pub async fn update(&self, credential: &Credential, input: UpdateUserInput) -> Result<User> {
        let principal = authenticate(credential)?;

        let password_hash = match input.password.as_deref() {
            Some(password) if !password.is_empty() => {
                Some(self.hash_password(password.to_string()).await?)
            }
            _ => None,
        };
        let changes = input.into_changes(password_hash);

        let mut user = self
            .store
            .update(principal.user_id(), &changes)
            .await
            .map_err(|e| AppError::from_store(e, "user"))?;
        user.id = principal.user_id();
        Ok(user)
    }

    /// Permanently remove the caller's account
    pub async fn deactivate(&self, credential: &Credential) -> Result<()> {
        let principal = authenticate(credential)?;

        self.store
            .delete(principal.user_id())
            .await
            .map_err(|e| AppError::from_store(e, "user"))?;

        tracing::info!("deactivated user {}", principal.user_id());
        Ok(())
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")??;
        Ok(digest)
    }

    async fn verify_password(&self, password: String, digest: String) -> Result<bool> {
        let hasher = self.hasher.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .context("password verification task failed")?;
        Ok(matches)
    }
}
