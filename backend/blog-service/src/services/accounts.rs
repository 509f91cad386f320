/// Account registration, verification, login and profile management
use crate::db::{AccountRepository, PostRepository};
use crate::error::{AppError, Result};
use crate::models::{
    Account, AccountProfile, NewAccount, ProfileChanges, PublicAccount, SignupRequest,
    ToggleOutcome,
};
use crate::services::email::EmailService;
use crate::services::media::{delete_best_effort, MediaStore};
use crypto_core::jwt::{JwtManager, TokenKind};
use crypto_core::password::{hash_password, verify_password};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    AlreadyVerified,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: AccountProfile,
}

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    posts: Arc<dyn PostRepository>,
    media: Arc<dyn MediaStore>,
    email: Arc<EmailService>,
    jwt: Arc<JwtManager>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        posts: Arc<dyn PostRepository>,
        media: Arc<dyn MediaStore>,
        email: Arc<EmailService>,
        jwt: Arc<JwtManager>,
    ) -> Self {
        Self {
            accounts,
            posts,
            media,
            email,
            jwt,
        }
    }

    /// Create an unverified account and send its verification link.
    ///
    /// Mail delivery failure is logged; the account still exists and the
    /// caller gets a success response.
    pub async fn register(&self, request: SignupRequest) -> Result<PublicAccount> {
        let request = request.normalized();
        request.validate()?;
        validate_username(&request.username)?;

        if self.accounts.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if self
            .accounts
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = hash_password(&request.password)?;

        let account = self
            .accounts
            .create(NewAccount {
                name: request.name,
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %account.id, username = %account.username, "account registered");

        let token = self
            .jwt
            .issue(TokenKind::EmailVerification, account.id, &account.email)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if let Err(e) = self
            .email
            .send_verification_email(&account.email, &account.name, &token)
            .await
        {
            tracing::warn!(user_id = %account.id, error = %e, "verification email not delivered");
        }

        Ok(PublicAccount::from(&account))
    }

    /// Flip the verification flag of the account named by a verification token
    pub async fn verify(&self, token: &str) -> Result<VerifyOutcome> {
        let claims = self
            .jwt
            .validate(token, TokenKind::EmailVerification)
            .map_err(|e| {
                tracing::debug!(error = %e, "verification token rejected");
                AppError::Validation("Invalid or expired verification link".to_string())
            })?;

        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Validation("Invalid or expired verification link".to_string()))?;

        let account = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !account.email.eq_ignore_ascii_case(&claims.email) {
            return Err(AppError::Validation(
                "Invalid or expired verification link".to_string(),
            ));
        }

        if account.is_verified || !self.accounts.mark_verified(user_id).await? {
            return Ok(VerifyOutcome::AlreadyVerified);
        }

        tracing::info!(user_id = %user_id, "email verified");
        Ok(VerifyOutcome::Verified)
    }

    /// Check credentials and issue a session token.
    ///
    /// The verification state is only revealed once the password matched.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(password, &account.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        if !account.is_verified {
            return Err(AppError::Forbidden(
                "Please verify your email before logging in".to_string(),
            ));
        }

        let token = self
            .jwt
            .issue(TokenKind::Session, account.id, &account.email)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let user = self.profile_of(&account, true).await?;

        tracing::info!(user_id = %account.id, "login succeeded");
        Ok(LoginOutcome { token, user })
    }

    pub async fn list(&self) -> Result<Vec<PublicAccount>> {
        let accounts = self.accounts.list().await?;
        Ok(accounts.iter().map(PublicAccount::from).collect())
    }

    /// Profile by username; hidden lists are only shown to their owner
    pub async fn get_by_username(
        &self,
        username: &str,
        viewer: Option<Uuid>,
    ) -> Result<AccountProfile> {
        let account = self
            .accounts
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let is_self = viewer == Some(account.id);
        self.profile_of(&account, is_self).await
    }

    pub async fn update_profile(
        &self,
        caller: Uuid,
        target: Uuid,
        changes: ProfileChanges,
    ) -> Result<AccountProfile> {
        if caller != target {
            return Err(AppError::Forbidden(
                "You can only update your own account".to_string(),
            ));
        }

        let changes = ProfileChanges {
            name: changes.name.map(|n| n.trim().to_string()),
            ..changes
        };
        if matches!(changes.name.as_deref(), Some("")) {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }
        if changes.name.as_ref().is_some_and(|n| n.chars().count() > 100) {
            return Err(AppError::Validation(
                "Name must be at most 100 characters".to_string(),
            ));
        }

        let account = if changes.is_empty() {
            self.find(target).await?
        } else {
            self.accounts.update_profile(target, &changes).await?
        };

        self.profile_of(&account, true).await
    }

    /// Remove an account together with its posts and their images
    pub async fn delete(&self, caller: Uuid, target: Uuid) -> Result<()> {
        if caller != target {
            return Err(AppError::Forbidden(
                "You can only delete your own account".to_string(),
            ));
        }

        self.find(target).await?;
        let images = self.posts.remote_images_for_owner(target).await?;

        if !self.accounts.delete(target).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        delete_best_effort(self.media.as_ref(), &images).await;

        tracing::info!(user_id = %target, images = images.len(), "account deleted");
        Ok(())
    }

    pub async fn toggle_follow(&self, caller: Uuid, target: Uuid) -> Result<ToggleOutcome> {
        if caller == target {
            return Err(AppError::Validation("You cannot follow yourself".to_string()));
        }

        self.find(target).await?;
        self.accounts.toggle_follow(caller, target).await
    }

    async fn find(&self, id: Uuid) -> Result<Account> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn profile_of(&self, account: &Account, is_self: bool) -> Result<AccountProfile> {
        let relations = self.accounts.relations(account.id).await?;
        Ok(AccountProfile::new(account, relations, is_self))
    }
}

/// Usernames are 3-30 characters of ASCII letters, digits and underscores
pub fn validate_username(username: &str) -> Result<()> {
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_chars {
        return Err(AppError::Validation(
            "Username may only contain letters, digits and underscores".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_charset() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("alice!").is_err());
        assert!(validate_username("ålice").is_err());
    }
}
