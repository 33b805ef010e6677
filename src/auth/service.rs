//! Registration and login flows

use std::sync::Arc;

use crate::auth::issuer::{bearer, SessionIssuer};
use crate::auth::models::{Account, LoginRequest, RegisterRequest, Role};
use crate::auth::password;
use crate::error::{Error, Result};
use crate::store::{AdminRequest, ProfileRequest, Store};

fn require_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::Validation("password is required".to_string()));
    }
    password::check_length(password)
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    issuer: SessionIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, issuer: SessionIssuer) -> Self {
        Self { store, issuer }
    }

    pub fn issuer(&self) -> &SessionIssuer {
        &self.issuer
    }

    /// Create a customer profile and its login. Returns the account record;
    /// no token is issued here, the client logs in afterwards.
    pub async fn register(&self, req: RegisterRequest) -> Result<Account> {
        let profile = ProfileRequest {
            fullname: req.fullname,
            email: req.email,
            phone: req.phone,
        };
        profile.validate()?;
        require_password(&req.password)?;
        self.ensure_email_free(&profile.email).await?;

        let account = self
            .open_account(Role::Customer, profile, req.password)
            .await?;

        tracing::info!(
            "Registered customer {} with account {}",
            account.linked_entity_id,
            account.id
        );
        Ok(account)
    }

    /// Create an admin profile, plus a login when a password is supplied.
    /// Returns the new admin id.
    pub async fn create_admin(&self, req: AdminRequest) -> Result<i64> {
        req.profile.validate()?;
        let Some(password) = req.password else {
            return self.store.create_admin(req.profile).await;
        };

        require_password(&password)?;
        self.ensure_email_free(&req.profile.email).await?;
        let account = self.open_account(Role::Admin, req.profile, password).await?;
        tracing::info!(
            "Opened admin account {} for admin {}",
            account.id,
            account.linked_entity_id
        );
        Ok(account.linked_entity_id)
    }

    /// Check credentials and mint a token. Unknown email and wrong password
    /// fail identically.
    pub async fn login(&self, req: LoginRequest) -> Result<String> {
        let Some(account) = self.store.find_account_by_email(&req.email).await? else {
            tracing::debug!("Login rejected: no account");
            return Err(Error::InvalidCredentials);
        };

        let verified =
            password::verify_password_blocking(account.password_hash.clone(), req.password)
                .await?;
        if !verified {
            tracing::debug!("Login rejected for account {}", account.id);
            return Err(Error::InvalidCredentials);
        }

        let token = self
            .issuer
            .issue_token(account.linked_entity_id, account.role)?;
        tracing::info!("Account {} logged in as {}", account.id, account.role);
        Ok(bearer(&token))
    }

    async fn ensure_email_free(&self, email: &str) -> Result<()> {
        if self.store.find_account_by_email(email).await?.is_some() {
            return Err(Error::Conflict("Email is already registered".to_string()));
        }
        Ok(())
    }

    /// Hash first, then write the profile and its account in one store call
    async fn open_account(
        &self,
        role: Role,
        profile: ProfileRequest,
        password: String,
    ) -> Result<Account> {
        let password_hash = password::hash_password_blocking(password).await?;
        self.store
            .create_profile_with_account(role, profile, password_hash)
            .await
    }
}
