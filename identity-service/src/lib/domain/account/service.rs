use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::ChangePasswordCommand;
use crate::account::models::Identifier;
use crate::account::models::LoginCommand;
use crate::account::models::NewAccount;
use crate::account::models::Password;
use crate::account::models::RegisterCommand;
use crate::account::models::TokenGrant;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;

/// Plaintext behind the decoy hash checked for unknown identifiers.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-identifiers";

/// Domain service implementation for account operations.
///
/// Registration, login, refresh and password change over an injected
/// repository and the shared [`Authenticator`].
pub struct AccountService<AR>
where
    AR: AccountRepository,
{
    repository: Arc<AR>,
    authenticator: Arc<Authenticator>,
    decoy_hash: OnceLock<String>,
}

impl<AR> AccountService<AR>
where
    AR: AccountRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `authenticator` - Credential hashing and token issuance
    pub fn new(repository: Arc<AR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
            decoy_hash: OnceLock::new(),
        }
    }

    /// Run one password verification that can never succeed, so a login for
    /// an unknown identifier costs as much as one with a wrong password.
    fn verify_decoy(&self, password: &str) {
        let decoy = self.decoy_hash.get_or_init(|| {
            self.authenticator
                .hash_password(DECOY_PASSWORD)
                .unwrap_or_default()
        });

        if let Err(e) = self.authenticator.verify_password(password, decoy) {
            tracing::debug!("Decoy verification failed: {}", e);
        }
    }

    fn issue_for(&self, account: &Account) -> Result<String, AccountError> {
        let user_id = account
            .id
            .to_claim()
            .map_err(|e| AccountError::Token(e.to_string()))?;

        self.authenticator
            .issue_token(user_id)
            .map_err(|e| AccountError::Token(e.to_string()))
    }

    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<Account>, AccountError> {
        match identifier {
            Identifier::Username(username) => self.repository.find_by_username(username).await,
            Identifier::Email(email) => self.repository.find_by_email(email).await,
        }
    }
}

#[async_trait]
impl<AR> AccountServicePort for AccountService<AR>
where
    AR: AccountRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<TokenGrant, AccountError> {
        let password = Password::new(command.password)?;
        let password_hash = self.authenticator.hash_password(password.as_str())?;

        let account = self
            .repository
            .create(NewAccount {
                username: command.username,
                email: command.email,
                password_hash,
                created_at: Utc::now(),
            })
            .await?;

        let token = self.issue_for(&account)?;

        tracing::info!(
            account_id = %account.id,
            username = %account.username,
            "Account registered"
        );

        Ok(TokenGrant { account, token })
    }

    async fn login(&self, command: LoginCommand) -> Result<TokenGrant, AccountError> {
        let Some(account) = self.find_by_identifier(&command.identifier).await? else {
            tracing::debug!(identifier = %command.identifier, "Login for unknown identifier");
            self.verify_decoy(&command.password);
            return Err(AccountError::InvalidCredentials);
        };

        let user_id = account
            .id
            .to_claim()
            .map_err(|e| AccountError::Token(e.to_string()))?;

        let result = self
            .authenticator
            .authenticate(&command.password, &account.password_hash, user_id)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::debug!(account_id = %account.id, "Login with wrong password");
                    AccountError::InvalidCredentials
                }
                AuthenticationError::PasswordError(err) => AccountError::Password(err.to_string()),
                AuthenticationError::JwtError(err) => AccountError::Token(err.to_string()),
            })?;

        Ok(TokenGrant {
            account,
            token: result.access_token,
        })
    }

    async fn refresh(&self, token: &str) -> Result<String, AccountError> {
        let claims = self
            .authenticator
            .validate_token(token)
            .map_err(|e| AccountError::Unauthorized(e.to_string()))?;

        let id = AccountId::try_from(claims.user_id)
            .map_err(|e| AccountError::Unauthorized(e.to_string()))?;

        // A valid signature is not enough: the account must still exist
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(AccountError::Unauthorized(format!(
                "account {} no longer exists",
                id
            )));
        }

        self.authenticator
            .issue_token(claims.user_id)
            .map_err(|e| AccountError::Token(e.to_string()))
    }

    async fn get_profile(&self, id: AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }

    async fn change_password(
        &self,
        id: AccountId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError> {
        // Always verify against the hash read here, never a cached one.
        // Two concurrent changes race; the last write wins.
        let account = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))?;

        if !self
            .authenticator
            .verify_password(&command.old_password, &account.password_hash)?
        {
            return Err(AccountError::InvalidCredentials);
        }

        let new_password = Password::new(command.new_password)?;
        let password_hash = self.authenticator.hash_password(new_password.as_str())?;

        self.repository
            .update_password_hash(id, &password_hash)
            .await?;

        tracing::info!(account_id = %id, "Password changed");

        Ok(())
    }
}
