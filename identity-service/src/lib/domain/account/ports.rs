use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::ChangePasswordCommand;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::NewAccount;
use crate::account::models::RegisterCommand;
use crate::account::models::TokenGrant;
use crate::account::models::Username;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account and issue its first token.
    ///
    /// # Arguments
    /// * `command` - Validated username and email, raw password
    ///
    /// # Returns
    /// The created account and a token bound to its id
    ///
    /// # Errors
    /// * `WeakPassword` - Password shorter than 8 characters; nothing is stored
    /// * `UsernameAlreadyExists` / `EmailAlreadyExists` - Identity taken
    /// * `Password` / `Token` / `DatabaseError` - Internal failures
    async fn register(&self, command: RegisterCommand) -> Result<TokenGrant, AccountError>;

    /// Authenticate with an identifier and password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier or wrong password, indistinguishably
    /// * `Password` / `Token` / `DatabaseError` - Internal failures
    async fn login(&self, command: LoginCommand) -> Result<TokenGrant, AccountError>;

    /// Re-issue a token from a still-valid one, without a password check.
    ///
    /// # Returns
    /// A new token with a fresh expiry for the same account
    ///
    /// # Errors
    /// * `Unauthorized` - Token is forged, malformed, expired, or its account is gone
    /// * `Token` / `DatabaseError` - Internal failures
    async fn refresh(&self, token: &str) -> Result<String, AccountError>;

    /// Read the profile of an authorized account.
    ///
    /// # Errors
    /// * `NotFound` - Account vanished from the store
    /// * `DatabaseError` - Database operation failed
    async fn get_profile(&self, id: AccountId) -> Result<Account, AccountError>;

    /// Replace the password of an authorized account.
    ///
    /// `id` must come from the authorization gate, never from client input.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Old password does not match
    /// * `WeakPassword` - New password shorter than 8 characters
    /// * `NotFound` - Account vanished from the store
    /// * `Password` / `DatabaseError` - Internal failures
    async fn change_password(
        &self,
        id: AccountId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError>;
}

/// Persistence operations for the account aggregate.
///
/// Implementations own uniqueness of usernames and emails and must make each
/// call atomic on its own row.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account and return it with its assigned id.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: NewAccount) -> Result<Account, AccountError>;

    /// Retrieve account by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by username.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username)
        -> Result<Option<Account>, AccountError>;

    /// Retrieve account by email address.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError>;

    /// Overwrite the stored password hash.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_password_hash(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<(), AccountError>;
}
