use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::errors::AccountIdError;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordPolicyError;
use crate::account::errors::UsernameError;

/// Account aggregate entity.
///
/// Created once at registration. Only `password_hash` ever changes afterwards.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub email: Option<EmailAddress>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Account data before the store has assigned an id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: Username,
    pub email: Option<EmailAddress>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// Attach the id assigned by the store.
    pub fn with_id(self, id: AccountId) -> Account {
        Account {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}

/// Account unique identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Convert to the unsigned form carried in token claims.
    ///
    /// # Errors
    /// * `Negative` - Ids handed out by the store are never negative
    pub fn to_claim(self) -> Result<u64, AccountIdError> {
        u64::try_from(self.0).map_err(|_| AccountIdError::Negative(self.0))
    }
}

impl TryFrom<u64> for AccountId {
    type Error = AccountIdError;

    fn try_from(claim: u64) -> Result<Self, Self::Error> {
        i64::try_from(claim)
            .map(AccountId)
            .map_err(|_| AccountIdError::OutOfRange(claim))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that passed the strength policy.
///
/// Never persisted; only its hash is stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 8;

    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// What a client logs in with: an email address or a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Username(Username),
    Email(EmailAddress),
}

impl Identifier {
    /// Classify a raw login identifier. Usernames cannot contain `@`, so
    /// anything with one is treated as an email address.
    ///
    /// # Errors
    /// * `InvalidUsername` / `InvalidEmail` - Neither form is valid
    pub fn parse(raw: String) -> Result<Self, AccountError> {
        if raw.contains('@') {
            Ok(Self::Email(EmailAddress::new(raw)?))
        } else {
            Ok(Self::Username(Username::new(raw)?))
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Username(username) => username.fmt(f),
            Identifier::Email(email) => email.fmt(f),
        }
    }
}

/// Command to register a new account
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: Option<EmailAddress>,
    /// Raw password; strength is checked by the service before anything is hashed
    pub password: String,
}

impl RegisterCommand {
    pub fn new(username: Username, email: Option<EmailAddress>, password: String) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

/// Command to authenticate with an identifier and password
#[derive(Debug)]
pub struct LoginCommand {
    pub identifier: Identifier,
    pub password: String,
}

/// Command to replace the password of an already authorized account.
///
/// The old password is checked before the new one is validated, so a wrong
/// old password is reported even when the new one is also too weak.
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub old_password: String,
    pub new_password: String,
}

/// A token issued for an account, with the account it was issued for.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub account: Account,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_validation() {
        assert!(Username::new("alice".to_string()).is_ok());
        assert!(Username::new("al-ice_99".to_string()).is_ok());
        assert_eq!(
            Username::new("al".to_string()),
            Err(UsernameError::TooShort { min: 3, actual: 2 })
        );
        assert!(matches!(
            Username::new("a".repeat(33)),
            Err(UsernameError::TooLong { max: 32, actual: 33 })
        ));
        assert_eq!(
            Username::new("alice smith".to_string()),
            Err(UsernameError::InvalidCharacters)
        );
    }

    #[test]
    fn test_password_policy_counts_characters() {
        assert!(Password::new("12345678".to_string()).is_ok());
        assert_eq!(
            Password::new("1234567".to_string()),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 7 })
        );
        // Seven characters, fourteen bytes
        assert!(Password::new("пароль1".to_string()).is_err());
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("supersecret".to_string()).unwrap();
        assert_eq!(format!("{:?}", password), "Password(***)");
    }

    #[test]
    fn test_identifier_parse() {
        assert!(matches!(
            Identifier::parse("alice".to_string()),
            Ok(Identifier::Username(_))
        ));
        assert!(matches!(
            Identifier::parse("alice@example.com".to_string()),
            Ok(Identifier::Email(_))
        ));
        assert!(matches!(
            Identifier::parse("alice@".to_string()),
            Err(AccountError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_account_id_claim_conversion() {
        assert_eq!(AccountId::try_from(42u64), Ok(AccountId(42)));
        assert_eq!(
            AccountId::try_from(u64::MAX),
            Err(AccountIdError::OutOfRange(u64::MAX))
        );
        assert_eq!(AccountId(42).to_claim(), Ok(42));
        assert_eq!(AccountId(-1).to_claim(), Err(AccountIdError::Negative(-1)));
    }
}
