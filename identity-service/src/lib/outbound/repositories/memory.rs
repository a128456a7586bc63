use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::NewAccount;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<AccountId, Account>,
    last_id: i64,
}

/// Process-local account store.
///
/// Selected with `database.url = "memory"` and used by the integration tests.
/// Uniqueness checks and inserts happen under a single write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<Accounts>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .by_id
            .values()
            .any(|existing| existing.username == account.username)
        {
            return Err(AccountError::UsernameAlreadyExists(
                account.username.to_string(),
            ));
        }

        if let Some(email) = &account.email {
            if accounts
                .by_id
                .values()
                .any(|existing| existing.email.as_ref() == Some(email))
            {
                return Err(AccountError::EmailAlreadyExists(email.to_string()));
            }
        }

        accounts.last_id += 1;
        let account = account.with_id(AccountId(accounts.last_id));
        accounts.by_id.insert(account.id, account.clone());

        tracing::debug!("Stored account {} in memory", account.id);

        Ok(account)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountError> {
        Ok(self
            .accounts
            .read()
            .await
            .by_id
            .values()
            .find(|account| &account.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError> {
        Ok(self
            .accounts
            .read()
            .await
            .by_id
            .values()
            .find(|account| account.email.as_ref() == Some(email))
            .cloned())
    }

    async fn update_password_hash(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<(), AccountError> {
        let mut accounts = self.accounts.write().await;

        match accounts.by_id.get_mut(&id) {
            Some(account) => {
                account.password_hash = password_hash.to_string();
                Ok(())
            }
            None => Err(AccountError::NotFound(id.to_string())),
        }
    }
}
