use crate::domain::{Account, AccountId, NewAccount};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Account not found: {0}")]
    NotFound(AccountId),
    #[error("Account number already exists: {0}")]
    DuplicateAccountNumber(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistence port for accounts. Every store keeps account numbers unique.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync + 'static {
    /// Stores a new account and returns it with its assigned id.
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError>;
    /// Writes back the balance of an existing account.
    async fn save(&self, account: &Account) -> Result<Account, RepositoryError>;
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;
    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Account>, RepositoryError>;
    async fn delete(&self, id: AccountId) -> Result<(), RepositoryError>;
}

/// Process-local store. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<DashMap<AccountId, Account>>,
    numbers: Arc<DashMap<String, AccountId>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountRepositoryTrait for InMemoryAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let id = match self.numbers.entry(account.account_number.clone()) {
            Entry::Occupied(_) => {
                return Err(RepositoryError::DuplicateAccountNumber(
                    account.account_number,
                ))
            }
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                slot.insert(id);
                id
            }
        };

        let stored = account.into_account(id);
        self.accounts.insert(id, stored.clone());
        debug!("Stored account {} as id {}", stored.account_number, id);
        Ok(stored)
    }

    async fn save(&self, account: &Account) -> Result<Account, RepositoryError> {
        let mut stored = self
            .accounts
            .get_mut(&account.id)
            .ok_or(RepositoryError::NotFound(account.id))?;
        stored.balance = account.balance;
        Ok(stored.value().clone())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let id = match self.numbers.get(account_number) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        self.find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Account>, RepositoryError> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }

    async fn delete(&self, id: AccountId) -> Result<(), RepositoryError> {
        if let Some((_, account)) = self.accounts.remove(&id) {
            self.numbers.remove(&account.account_number);
        }
        Ok(())
    }
}
