use crate::domain::{
    Account, AccountError, AccountId, AccountRef, CreateAccountRequest, NewAccount,
    TransactionRequest,
};
use crate::infrastructure::locking::AccountLocks;
use crate::infrastructure::repository::{AccountRepositoryTrait, RepositoryError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fresh account numbers tried before a collision is reported.
pub const MAX_ACCOUNT_NUMBER_ATTEMPTS: usize = 3;

/// Business operations on accounts.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync + 'static {
    async fn create_account(&self, request: CreateAccountRequest)
        -> Result<Account, AccountError>;
    async fn get_account(&self, id: AccountId) -> Result<Account, AccountError>;
    async fn list_accounts(&self) -> Result<Vec<Account>, AccountError>;
    async fn deposit(&self, request: TransactionRequest) -> Result<Account, AccountError>;
    async fn withdraw(&self, request: TransactionRequest) -> Result<Account, AccountError>;
    async fn delete_account(&self, id: AccountId) -> Result<(), AccountError>;
}

impl From<RepositoryError> for AccountError {
    fn from(err: RepositoryError) -> Self {
        AccountError::InfrastructureError(err.to_string())
    }
}

#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
    locks: AccountLocks,
}

impl AccountService {
    /// Creates a new `AccountService` on top of any account store.
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>) -> Self {
        Self {
            repository,
            locks: AccountLocks::new(),
        }
    }

    async fn find_by_number(&self, account_number: &str) -> Result<Account, AccountError> {
        self.repository
            .find_by_account_number(account_number)
            .await?
            .ok_or_else(|| AccountError::NotFound(AccountRef::Number(account_number.to_string())))
    }

    async fn update_balance<F>(&self, account_number: &str, change: F) -> Result<Account, AccountError>
    where
        F: FnOnce(&mut Account) -> Result<(), AccountError> + Send,
    {
        let mut account = self.find_by_number(account_number).await?;
        change(&mut account)?;
        Ok(self.repository.save(&account).await?)
    }

    /// Runs one read-modify-write of the balance of `account_number` while
    /// holding that account's lock.
    async fn apply<F>(&self, account_number: &str, change: F) -> Result<Account, AccountError>
    where
        F: FnOnce(&mut Account) -> Result<(), AccountError> + Send,
    {
        let _guard = self.locks.acquire(account_number).await;
        self.update_balance(account_number, change).await
    }
}

#[async_trait]
impl AccountServiceTrait for AccountService {
    async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<Account, AccountError> {
        let CreateAccountRequest {
            account_holder_name,
            balance,
        } = request;

        let mut attempt = 1;
        loop {
            let new_account = NewAccount::open(account_holder_name.clone(), balance)?;
            match self.repository.create(new_account).await {
                Ok(account) => {
                    info!(
                        "Created account {} (id {}) for {}",
                        account.account_number, account.id, account.account_holder_name
                    );
                    return Ok(account);
                }
                Err(RepositoryError::DuplicateAccountNumber(number))
                    if attempt < MAX_ACCOUNT_NUMBER_ATTEMPTS =>
                {
                    warn!(
                        "Account number {} already taken, retrying ({}/{})",
                        number, attempt, MAX_ACCOUNT_NUMBER_ATTEMPTS
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, AccountError> {
        debug!("Looking up account {}", id);
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(AccountRef::Id(id)))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.repository.find_all().await?)
    }

    async fn deposit(&self, request: TransactionRequest) -> Result<Account, AccountError> {
        let amount = request.amount;
        let result = self
            .apply(&request.account_number, |account| account.deposit(amount))
            .await;
        match &result {
            Ok(account) => info!(
                "Deposited {} into {}, balance {}",
                amount, account.account_number, account.balance
            ),
            Err(e) => warn!("Deposit into {} rejected: {}", request.account_number, e),
        }
        result
    }

    async fn withdraw(&self, request: TransactionRequest) -> Result<Account, AccountError> {
        let amount = request.amount;
        let result = self
            .apply(&request.account_number, |account| account.withdraw(amount))
            .await;
        match &result {
            Ok(account) => info!(
                "Withdrew {} from {}, balance {}",
                amount, account.account_number, account.balance
            ),
            Err(e) => warn!("Withdrawal from {} rejected: {}", request.account_number, e),
        }
        result
    }

    async fn delete_account(&self, id: AccountId) -> Result<(), AccountError> {
        let account = self.get_account(id).await?;
        {
            let _guard = self.locks.acquire(&account.account_number).await;
            self.repository.delete(id).await?;
        }
        info!("Deleted account {} (id {})", account.account_number, id);
        Ok(())
    }
}
