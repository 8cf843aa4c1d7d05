use crate::domain::{Account, AccountId, NewAccount};
use crate::infrastructure::repository::{AccountRepositoryTrait, RepositoryError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, info};

const ACCOUNT_COLUMNS: &str = "id, account_holder_name, account_number, balance";

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i64,
    account_holder_name: String,
    account_number: String,
    balance: Decimal,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            account_holder_name: row.account_holder_name,
            account_number: row.account_number,
            balance: row.balance,
        }
    }
}

/// Postgres-backed store over the `accounts` table.
#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool of at most `max_connections` connections.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;
        info!(
            "Connected to Postgres with up to {} connections",
            max_connections
        );
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn map_insert_error(err: sqlx::Error, account_number: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::DuplicateAccountNumber(account_number.to_string())
        }
        _ => RepositoryError::Database(err),
    }
}

#[async_trait]
impl AccountRepositoryTrait for PgAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let sql = format!(
            "INSERT INTO accounts (account_holder_name, account_number, balance) \
             VALUES ($1, $2, $3) RETURNING {}",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(&account.account_holder_name)
            .bind(&account.account_number)
            .bind(account.balance)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &account.account_number))?;
        debug!("Inserted account {} with id {}", row.account_number, row.id);
        Ok(row.into())
    }

    async fn save(&self, account: &Account) -> Result<Account, RepositoryError> {
        let sql = format!(
            "UPDATE accounts SET balance = $2 WHERE id = $1 RETURNING {}",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account.id)
            .bind(account.balance)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::from)
            .ok_or(RepositoryError::NotFound(account.id))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Account::from))
    }

    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE account_number = $1",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Account::from))
    }

    async fn find_all(&self) -> Result<Vec<Account>, RepositoryError> {
        let sql = format!("SELECT {} FROM accounts ORDER BY id", ACCOUNT_COLUMNS);
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn delete(&self, id: AccountId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
