use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type AccountId = i64;

pub const ACCOUNT_NUMBER_PREFIX: &str = "ACC";
const ACCOUNT_NUMBER_SUFFIX_LEN: usize = 8;

/// Decimal places a stored balance keeps. Matches the `NUMERIC(19, 4)` column.
pub const BALANCE_SCALE: u32 = 4;
/// Balances stay strictly below 10^15, the integer range of `NUMERIC(19, 4)`.
const BALANCE_INTEGER_DIGITS: u32 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub account_holder_name: String,
    pub account_number: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub balance: Decimal,
}

/// An account that has not been handed to a store yet, so it has no id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub account_holder_name: String,
    pub account_number: String,
    pub balance: Decimal,
}

/// Identifies the account a failed lookup was aimed at.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountRef {
    Id(AccountId),
    Number(String),
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::Id(id) => write!(f, "id: {}", id),
            AccountRef::Number(number) => write!(f, "number: {}", number),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => f.write_str("Deposit"),
            TransactionKind::Withdrawal => f.write_str("Withdrawal"),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum AccountError {
    #[error("Account not found with {0}")]
    NotFound(AccountRef),
    #[error("{kind} amount must be greater than zero")]
    InvalidAmount {
        kind: TransactionKind,
        amount: Decimal,
    },
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
    #[error("Initial balance cannot be negative: {0}")]
    InvalidInitialBalance(Decimal),
    #[error("Amount {0} has more than {max} decimal places", max = BALANCE_SCALE)]
    ExcessivePrecision(Decimal),
    #[error("Amount {amount} would take the balance out of range (current {balance})")]
    AmountOutOfRange { balance: Decimal, amount: Decimal },
    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

impl AccountError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccountError::NotFound(_))
    }
}

impl NewAccount {
    /// Opens an account with a freshly generated number. A missing balance
    /// starts at zero.
    pub fn open(
        account_holder_name: String,
        initial_balance: Option<Decimal>,
    ) -> Result<Self, AccountError> {
        let balance = initial_balance.unwrap_or(Decimal::ZERO);
        if balance < Decimal::ZERO {
            return Err(AccountError::InvalidInitialBalance(balance));
        }
        check_precision(balance)?;
        check_range(Decimal::ZERO, balance, Some(balance))?;

        Ok(NewAccount {
            account_holder_name,
            account_number: generate_account_number(),
            balance,
        })
    }

    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            account_holder_name: self.account_holder_name,
            account_number: self.account_number,
            balance: self.balance,
        }
    }
}

impl Account {
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        if amount <= Decimal::ZERO {
            return Err(AccountError::InvalidAmount {
                kind: TransactionKind::Deposit,
                amount,
            });
        }
        check_precision(amount)?;
        let balance = self.balance.checked_add(amount);
        self.balance = check_range(self.balance, amount, balance)?;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), AccountError> {
        if amount <= Decimal::ZERO {
            return Err(AccountError::InvalidAmount {
                kind: TransactionKind::Withdrawal,
                amount,
            });
        }
        check_precision(amount)?;
        if self.balance < amount {
            return Err(AccountError::InsufficientFunds {
                available: self.balance,
                requested: amount,
            });
        }
        let balance = self.balance.checked_sub(amount);
        self.balance = check_range(self.balance, amount, balance)?;
        Ok(())
    }
}

fn check_precision(amount: Decimal) -> Result<(), AccountError> {
    if amount.normalize().scale() > BALANCE_SCALE {
        return Err(AccountError::ExcessivePrecision(amount));
    }
    Ok(())
}

/// `result` is the checked arithmetic outcome; `None` means it overflowed.
fn check_range(
    balance: Decimal,
    amount: Decimal,
    result: Option<Decimal>,
) -> Result<Decimal, AccountError> {
    let limit = Decimal::from(10_i64.pow(BALANCE_INTEGER_DIGITS));
    match result {
        Some(value) if value < limit => Ok(value),
        _ => Err(AccountError::AmountOutOfRange { balance, amount }),
    }
}

/// `ACC` followed by the first eight hex digits of a random v4 UUID, upper-cased.
pub fn generate_account_number() -> String {
    let token = Uuid::new_v4().simple().to_string();
    let suffix = token[..ACCOUNT_NUMBER_SUFFIX_LEN].to_uppercase();
    format!("{}{}", ACCOUNT_NUMBER_PREFIX, suffix)
}

pub fn is_valid_account_number(candidate: &str) -> bool {
    match candidate.strip_prefix(ACCOUNT_NUMBER_PREFIX) {
        Some(suffix) => {
            suffix.len() == ACCOUNT_NUMBER_SUFFIX_LEN
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        }
        None => false,
    }
}
