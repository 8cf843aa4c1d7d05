use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub account_holder_name: String,
    #[serde(default)]
    pub balance: Option<Decimal>,
}

/// Deposit or withdrawal against a single account. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub account_number: String,
    pub amount: Decimal,
}

impl CreateAccountRequest {
    pub fn new(account_holder_name: impl Into<String>, balance: Option<Decimal>) -> Self {
        Self {
            account_holder_name: account_holder_name.into(),
            balance,
        }
    }
}

impl TransactionRequest {
    pub fn new(account_number: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_number: account_number.into(),
            amount,
        }
    }
}
