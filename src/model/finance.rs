//! Transaction records. Balances are always recomputed, never stored.

use serde::{Deserialize, Serialize};

use super::{parse_date, Kind, Resource};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
}

impl Resource for Transaction {
    const KIND: Kind = Kind::Finance;

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_user_id(&mut self, user: &str) {
        self.user_id = user.to_string();
    }

    fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::Validation(
                "transaction amount must be a non-negative number".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(Error::Validation(
                "transaction category must not be empty".to_string(),
            ));
        }
        parse_date(&self.date)?;
        Ok(())
    }
}
