use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Finance operation. `gold_amount`/`gold_price` are set together when the
/// operation records a gold sale; `gold_price` feeds the price history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinanceOperation {
    pub id: String,
    pub kind: String,
    pub category: String,
    pub amount: f64,
    pub currency: String,
    pub gold_amount: Option<f64>,
    pub gold_price: Option<f64>,
    pub comment: Option<String>,
    pub project_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinanceOperation {
    pub fn day(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}

pub const OPERATION_KINDS: [&str; 2] = ["income", "expense"];

pub fn validate_kind(kind: &str) -> Result<String, ModelError> {
    let low = kind.to_ascii_lowercase();
    if !OPERATION_KINDS.contains(&low.as_str()) {
        return Err(ModelError::Validation(format!(
            "invalid operation kind '{kind}' (expected income|expense)"
        )));
    }
    Ok(low)
}

pub fn validate_amount(amount: f64) -> Result<(), ModelError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ModelError::Validation("amount must be a positive number".into()));
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<(), ModelError> {
    if category.trim().is_empty() {
        return Err(ModelError::Validation("category must not be empty".into()));
    }
    Ok(())
}

/// `gold_amount` and `gold_price` come as a pair or not at all.
pub fn validate_gold_fields(
    gold_amount: Option<f64>,
    gold_price: Option<f64>,
) -> Result<(), ModelError> {
    match (gold_amount, gold_price) {
        (None, None) => Ok(()),
        (Some(a), Some(p)) => {
            if !a.is_finite() || a <= 0.0 || !p.is_finite() || p <= 0.0 {
                return Err(ModelError::Validation(
                    "gold_amount and gold_price must be positive".into(),
                ));
            }
            Ok(())
        }
        _ => Err(ModelError::Validation(
            "gold_amount and gold_price must be provided together".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_income_or_expense() {
        assert_eq!(validate_kind("Income").unwrap(), "income");
        assert!(validate_kind("transfer").is_err());
    }

    #[test]
    fn amount_must_be_positive_finite() {
        assert!(validate_amount(10.5).is_ok());
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
    }

    #[test]
    fn gold_fields_come_paired() {
        assert!(validate_gold_fields(None, None).is_ok());
        assert!(validate_gold_fields(Some(100.0), Some(0.21)).is_ok());
        assert!(validate_gold_fields(Some(100.0), None).is_err());
        assert!(validate_gold_fields(Some(-1.0), Some(0.2)).is_err());
    }
}
