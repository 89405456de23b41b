use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use models::finance::{self, FinanceOperation};
use models::ids;

use crate::errors::ServiceError;
use crate::pagination::{paginate, Pagination};
use crate::storage::map_store::MapStore;

#[derive(Clone, Debug, Deserialize)]
pub struct OperationInput {
    pub kind: String,
    pub category: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub gold_amount: Option<f64>,
    #[serde(default)]
    pub gold_price: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OperationPatch {
    pub kind: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub gold_amount: Option<f64>,
    pub gold_price: Option<f64>,
    pub comment: Option<String>,
    pub project_id: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct OperationFilter<'a> {
    pub kind: Option<&'a str>,
    pub category: Option<&'a str>,
    pub project_id: Option<&'a str>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// One day's totals. Recomputed from the full map on every call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
    pub count: u64,
}

/// Daily average of `gold_price` across operations that carry one.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GoldPricePoint {
    pub date: NaiveDate,
    pub avg_price: f64,
    pub samples: u64,
}

#[derive(Clone)]
pub struct FinanceService {
    store: Arc<MapStore<FinanceOperation>>,
}

impl FinanceService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { store: MapStore::new() })
    }

    fn matches(op: &FinanceOperation, filter: &OperationFilter<'_>) -> bool {
        filter.kind.is_none_or(|k| op.kind == k)
            && filter.category.is_none_or(|c| op.category == c)
            && filter.project_id.is_none_or(|p| op.project_id.as_deref() == Some(p))
            && filter.from.is_none_or(|from| op.occurred_at >= from)
            && filter.to.is_none_or(|to| op.occurred_at <= to)
    }

    /// Filtered list, newest first, with the total count after filtering.
    pub async fn list(
        &self,
        filter: OperationFilter<'_>,
        page: Pagination,
    ) -> (Vec<FinanceOperation>, u64) {
        let mut ops: Vec<FinanceOperation> = self
            .store
            .values()
            .await
            .into_iter()
            .filter(|op| Self::matches(op, &filter))
            .collect();
        ops.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        let total = ops.len() as u64;
        (paginate(ops, page), total)
    }

    pub async fn get(&self, id: &str) -> Result<FinanceOperation, ServiceError> {
        self.store.get(id).await.ok_or_else(|| ServiceError::not_found("operation"))
    }

    pub async fn create(&self, input: OperationInput) -> Result<FinanceOperation, ServiceError> {
        let kind = finance::validate_kind(&input.kind)?;
        finance::validate_category(&input.category)?;
        finance::validate_amount(input.amount)?;
        finance::validate_gold_fields(input.gold_amount, input.gold_price)?;
        if input.currency.trim().is_empty() {
            return Err(ServiceError::Validation("currency must not be empty".into()));
        }
        let now = Utc::now();
        let rec = FinanceOperation {
            id: ids::timestamped(),
            kind,
            category: input.category,
            amount: input.amount,
            currency: input.currency.to_ascii_uppercase(),
            gold_amount: input.gold_amount,
            gold_price: input.gold_price,
            comment: input.comment,
            project_id: input.project_id,
            occurred_at: input.occurred_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };
        self.store.insert(rec.id.clone(), rec.clone()).await;
        Ok(rec)
    }

    pub async fn patch(&self, id: &str, patch: OperationPatch) -> Result<FinanceOperation, ServiceError> {
        let kind = match patch.kind.as_deref() {
            Some(k) => Some(finance::validate_kind(k)?),
            None => None,
        };
        if let Some(category) = &patch.category {
            finance::validate_category(category)?;
        }
        if let Some(amount) = patch.amount {
            finance::validate_amount(amount)?;
        }
        // Gold fields must stay a consistent pair after the merge.
        if patch.gold_amount.is_some() || patch.gold_price.is_some() {
            let current = self.get(id).await?;
            finance::validate_gold_fields(
                patch.gold_amount.or(current.gold_amount),
                patch.gold_price.or(current.gold_price),
            )?;
        }
        self.store
            .update_entry(id, |op| {
                if let Some(kind) = kind { op.kind = kind; }
                if let Some(category) = patch.category { op.category = category; }
                if let Some(amount) = patch.amount { op.amount = amount; }
                if let Some(currency) = patch.currency {
                    op.currency = currency.to_ascii_uppercase();
                }
                if let Some(gold_amount) = patch.gold_amount { op.gold_amount = Some(gold_amount); }
                if let Some(gold_price) = patch.gold_price { op.gold_price = Some(gold_price); }
                if let Some(comment) = patch.comment { op.comment = Some(comment); }
                if let Some(project_id) = patch.project_id { op.project_id = Some(project_id); }
                if let Some(occurred_at) = patch.occurred_at { op.occurred_at = occurred_at; }
                op.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("operation"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove(id).await {
            return Err(ServiceError::not_found("operation"));
        }
        Ok(())
    }

    /// Single pass over the map bucketing by UTC day, ascending.
    pub async fn daily_stats(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Vec<DailyStat> {
        let mut days: BTreeMap<NaiveDate, DailyStat> = BTreeMap::new();
        for op in self.store.values().await {
            if from.is_some_and(|f| op.occurred_at < f) || to.is_some_and(|t| op.occurred_at > t) {
                continue;
            }
            let entry = days.entry(op.day()).or_insert_with(|| DailyStat {
                date: op.day(),
                income: 0.0,
                expense: 0.0,
                profit: 0.0,
                count: 0,
            });
            if op.kind == "income" {
                entry.income += op.amount;
            } else {
                entry.expense += op.amount;
            }
            entry.count += 1;
        }
        days.into_values()
            .map(|mut d| {
                d.profit = d.income - d.expense;
                d
            })
            .collect()
    }

    /// Daily gold-price averages over the trailing `days` window, ascending.
    pub async fn gold_price_history(&self, days: u32) -> Vec<GoldPricePoint> {
        let cutoff = Utc::now() - Duration::days(i64::from(days.clamp(1, 365)));
        let mut buckets: BTreeMap<NaiveDate, (f64, u64)> = BTreeMap::new();
        for op in self.store.values().await {
            let Some(price) = op.gold_price else { continue };
            if op.occurred_at < cutoff {
                continue;
            }
            let bucket = buckets.entry(op.day()).or_insert((0.0, 0));
            bucket.0 += price;
            bucket.1 += 1;
        }
        buckets
            .into_iter()
            .map(|(date, (sum, samples))| GoldPricePoint {
                date,
                avg_price: sum / samples as f64,
                samples,
            })
            .collect()
    }
}
