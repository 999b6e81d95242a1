//! Cost domain models: purchase history records and rolled-up cost reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use std::collections::HashMap;

/// Most recent purchase order line with a non-zero unit price for an IPN.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PurchaseRecord {
    pub ipn: String,
    pub unit_price: f64,
    pub po_id: String,
    pub last_ordered: DateTime<Utc>,
}

impl PurchaseRecord {
    /// Whether the record carries a price usable in a rollup.
    pub fn has_price(&self) -> bool {
        self.unit_price.is_finite() && self.unit_price > 0.0
    }
}

/// Response body of the cost query.
///
/// Purchase fields are present only when purchase history exists and
/// `bom_cost` only for assemblies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostReport {
    pub ipn: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_currency"
    )]
    pub last_unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ordered: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_currency"
    )]
    pub bom_cost: Option<f64>,
}

impl CostReport {
    pub fn new(ipn: impl Into<String>) -> Self {
        Self {
            ipn: ipn.into(),
            last_unit_price: None,
            po_id: None,
            last_ordered: None,
            bom_cost: None,
        }
    }

    pub fn with_purchase(mut self, purchase: Option<PurchaseRecord>) -> Self {
        if let Some(purchase) = purchase.filter(PurchaseRecord::has_price) {
            self.last_unit_price = Some(purchase.unit_price);
            self.po_id = Some(purchase.po_id);
            self.last_ordered = Some(purchase.last_ordered);
        }
        self
    }

    pub fn with_bom_cost(mut self, bom_cost: f64) -> Self {
        self.bom_cost = Some(bom_cost);
        self
    }
}

/// Rounds a monetary amount to two decimal places, half away from zero.
///
/// Amounts too large to scale are already whole and come back unchanged.
pub fn round_currency(amount: f64) -> f64 {
    let cents = amount * 100.0;
    if !cents.is_finite() {
        return amount;
    }
    cents.round() / 100.0
}

fn serialize_currency<S>(amount: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match amount {
        Some(value) => serializer.serialize_some(&round_currency(*value)),
        None => serializer.serialize_none(),
    }
}

/// Per-request memo of unit prices, including known misses.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    prices: HashMap<String, Option<f64>>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the lookup outcome for an IPN. Zero, negative and non-finite
    /// prices are stored as unknown.
    pub fn record(&mut self, ipn: impl Into<String>, price: Option<f64>) {
        let price = price.filter(|p| p.is_finite() && *p > 0.0);
        self.prices.insert(ipn.into(), price);
    }

    /// `None` when the IPN has not been looked up yet, `Some(None)` when it
    /// has and no price is known.
    pub fn get(&self, ipn: &str) -> Option<Option<f64>> {
        self.prices.get(ipn).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(String, f64)> for PriceBook {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut book = Self::new();
        for (ipn, price) in iter {
            book.record(ipn, Some(price));
        }
        book
    }
}
