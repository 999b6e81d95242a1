//! Price History Lookup
//!
//! The one question the BOM engine asks of the purchasing store: what did we
//! last pay for this part?
//!
//! - **PriceHistory**: lookup trait
//! - **PurchaseHistoryRepository**: PostgreSQL implementation
//! - **MemoryPriceHistory**: in-memory implementation for testing

use anyhow::Result;
use async_trait::async_trait;
use partforge_models::PurchaseRecord;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::repositories::PurchaseHistoryRepository;

#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// Latest purchase with a non-zero unit price, or `None` when the part
    /// was never bought at a price.
    async fn latest_purchase(&self, ipn: &str) -> Result<Option<PurchaseRecord>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

#[async_trait]
impl PriceHistory for PurchaseHistoryRepository {
    async fn latest_purchase(&self, ipn: &str) -> Result<Option<PurchaseRecord>> {
        self.find_latest_priced(ipn).await
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

/// In-memory price history for testing
#[derive(Debug, Default)]
pub struct MemoryPriceHistory {
    records: RwLock<HashMap<String, PurchaseRecord>>,
}

impl MemoryPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a purchase; a later `last_ordered` replaces an earlier one.
    /// Unpriced purchases are ignored, as the SQL lookup ignores them.
    pub async fn record(&self, purchase: PurchaseRecord) {
        if !purchase.has_price() {
            return;
        }
        let mut records = self.records.write().await;
        match records.get(&purchase.ipn) {
            Some(existing) if existing.last_ordered > purchase.last_ordered => {}
            _ => {
                records.insert(purchase.ipn.clone(), purchase);
            }
        }
    }
}

#[async_trait]
impl PriceHistory for MemoryPriceHistory {
    async fn latest_purchase(&self, ipn: &str) -> Result<Option<PurchaseRecord>> {
        Ok(self.records.read().await.get(ipn).cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
