//! Bridges the synchronous cost rollup to the async purchase history.
//!
//! The rollup runs on a blocking thread; each unit price is fetched through
//! the runtime handle the first time it is asked for and memoized in a
//! `PriceBook` for the rest of the call.

use partforge_database::PriceHistory;
use partforge_models::PriceBook;
use partforge_utils::{PartforgeError, PartforgeResult, PriceLookup};
use std::cell::RefCell;
use std::sync::Arc;
use tokio::runtime::Handle;

pub struct HistoryPrices {
    handle: Handle,
    history: Arc<dyn PriceHistory>,
    memo: RefCell<PriceBook>,
}

impl HistoryPrices {
    pub fn new(handle: Handle, history: Arc<dyn PriceHistory>) -> Self {
        Self {
            handle,
            history,
            memo: RefCell::new(PriceBook::new()),
        }
    }

    /// Number of distinct IPNs looked up so far
    pub fn lookups(&self) -> usize {
        self.memo.borrow().len()
    }
}

impl PriceLookup for HistoryPrices {
    fn unit_price(&self, ipn: &str) -> PartforgeResult<Option<f64>> {
        if let Some(known) = self.memo.borrow().get(ipn) {
            return Ok(known);
        }

        let purchase = self
            .handle
            .block_on(self.history.latest_purchase(ipn))
            .map_err(|e| PartforgeError::database(format!("price lookup for {} failed: {}", ipn, e)))?;

        let price = purchase.map(|p| p.unit_price);
        let mut memo = self.memo.borrow_mut();
        memo.record(ipn, price);
        Ok(memo.get(ipn).flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use partforge_database::MemoryPriceHistory;
    use partforge_models::PurchaseRecord;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_prices_are_memoized_including_misses() {
        let history = Arc::new(MemoryPriceHistory::new());
        history
            .record(PurchaseRecord {
                ipn: "RES-001".to_string(),
                unit_price: 0.10,
                po_id: "PO-1".to_string(),
                last_ordered: Utc::now(),
            })
            .await;

        let handle = Handle::current();
        let (price, miss, lookups) = tokio::task::spawn_blocking(move || {
            let prices = HistoryPrices::new(handle, history);
            let price = prices.unit_price("RES-001").unwrap();
            let miss = prices.unit_price("CAP-404").unwrap();
            prices.unit_price("RES-001").unwrap();
            (price, miss, prices.lookups())
        })
        .await
        .unwrap();

        assert_eq!(price, Some(0.10));
        assert_eq!(miss, None);
        assert_eq!(lookups, 2);
    }
}
