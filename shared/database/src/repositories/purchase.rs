//! Purchase History Repository
//!
//! Read access to purchase order lines for price lookups.

use anyhow::{Context, Result};
use sqlx::PgPool;

use partforge_models::PurchaseRecord;

#[derive(Clone)]
pub struct PurchaseHistoryRepository {
    pool: PgPool,
}

impl PurchaseHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recent purchase order line with a non-zero unit price for an IPN
    pub async fn find_latest_priced(&self, ipn: &str) -> Result<Option<PurchaseRecord>> {
        let record: Option<PurchaseRecord> = sqlx::query_as(
            r#"
            SELECT l.ipn, l.unit_price, l.po_id, o.created_at AS last_ordered
            FROM po_lines l
            JOIN purchase_orders o ON o.id = l.po_id
            WHERE l.ipn = $1 AND l.unit_price > 0
            ORDER BY o.created_at DESC, l.id DESC
            LIMIT 1
            "#
        )
        .bind(ipn)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch latest purchase price")?;

        Ok(record)
    }
}
