use anyhow::Result;
use sqlx::PgPool;

pub async fn run_postgres_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running PostgreSQL migrations");

    // Create purchase_orders table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS purchase_orders (
            id VARCHAR PRIMARY KEY,
            vendor VARCHAR NOT NULL DEFAULT '',
            status VARCHAR NOT NULL DEFAULT 'draft',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create po_lines table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS po_lines (
            id BIGSERIAL PRIMARY KEY,
            po_id VARCHAR NOT NULL REFERENCES purchase_orders(id) ON DELETE CASCADE,
            ipn VARCHAR NOT NULL,
            qty_ordered DOUBLE PRECISION NOT NULL DEFAULT 0,
            unit_price DOUBLE PRECISION NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_po_lines_ipn ON po_lines(ipn)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_purchase_orders_created_at ON purchase_orders(created_at)")
        .execute(pool)
        .await?;

    tracing::info!("PostgreSQL migrations completed");
    Ok(())
}
