//! Bootstrap DDL for the companies and invoices tables

use sqlx::PgPool;

/// Run all migrations. Idempotent.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS invoices (
            id BIGSERIAL PRIMARY KEY,
            comp_code TEXT NOT NULL REFERENCES companies(code) ON DELETE CASCADE,
            amt DOUBLE PRECISION NOT NULL CHECK (amt > 0),
            paid BOOLEAN NOT NULL DEFAULT FALSE,
            add_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            paid_date TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_invoices_comp_code ON invoices(comp_code)")
        .execute(pool)
        .await?;

    tracing::info!("Migrations complete");
    Ok(())
}
