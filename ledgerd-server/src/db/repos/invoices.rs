//! Invoice repository
//!
//! Handles invoice CRUD:
//! - get: INNER JOIN with the owning company (no N+1)
//! - create: paid/add_date are defaulted by the storage layer

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::models::InvoiceAmount;

use super::{Company, DbError};

/// Invoice record from database
#[derive(Debug, Clone, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub comp_code: String,
    pub amt: f64,
    pub paid: bool,
    pub add_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
}

/// Invoice projection for list display
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceSummary {
    pub id: i64,
    pub comp_code: String,
}

/// Invoice joined with its owning company
#[derive(Debug, Clone)]
pub struct InvoiceWithCompany {
    pub id: i64,
    pub amt: f64,
    pub paid: bool,
    pub add_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub company: Company,
}

/// Invoice repository
pub struct InvoiceRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> InvoiceRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all invoices as `{id, comp_code}` projections.
    pub async fn list(&self) -> Result<Vec<InvoiceSummary>, DbError> {
        let rows: Vec<InvoiceSummary> = sqlx::query_as("SELECT id, comp_code FROM invoices")
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Get a single invoice by id with the owning company's details.
    ///
    /// An id whose join produces no row is indistinguishable from a missing
    /// invoice; both report the invoice as not found.
    pub async fn get(&self, id: i64) -> Result<InvoiceWithCompany, DbError> {
        let row: Option<InvoiceCompanyRow> = sqlx::query_as(
            r#"
            SELECT
                i.id,
                i.amt,
                i.paid,
                i.add_date,
                i.paid_date,
                c.code,
                c.name,
                c.description
            FROM invoices i
            JOIN companies c ON c.code = i.comp_code
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let row = row.ok_or(DbError::NotFound {
            message: "Invoice ID could not be found",
        })?;

        Ok(InvoiceWithCompany {
            id: row.id,
            amt: row.amt,
            paid: row.paid,
            add_date: row.add_date,
            paid_date: row.paid_date,
            company: Company {
                code: row.code,
                name: row.name,
                description: row.description,
            },
        })
    }

    /// Create an invoice for a company.
    ///
    /// The company foreign key is the only constraint this insert can trip
    /// once the amount has been validated, so a database-reported failure is
    /// attributed to the company code.
    pub async fn create(&self, comp_code: &str, amount: InvoiceAmount) -> Result<Invoice, DbError> {
        let invoice: Invoice = sqlx::query_as(
            r#"
            INSERT INTO invoices (comp_code, amt)
            VALUES ($1, $2)
            RETURNING id, comp_code, amt, paid, add_date, paid_date
            "#,
        )
        .bind(comp_code)
        .bind(amount.value())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some() {
                DbError::NotFound {
                    message: "Company code cannot be found",
                }
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(invoice)
    }

    /// Update an invoice's amount. paid and paid_date are left untouched.
    pub async fn update_amount(&self, id: i64, amount: InvoiceAmount) -> Result<Invoice, DbError> {
        let row: Option<Invoice> = sqlx::query_as(
            r#"
            UPDATE invoices
            SET amt = $2
            WHERE id = $1
            RETURNING id, comp_code, amt, paid, add_date, paid_date
            "#,
        )
        .bind(id)
        .bind(amount.value())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(DbError::NotFound {
            message: "Invoice ID could not be found",
        })
    }

    /// Delete an invoice by id.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                message: "Invoice ID could not be found",
            });
        }

        Ok(())
    }
}

/// Flat row shape for the invoice/company join
#[derive(Debug, FromRow)]
struct InvoiceCompanyRow {
    id: i64,
    amt: f64,
    paid: bool,
    add_date: DateTime<Utc>,
    paid_date: Option<DateTime<Utc>>,
    code: String,
    name: String,
    description: String,
}
