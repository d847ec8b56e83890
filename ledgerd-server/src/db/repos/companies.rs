//! Company repository
//!
//! Handles company CRUD:
//! - get: LEFT JOIN with invoice ids (no N+1)
//! - create/update: rely on DB constraints, classify conflicts

use sqlx::{FromRow, PgPool, Row};

use crate::models::{CompanyCode, CompanyName};

/// Company record from database
#[derive(Debug, Clone, FromRow)]
pub struct Company {
    pub code: String,
    pub name: String,
    pub description: String,
}

/// Company projection for list display
#[derive(Debug, Clone, FromRow)]
pub struct CompanySummary {
    pub code: String,
    pub name: String,
}

/// Company with the ids of its invoices
#[derive(Debug, Clone)]
pub struct CompanyWithInvoices {
    pub code: String,
    pub name: String,
    pub description: String,
    pub invoice_ids: Vec<i64>,
}

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{message}")]
    NotFound { message: &'static str },

    #[error("{message}")]
    Conflict { message: &'static str },
}

/// Company repository
pub struct CompanyRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanyRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all companies as `{code, name}` projections.
    pub async fn list(&self) -> Result<Vec<CompanySummary>, DbError> {
        let rows: Vec<CompanySummary> = sqlx::query_as("SELECT code, name FROM companies")
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Get a single company by code with its invoice ids.
    ///
    /// Uses LEFT JOIN + ARRAY_AGG to fetch the company and its invoice ids
    /// in a single query.
    pub async fn get(&self, code: &str) -> Result<CompanyWithInvoices, DbError> {
        let row = sqlx::query(
            r#"
            SELECT
                c.code,
                c.name,
                c.description,
                COALESCE(
                    ARRAY_AGG(i.id ORDER BY i.id) FILTER (WHERE i.id IS NOT NULL),
                    '{}'
                ) AS invoice_ids
            FROM companies c
            LEFT JOIN invoices i ON i.comp_code = c.code
            WHERE c.code = $1
            GROUP BY c.code, c.name, c.description
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?
        .ok_or(DbError::NotFound {
            message: "Company cannot be found",
        })?;

        Ok(CompanyWithInvoices {
            code: row.get("code"),
            name: row.get("name"),
            description: row.get("description"),
            invoice_ids: row.get("invoice_ids"),
        })
    }

    /// Create a company.
    ///
    /// Uniqueness of both code and name is enforced by the storage layer;
    /// either collision surfaces as the same `Conflict`.
    pub async fn create(
        &self,
        code: CompanyCode,
        name: CompanyName,
        description: String,
    ) -> Result<Company, DbError> {
        let company: Company = sqlx::query_as(
            r#"
            INSERT INTO companies (code, name, description)
            VALUES ($1, $2, $3)
            RETURNING code, name, description
            "#,
        )
        .bind(code.as_str())
        .bind(name.as_str())
        .bind(&description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                DbError::Conflict {
                    message: "Company name or code already exists",
                }
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(company)
    }

    /// Update a company's name and description. The code is immutable.
    pub async fn update(
        &self,
        code: &str,
        name: CompanyName,
        description: String,
    ) -> Result<Company, DbError> {
        let row: Option<Company> = sqlx::query_as(
            r#"
            UPDATE companies
            SET name = $2, description = $3
            WHERE code = $1
            RETURNING code, name, description
            "#,
        )
        .bind(code)
        .bind(name.as_str())
        .bind(&description)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                DbError::Conflict {
                    message: "Company name already exists",
                }
            } else {
                DbError::Sqlx(e)
            }
        })?;

        row.ok_or(DbError::NotFound {
            message: "Company cannot be found",
        })
    }

    /// Delete a company by code. Invoices cascade at the storage layer.
    pub async fn delete(&self, code: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM companies WHERE code = $1")
            .bind(code)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                message: "Company cannot be found",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::InvoiceRepo;
    use crate::models::InvoiceAmount;

    // Integration tests - run with DATABASE_URL set
    // cargo test -p ledgerd-server -- --ignored

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::pool::create_pool(&url)
            .await
            .expect("pool creation failed");
        crate::db::migrations::run(&pool)
            .await
            .expect("migrations failed");
        pool
    }

    fn unique_code(prefix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .subsec_nanos();
        format!("{}-{}-{}", prefix, std::process::id(), nanos)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_then_get_roundtrip() {
        let pool = test_pool().await;
        let repo = CompanyRepo::new(&pool);
        let code = unique_code("co");

        let created = repo
            .create(
                CompanyCode::new(&code).unwrap(),
                CompanyName::new(&format!("{} Inc", code)).unwrap(),
                "A test company".to_owned(),
            )
            .await
            .expect("create failed");
        assert_eq!(created.code, code);

        let fetched = repo.get(&code).await.expect("get failed");
        assert_eq!(fetched.name, format!("{} Inc", code));
        assert_eq!(fetched.description, "A test company");
        assert!(fetched.invoice_ids.is_empty());

        // Invoice ids appear once an invoice references the company
        let invoice = InvoiceRepo::new(&pool)
            .create(&code, InvoiceAmount::new(50.0).unwrap())
            .await
            .expect("invoice create failed");

        let fetched = repo.get(&code).await.expect("get failed");
        assert_eq!(fetched.invoice_ids, vec![invoice.id]);

        repo.delete(&code).await.expect("cleanup failed");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_code_is_conflict() {
        let pool = test_pool().await;
        let repo = CompanyRepo::new(&pool);
        let code = unique_code("dup");

        repo.create(
            CompanyCode::new(&code).unwrap(),
            CompanyName::new(&format!("{} first", code)).unwrap(),
            "first".to_owned(),
        )
        .await
        .expect("create failed");

        let err = repo
            .create(
                CompanyCode::new(&code).unwrap(),
                CompanyName::new(&format!("{} second", code)).unwrap(),
                "second".to_owned(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        // The first row is untouched
        let fetched = repo.get(&code).await.expect("get failed");
        assert_eq!(fetched.description, "first");

        repo.delete(&code).await.expect("cleanup failed");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_then_get_is_not_found() {
        let pool = test_pool().await;
        let repo = CompanyRepo::new(&pool);
        let code = unique_code("del");

        repo.create(
            CompanyCode::new(&code).unwrap(),
            CompanyName::new(&format!("{} Inc", code)).unwrap(),
            "short-lived".to_owned(),
        )
        .await
        .expect("create failed");

        repo.delete(&code).await.expect("delete failed");

        let err = repo.get(&code).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_missing_company_is_not_found() {
        let pool = test_pool().await;
        let repo = CompanyRepo::new(&pool);

        let err = repo
            .update(
                "no-such-company",
                CompanyName::new("Anything").unwrap(),
                "whatever".to_owned(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
