//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for enriched reads (no N+1)
//! - Relies on DB constraints and classifies the outcome (no check-then-insert)
//! - Zero rows affected means the referenced row does not exist

pub mod companies;
pub mod invoices;

pub use companies::{Company, CompanyRepo, CompanySummary, CompanyWithInvoices, DbError};
pub use invoices::{Invoice, InvoiceRepo, InvoiceSummary, InvoiceWithCompany};
