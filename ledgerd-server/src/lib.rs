//! ledgerd-server: HTTP API over companies and invoices
//!
//! Two resource controllers share one PostgreSQL pool: companies (keyed by
//! code) and invoices (keyed by a generated id, owned by a company). Each
//! route performs a single parameterized statement and maps the outcome to
//! a JSON response; failures follow one error-body convention throughout.

pub mod db;
pub mod http;
pub mod models;
