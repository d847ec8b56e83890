//! Invoice endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use chrono::{DateTime, Utc};

use crate::db::repos::{Invoice, InvoiceRepo, InvoiceSummary, InvoiceWithCompany};
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::models::InvoiceAmount;

use super::companies::CompanyResponse;

/// Create invoice request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateInvoiceRequest {
    pub comp_code: String,
    pub amt: f64,
}

/// Update invoice request. Only the amount can change.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateInvoiceRequest {
    pub amt: f64,
}

/// Invoice response, wrapped per the API convention
#[derive(Serialize)]
pub struct InvoiceResponse {
    pub invoice: InvoiceBody,
}

#[derive(Serialize)]
pub struct InvoiceBody {
    pub id: i64,
    pub comp_code: String,
    pub amt: f64,
    pub paid: bool,
    pub add_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(i: Invoice) -> Self {
        Self {
            invoice: InvoiceBody {
                id: i.id,
                comp_code: i.comp_code,
                amt: i.amt,
                paid: i.paid,
                add_date: i.add_date,
                paid_date: i.paid_date,
            },
        }
    }
}

/// Invoice list response
#[derive(Serialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceSummaryResponse>,
}

/// Invoice list entry
#[derive(Serialize)]
pub struct InvoiceSummaryResponse {
    pub id: i64,
    pub comp_code: String,
}

impl From<InvoiceSummary> for InvoiceSummaryResponse {
    fn from(i: InvoiceSummary) -> Self {
        Self {
            id: i.id,
            comp_code: i.comp_code,
        }
    }
}

/// Single invoice response with the owning company embedded
#[derive(Serialize)]
pub struct InvoiceDetailResponse {
    pub invoice: InvoiceDetail,
}

#[derive(Serialize)]
pub struct InvoiceDetail {
    pub id: i64,
    pub amt: f64,
    pub paid: bool,
    pub add_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub company: CompanyResponse,
}

impl From<InvoiceWithCompany> for InvoiceDetailResponse {
    fn from(i: InvoiceWithCompany) -> Self {
        Self {
            invoice: InvoiceDetail {
                id: i.id,
                amt: i.amt,
                paid: i.paid,
                add_date: i.add_date,
                paid_date: i.paid_date,
                company: CompanyResponse::from(i.company),
            },
        }
    }
}

/// GET /invoices - list all invoices
async fn list_invoices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InvoiceListResponse>, ApiError> {
    let invoices = InvoiceRepo::new(&state.pool).list().await?;

    Ok(Json(InvoiceListResponse {
        invoices: invoices
            .into_iter()
            .map(InvoiceSummaryResponse::from)
            .collect(),
    }))
}

/// GET /invoices/{id} - get a single invoice with its company
async fn get_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceDetailResponse>, ApiError> {
    let invoice = InvoiceRepo::new(&state.pool).get(id).await?;
    Ok(Json(InvoiceDetailResponse::from(invoice)))
}

/// POST /invoices - create a new invoice
async fn create_invoice(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    // Amount is validated before any database call
    let amount = InvoiceAmount::new(req.amt)?;
    let invoice = InvoiceRepo::new(&state.pool)
        .create(&req.comp_code, amount)
        .await?;

    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(invoice))))
}

/// PUT /invoices/{id} - update an invoice's amount
async fn update_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let amount = InvoiceAmount::new(req.amt)?;
    let invoice = InvoiceRepo::new(&state.pool)
        .update_amount(id, amount)
        .await?;

    Ok(Json(InvoiceResponse::from(invoice)))
}

/// DELETE /invoices/{id} - delete an invoice
async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    InvoiceRepo::new(&state.pool).delete(id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// Invoice routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/{id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}
