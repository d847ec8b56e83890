//! Company endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::repos::{Company, CompanyRepo, CompanySummary, CompanyWithInvoices, DbError};
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::models::{CompanyCode, CompanyName};

/// Create company request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCompanyRequest {
    pub code: String,
    pub name: String,
    pub description: String,
}

/// Update company request. The code is immutable and comes from the path.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCompanyRequest {
    pub name: String,
    pub description: String,
}

/// Company response
#[derive(Serialize)]
pub struct CompanyResponse {
    pub code: String,
    pub name: String,
    pub description: String,
}

impl From<Company> for CompanyResponse {
    fn from(c: Company) -> Self {
        Self {
            code: c.code,
            name: c.name,
            description: c.description,
        }
    }
}

/// Company list response
#[derive(Serialize)]
pub struct CompanyListResponse {
    pub companies: Vec<CompanySummaryResponse>,
}

/// Company list entry
#[derive(Serialize)]
pub struct CompanySummaryResponse {
    pub code: String,
    pub name: String,
}

impl From<CompanySummary> for CompanySummaryResponse {
    fn from(c: CompanySummary) -> Self {
        Self {
            code: c.code,
            name: c.name,
        }
    }
}

/// Single company response with embedded invoice ids
#[derive(Serialize)]
pub struct CompanyDetailResponse {
    pub company: CompanyDetail,
}

#[derive(Serialize)]
pub struct CompanyDetail {
    pub code: String,
    pub name: String,
    pub description: String,
    pub invoices: Vec<InvoiceId>,
}

#[derive(Serialize)]
pub struct InvoiceId {
    pub id: i64,
}

impl From<CompanyWithInvoices> for CompanyDetailResponse {
    fn from(c: CompanyWithInvoices) -> Self {
        Self {
            company: CompanyDetail {
                code: c.code,
                name: c.name,
                description: c.description,
                invoices: c.invoice_ids.into_iter().map(|id| InvoiceId { id }).collect(),
            },
        }
    }
}

/// GET /companies - list all companies
async fn list_companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CompanyListResponse>, ApiError> {
    let companies = CompanyRepo::new(&state.pool).list().await?;

    Ok(Json(CompanyListResponse {
        companies: companies
            .into_iter()
            .map(CompanySummaryResponse::from)
            .collect(),
    }))
}

/// GET /companies/{code} - get a single company with its invoice ids
async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<CompanyDetailResponse>, ApiError> {
    let company = CompanyRepo::new(&state.pool).get(&code).await?;
    Ok(Json(CompanyDetailResponse::from(company)))
}

/// POST /companies - create a new company
async fn create_company(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let code = CompanyCode::new(&req.code)?;
    let name = CompanyName::new(&req.name)?;
    let company = CompanyRepo::new(&state.pool)
        .create(code, name, req.description)
        .await?;

    Ok((StatusCode::CREATED, Json(CompanyResponse::from(company))))
}

/// PATCH /companies/{code} - update a company's name and description
async fn update_company(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    ApiJson(req): ApiJson<UpdateCompanyRequest>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let name = CompanyName::new(&req.name)?;
    let company = CompanyRepo::new(&state.pool)
        .update(&code, name, req.description)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => ApiError::from(e),
            // any other write failure is reported as a name collision
            _ => ApiError::Conflict {
                message: "Company name already exists",
            },
        })?;

    Ok(Json(CompanyResponse::from(company)))
}

/// DELETE /companies/{code} - delete a company
async fn delete_company(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    CompanyRepo::new(&state.pool).delete(&code).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// Company routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/{code}",
            get(get_company)
                .patch(update_company)
                .delete(delete_company),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_response_embeds_invoice_ids() {
        let detail = CompanyDetailResponse::from(CompanyWithInvoices {
            code: "acme".into(),
            name: "Acme Corp".into(),
            description: "Widgets".into(),
            invoice_ids: vec![1, 2],
        });

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "company": {
                    "code": "acme",
                    "name": "Acme Corp",
                    "description": "Widgets",
                    "invoices": [{"id": 1}, {"id": 2}]
                }
            })
        );
    }

    #[test]
    fn list_response_is_code_name_pairs() {
        let list = CompanyListResponse {
            companies: vec![CompanySummaryResponse {
                code: "acme".into(),
                name: "Acme Corp".into(),
            }],
        };

        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "companies": [{"code": "acme", "name": "Acme Corp"}]
            })
        );
    }

    #[test]
    fn update_request_rejects_unknown_fields() {
        let err = serde_json::from_value::<UpdateCompanyRequest>(serde_json::json!({
            "name": "Acme Corp",
            "description": "Widgets",
            "code": "acme"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }
}
