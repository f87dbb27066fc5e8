use crate::engine::{ExtractionWarning, RuleHit};
use crate::error::QuoteError;
use crate::models::{Customer, DraftSnapshot};
use crate::service::{PreviewEntry, QuoteService};
use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 客户 + 项目描述
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub customer_id: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub save: bool,
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub message: String,
    pub quote_no: Option<String>,
    pub customer: Option<Customer>,
    pub draft: Option<DraftSnapshot>,
    pub warnings: Vec<ExtractionWarning>,
    pub rules: Vec<RuleHit>,
}

impl GenerateResponse {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            quote_no: None,
            customer: None,
            draft: None,
            warnings: Vec::new(),
            rules: Vec::new(),
        }
    }
}

/// 批量预览请求
#[derive(Debug, Deserialize)]
pub struct BatchPreviewRequest {
    pub customer_id: i64,
    pub descriptions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchPreviewResponse {
    pub success: bool,
    pub message: String,
    pub entries: Option<Vec<PreviewEntry>>,
}

/// 错误 -> HTTP 状态码
pub fn status_for(error: &QuoteError) -> StatusCode {
    match error {
        QuoteError::CustomerNotFound(_) | QuoteError::QuotationNotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_rejection() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 描述文本生成报价
pub async fn generate_quote(
    State(service): State<Arc<QuoteService>>,
    Json(req): Json<GenerateRequest>,
) -> Response {
    match service.generate(req.customer_id, req.description, req.save).await {
        Ok(outcome) => {
            let message = match &outcome.quote_no {
                Some(no) => format!("Quotation {} saved with {} items", no, outcome.draft.items.len()),
                None => format!("Generated {} items", outcome.draft.items.len()),
            };
            let response = GenerateResponse {
                success: true,
                message,
                quote_no: outcome.quote_no,
                customer: Some(outcome.customer),
                draft: Some(outcome.draft),
                warnings: outcome.warnings,
                rules: outcome.rules,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            if !e.is_rejection() {
                tracing::error!("Quote generation failed: {}", e);
            }
            let status = status_for(&e);
            (status, Json(GenerateResponse::failure(format!("Error: {}", e)))).into_response()
        }
    }
}

/// 批量预览 (不落库)
pub async fn preview_batch(
    State(service): State<Arc<QuoteService>>,
    Json(req): Json<BatchPreviewRequest>,
) -> Response {
    let count = req.descriptions.len();
    match service.preview_batch(req.customer_id, req.descriptions).await {
        Ok(entries) => {
            let response = BatchPreviewResponse {
                success: true,
                message: format!("Previewed {} descriptions", count),
                entries: Some(entries),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = BatchPreviewResponse {
                success: false,
                message: format!("Error: {}", e),
                entries: None,
            };
            (status_for(&e), Json(response)).into_response()
        }
    }
}

/// 导出已保存报价单 CSV
pub async fn export_quote_csv(
    State(service): State<Arc<QuoteService>>,
    Path(quote_no): Path<String>,
) -> Response {
    match service.export_csv(&quote_no).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            if !e.is_rejection() {
                tracing::error!("CSV export of {} failed: {}", quote_no, e);
            }
            (status_for(&e), format!("Error: {}", e)).into_response()
        }
    }
}
