use crate::config::EngineSettings;
use crate::db::queries;
use crate::engine::{
    check_preconditions, CatalogSnapshot, ExtractionWarning, QuoteEngine, RateTable, RuleHit,
};
use crate::error::{QuoteError, QuoteResult};
use crate::models::{Customer, CustomerRef, DraftSnapshot};
use crate::service::export;
use chrono::Local;
use rayon::prelude::*;
use serde::Serialize;
use sqlx::PgPool;

/// 一次生成的结果 (含审计信息)
#[derive(Debug, Clone, Serialize)]
pub struct QuoteOutcome {
    pub quote_no: Option<String>,
    pub customer: Customer,
    pub draft: DraftSnapshot,
    pub warnings: Vec<ExtractionWarning>,
    pub rules: Vec<RuleHit>,
}

/// 批量预览中的单条结果
#[derive(Debug, Clone, Serialize)]
pub struct PreviewEntry {
    pub description: String,
    pub draft: Option<DraftSnapshot>,
    pub warnings: Vec<ExtractionWarning>,
    pub error: Option<String>,
}

/// 报价服务
///
/// 客户与物料目录在规则运行前读取，保存在规则运行后进行；
/// 规则本身在阻塞线程上一次性跑完，不对外暴露半成品草稿。
pub struct QuoteService {
    pool: PgPool,
    settings: EngineSettings,
}

impl QuoteService {
    pub fn new(pool: PgPool, settings: EngineSettings) -> Self {
        Self { pool, settings }
    }

    async fn load_customer(&self, customer_id: i64) -> QuoteResult<Customer> {
        queries::get_customer(&self.pool, customer_id)
            .await?
            .ok_or(QuoteError::CustomerNotFound(customer_id))
    }

    /// 以当前物料目录快照构建引擎
    async fn build_engine(&self) -> QuoteResult<QuoteEngine> {
        let materials = queries::list_materials(&self.pool).await?;
        let catalog = CatalogSnapshot::from_materials(materials);
        tracing::debug!("Loaded catalog snapshot with {} materials", catalog.len());

        let rates = RateTable::with_catalog(&catalog)?;
        Ok(QuoteEngine::new(rates, self.settings.clone()))
    }

    /// 生成报价，`save` 为真时同时落库并分配单号
    pub async fn generate(
        &self,
        customer_id: Option<i64>,
        description: String,
        save: bool,
    ) -> QuoteResult<QuoteOutcome> {
        // 先校验输入，避免无效请求访问数据库
        let customer_ref = check_preconditions(customer_id.map(CustomerRef), &description)?;
        let customer = self.load_customer(customer_ref.0).await?;
        let engine = self.build_engine().await?;

        let generated = tokio::task::spawn_blocking(move || {
            engine.generate(Some(customer_ref), &description)
        })
        .await
        .map_err(|e| QuoteError::Worker(e.to_string()))??;

        let quote_no = if save {
            let today = Local::now().date_naive();
            Some(queries::save_quotation(&self.pool, &generated.draft, today).await?)
        } else {
            None
        };

        tracing::info!(
            "Quote for {} ready: {} items, {} warnings, saved as {:?}",
            customer.display_label(),
            generated.draft.item_count(),
            generated.warnings.len(),
            quote_no
        );

        Ok(QuoteOutcome {
            quote_no,
            customer,
            draft: generated.draft.snapshot(),
            warnings: generated.warnings,
            rules: generated.hits,
        })
    }

    /// 批量预览: 同一客户的多段描述并行生成，不落库
    pub async fn preview_batch(
        &self,
        customer_id: i64,
        descriptions: Vec<String>,
    ) -> QuoteResult<Vec<PreviewEntry>> {
        let customer = self.load_customer(customer_id).await?;
        let engine = self.build_engine().await?;
        let customer_ref = customer.reference();
        let total = descriptions.len();

        let entries = tokio::task::spawn_blocking(move || preview_all(&engine, customer_ref, descriptions))
            .await
            .map_err(|e| QuoteError::Worker(e.to_string()))?;

        let failed = entries.iter().filter(|e| e.error.is_some()).count();
        tracing::info!(
            "Batch preview for customer {}: {} descriptions, {} rejected",
            customer_id, total, failed
        );
        Ok(entries)
    }

    /// 导出已保存报价单为 CSV
    pub async fn export_csv(&self, quote_no: &str) -> QuoteResult<Vec<u8>> {
        let saved = queries::load_quotation(&self.pool, quote_no)
            .await?
            .ok_or_else(|| QuoteError::QuotationNotFound(quote_no.to_string()))?;
        let snapshot = saved.to_snapshot(&self.settings.tax_rate())?;
        export::snapshot_to_csv(&snapshot, Some(quote_no))
    }
}

/// 每段描述独立运行完整流水线，输出顺序与输入一致
pub fn preview_all(
    engine: &QuoteEngine,
    customer: CustomerRef,
    descriptions: Vec<String>,
) -> Vec<PreviewEntry> {
    descriptions
        .into_par_iter()
        .map(|description| match engine.generate(Some(customer), &description) {
            Ok(generated) => PreviewEntry {
                description,
                draft: Some(generated.draft.snapshot()),
                warnings: generated.warnings,
                error: None,
            },
            Err(e) => PreviewEntry {
                description,
                draft: None,
                warnings: Vec::new(),
                error: Some(e.to_string()),
            },
        })
        .collect()
}
