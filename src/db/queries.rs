use crate::models::{
    format_quote_number, quote_number_prefix, Customer, Material, QuotationDraft,
    QuotationItemRecord, QuotationRecord, SavedQuotation,
};
use chrono::NaiveDate;
use sqlx::PgPool;

/// 查询客户档案
pub async fn get_customer(
    pool: &PgPool,
    customer_id: i64,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, phone, address, gstin
        FROM customers
        WHERE id = $1
        "#
    )
    .bind(customer_id)
    .fetch_optional(pool)
    .await
}

/// 加载物料目录 (默认单价 / 单位)
pub async fn list_materials(pool: &PgPool) -> Result<Vec<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(
        r#"
        SELECT name, default_rate, default_unit
        FROM materials
        ORDER BY name
        "#
    )
    .fetch_all(pool)
    .await
}

/// 保存报价草稿，返回分配的报价单号
///
/// 单号按日期递增 (QT-YYYYMMDD-NNN)，主表与明细在同一事务中写入。
pub async fn save_quotation(
    pool: &PgPool,
    draft: &QuotationDraft,
    date: NaiveDate,
) -> Result<String, sqlx::Error> {
    let start_time = std::time::Instant::now();
    let mut tx = pool.begin().await?;

    let prefix = quote_number_prefix(date);
    let existing: i64 = sqlx::query_scalar(
        r#"
        SELECT count(*)
        FROM quotations
        WHERE quote_no LIKE $1
        "#
    )
    .bind(format!("{}%", prefix))
    .fetch_one(&mut *tx)
    .await?;
    let quote_no = format_quote_number(date, existing + 1);

    let quotation_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quotations (quote_no, date, customer_id, subtotal, gst_amount, grand_total, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'Draft')
        RETURNING id
        "#
    )
    .bind(&quote_no)
    .bind(date)
    .bind(draft.customer_reference().0)
    .bind(draft.subtotal().clone())
    .bind(draft.tax_amount().clone())
    .bind(draft.grand_total().clone())
    .fetch_one(&mut *tx)
    .await?;

    if !draft.is_empty() {
        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO quotation_items (
                quotation_id, item_name, description, quantity, unit, rate, amount
            ) "
        );

        query_builder.push_values(draft.items(), |mut b, item| {
            b.push_bind(quotation_id)
                .push_bind(item.name.clone())
                .push_bind(item.description.clone())
                .push_bind(item.quantity.clone())
                .push_bind(item.unit.as_str())
                .push_bind(item.rate.clone())
                .push_bind(item.amount.clone());
        });

        query_builder.build().execute(&mut *tx).await?;
    }

    match tx.commit().await {
        Ok(()) => {
            tracing::info!(
                "✓ Quotation {} saved, {} items, 耗时: {:?}",
                quote_no,
                draft.item_count(),
                start_time.elapsed()
            );
            Ok(quote_no)
        }
        Err(e) => {
            tracing::error!("✗ Quotation {} commit failed: {:?}", quote_no, e);
            Err(e)
        }
    }
}

/// 按报价单号读取已保存的报价单
pub async fn load_quotation(
    pool: &PgPool,
    quote_no: &str,
) -> Result<Option<SavedQuotation>, sqlx::Error> {
    let header = sqlx::query_as::<_, QuotationRecord>(
        r#"
        SELECT id, quote_no, date, customer_id, subtotal, gst_amount, grand_total, status
        FROM quotations
        WHERE quote_no = $1
        "#
    )
    .bind(quote_no)
    .fetch_optional(pool)
    .await?;

    let Some(header) = header else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, QuotationItemRecord>(
        r#"
        SELECT item_name, description, quantity, unit, rate, amount
        FROM quotation_items
        WHERE quotation_id = $1
        ORDER BY id
        "#
    )
    .bind(header.id)
    .fetch_all(pool)
    .await?;

    Ok(Some(SavedQuotation { header, items }))
}
