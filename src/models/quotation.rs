use super::{DraftSnapshot, LineItem, Totals, Unit};
use crate::error::{QuoteError, QuoteResult};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 报价单主表 (quotations)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuotationRecord {
    pub id: i64,
    pub quote_no: String,
    pub date: NaiveDate,
    pub customer_id: i64,
    pub subtotal: BigDecimal,
    pub gst_amount: BigDecimal,
    pub grand_total: BigDecimal,
    pub status: String,
}

/// 报价单明细 (quotation_items)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuotationItemRecord {
    pub item_name: String,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub rate: BigDecimal,
    pub amount: BigDecimal,
}

/// 已保存的报价单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQuotation {
    pub header: QuotationRecord,
    pub items: Vec<QuotationItemRecord>,
}

impl SavedQuotation {
    /// 还原为草稿快照
    ///
    /// 金额按 quantity * rate 重算，汇总由重算后的明细推导，与主表不一致时只记录告警。
    pub fn to_snapshot(&self, tax_rate: &BigDecimal) -> QuoteResult<DraftSnapshot> {
        let quote_no = &self.header.quote_no;
        let mut items = Vec::with_capacity(self.items.len());
        for row in &self.items {
            let unit: Unit = row.unit.parse().map_err(|reason| QuoteError::CorruptQuotation {
                quote_no: quote_no.clone(),
                reason,
            })?;
            let item = LineItem::new(
                row.item_name.clone(),
                row.description.clone(),
                row.quantity.clone(),
                unit,
                row.rate.clone(),
            );
            if item.amount != row.amount {
                tracing::warn!(
                    "Quotation {}: stored amount {} for {} does not match {}",
                    quote_no, row.amount, row.item_name, item.amount
                );
            }
            items.push(item);
        }

        let totals = Totals::compute(&items, tax_rate);
        if totals.subtotal != self.header.subtotal || totals.grand_total != self.header.grand_total {
            tracing::warn!(
                "Quotation {}: stored totals {}/{} replaced by {}/{}",
                quote_no,
                self.header.subtotal,
                self.header.grand_total,
                totals.subtotal,
                totals.grand_total
            );
        }

        Ok(DraftSnapshot {
            customer_id: self.header.customer_id,
            items,
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            grand_total: totals.grand_total,
        })
    }
}

/// 按日期生成报价单号: QT-YYYYMMDD-NNN
pub fn format_quote_number(date: NaiveDate, sequence: i64) -> String {
    format!("QT-{}-{:03}", date.format("%Y%m%d"), sequence)
}

/// 当日报价单号前缀 (用于 LIKE 计数)
pub fn quote_number_prefix(date: NaiveDate) -> String {
    format!("QT-{}-", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn gst() -> BigDecimal {
        BigDecimal::from_str("0.18").unwrap()
    }

    fn fan_row(amount: i64) -> QuotationItemRecord {
        QuotationItemRecord {
            item_name: "Ceiling Fan".to_string(),
            description: "1200mm with regulator".to_string(),
            quantity: BigDecimal::from(2),
            unit: "piece".to_string(),
            rate: BigDecimal::from(1500),
            amount: BigDecimal::from(amount),
        }
    }

    #[test]
    fn test_quote_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(format_quote_number(date, 1), "QT-20261018-001");
        assert_eq!(format_quote_number(date, 42), "QT-20261018-042");
        assert_eq!(format_quote_number(date, 1234), "QT-20261018-1234");
        assert_eq!(quote_number_prefix(date), "QT-20261018-");
    }

    #[test]
    fn test_saved_quotation_to_snapshot() {
        let saved = SavedQuotation {
            header: QuotationRecord {
                id: 1,
                quote_no: "QT-20261018-001".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                customer_id: 3,
                subtotal: BigDecimal::from(3000),
                gst_amount: BigDecimal::from(540),
                grand_total: BigDecimal::from(3540),
                status: "Draft".to_string(),
            },
            items: vec![fan_row(3000)],
        };

        let snap = saved.to_snapshot(&gst()).unwrap();
        assert_eq!(snap.customer_id, 3);
        assert_eq!(snap.items[0].unit, Unit::Piece);
        assert_eq!(snap.items[0].amount, BigDecimal::from(3000));
        assert_eq!(snap.tax_amount, BigDecimal::from(540));
    }

    #[test]
    fn test_drifted_amounts_do_not_leak_into_totals() {
        let saved = SavedQuotation {
            header: QuotationRecord {
                id: 2,
                quote_no: "QT-20261018-003".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                customer_id: 3,
                subtotal: BigDecimal::from(3001),
                gst_amount: BigDecimal::from_str("540.18").unwrap(),
                grand_total: BigDecimal::from_str("3541.18").unwrap(),
                status: "Draft".to_string(),
            },
            items: vec![fan_row(3001)],
        };

        let snap = saved.to_snapshot(&gst()).unwrap();
        let sum = snap
            .items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + &item.amount);

        assert_eq!(sum, BigDecimal::from(3000));
        assert_eq!(snap.subtotal, sum);
        assert_eq!(snap.tax_amount, BigDecimal::from(540));
        assert_eq!(snap.grand_total, BigDecimal::from(3540));
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let saved = SavedQuotation {
            header: QuotationRecord {
                id: 1,
                quote_no: "QT-20261018-002".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                customer_id: 3,
                subtotal: BigDecimal::from(10),
                gst_amount: BigDecimal::from(0),
                grand_total: BigDecimal::from(10),
                status: "Draft".to_string(),
            },
            items: vec![QuotationItemRecord {
                item_name: "Sand".to_string(),
                description: String::new(),
                quantity: BigDecimal::from(1),
                unit: "bag".to_string(),
                rate: BigDecimal::from(10),
                amount: BigDecimal::from(10),
            }],
        };

        match saved.to_snapshot(&gst()) {
            Err(QuoteError::CorruptQuotation { quote_no, reason }) => {
                assert_eq!(quote_no, "QT-20261018-002");
                assert!(reason.contains("bag"));
            }
            other => panic!("expected corrupt quotation, got {:?}", other),
        }
    }
}
