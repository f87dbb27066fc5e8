use super::LineItem;
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 金额汇总 (小计 / 税额 / 总计)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    pub grand_total: BigDecimal,
}

impl Totals {
    pub fn zero() -> Self {
        Self {
            subtotal: BigDecimal::zero(),
            tax_amount: BigDecimal::zero(),
            grand_total: BigDecimal::zero(),
        }
    }

    /// 统一税率计算，不读取任何明细级税率
    pub fn compute<'a, I>(items: I, tax_rate: &BigDecimal) -> Self
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        let subtotal = items
            .into_iter()
            .fold(BigDecimal::zero(), |acc, item| acc + &item.amount);
        let tax_amount = (&subtotal * tax_rate).round(2);
        let grand_total = &subtotal + &tax_amount;

        Self {
            subtotal,
            tax_amount,
            grand_total,
        }
    }
}

impl Default for Totals {
    fn default() -> Self {
        Self::zero()
    }
}
