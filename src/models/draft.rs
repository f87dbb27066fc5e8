use super::{CustomerRef, LineItem, Totals, Unit};
use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 合并键: 名称相同但单价不同视为不同明细
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemKey {
    name: String,
    rate: BigDecimal,
}

/// 一次提交的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalOutcome {
    Added,
    Merged,
    Ignored,
}

/// 明细聚合器 - 按 (name, rate) 保序合并
#[derive(Debug, Clone, Default)]
pub struct ItemAggregator {
    items: IndexMap<ItemKey, LineItem>,
}

impl ItemAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交一条候选明细
    ///
    /// 数量 <= 0 或单价为负时忽略；已存在同键明细时累加数量、重算金额并覆盖描述；
    /// 否则追加到末尾。
    pub fn propose(
        &mut self,
        name: &str,
        description: &str,
        quantity: BigDecimal,
        unit: Unit,
        rate: BigDecimal,
    ) -> ProposalOutcome {
        if quantity <= BigDecimal::zero() {
            return ProposalOutcome::Ignored;
        }
        if rate < BigDecimal::zero() {
            tracing::warn!("Ignoring {} with negative rate {}", name, rate);
            return ProposalOutcome::Ignored;
        }

        let key = ItemKey {
            name: name.to_string(),
            rate: rate.clone(),
        };

        if let Some(existing) = self.items.get_mut(&key) {
            existing.add_quantity(&quantity);
            existing.description = description.to_string();
            tracing::debug!("Updated {} +{}", name, quantity);
            return ProposalOutcome::Merged;
        }

        tracing::debug!("Added {} x{}", name, quantity);
        self.items
            .insert(key, LineItem::new(name, description, quantity, unit, rate));
        ProposalOutcome::Added
    }

    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 报价草稿
///
/// 每次提交后立即重算汇总，外部读取到的汇总永远与明细一致。
#[derive(Debug, Clone)]
pub struct QuotationDraft {
    customer: CustomerRef,
    tax_rate: BigDecimal,
    items: ItemAggregator,
    totals: Totals,
}

impl QuotationDraft {
    pub fn new(customer: CustomerRef, tax_rate: BigDecimal) -> Self {
        Self {
            customer,
            tax_rate,
            items: ItemAggregator::new(),
            totals: Totals::zero(),
        }
    }

    pub fn propose(
        &mut self,
        name: &str,
        description: &str,
        quantity: BigDecimal,
        unit: Unit,
        rate: BigDecimal,
    ) -> ProposalOutcome {
        let outcome = self.items.propose(name, description, quantity, unit, rate);
        if outcome != ProposalOutcome::Ignored {
            self.totals = Totals::compute(self.items.items(), &self.tax_rate);
        }
        outcome
    }

    pub fn customer_reference(&self) -> CustomerRef {
        self.customer
    }

    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.items()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn subtotal(&self) -> &BigDecimal {
        &self.totals.subtotal
    }

    pub fn tax_amount(&self) -> &BigDecimal {
        &self.totals.tax_amount
    }

    pub fn grand_total(&self) -> &BigDecimal {
        &self.totals.grand_total
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            customer_id: self.customer.0,
            items: self.items().cloned().collect(),
            subtotal: self.totals.subtotal.clone(),
            tax_amount: self.totals.tax_amount.clone(),
            grand_total: self.totals.grand_total.clone(),
        }
    }
}

/// 草稿快照 - 交给持久化与导出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub customer_id: i64,
    pub items: Vec<LineItem>,
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    pub grand_total: BigDecimal,
}
