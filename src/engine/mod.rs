pub mod extractor;
pub mod rates;
pub mod rules;

pub use extractor::{ExtractionWarning, QuantityExtractor, TermSet};
pub use rates::{CatalogEntry, CatalogSnapshot, Material, MaterialCatalog, RateEntry, RateTable};
pub use rules::{RuleContext, RuleEnv, RULES};

use crate::config::EngineSettings;
use crate::error::{QuoteError, QuoteResult};
use crate::models::{CustomerRef, QuotationDraft};
use serde::Serialize;

/// 某条规则产出的明细，用于审计 "哪些词产生了哪一行"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub rule: &'static str,
    pub items: Vec<String>,
}

/// 一次生成的完整结果
#[derive(Debug, Clone)]
pub struct GeneratedQuote {
    pub draft: QuotationDraft,
    pub warnings: Vec<ExtractionWarning>,
    pub hits: Vec<RuleHit>,
}

/// 规范化: 去首尾空白并转小写
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 前置条件: 必须绑定客户且描述非空
pub fn check_preconditions(customer: Option<CustomerRef>, description: &str) -> QuoteResult<CustomerRef> {
    let customer = customer.ok_or(QuoteError::CustomerNotBound)?;
    if description.trim().is_empty() {
        return Err(QuoteError::EmptyDescription);
    }
    Ok(customer)
}

/// 报价规则引擎
///
/// 无跨调用状态，每次 [`QuoteEngine::generate`] 都从空草稿开始。
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    rates: RateTable,
    settings: EngineSettings,
    extractor: QuantityExtractor,
}

impl Default for QuoteEngine {
    fn default() -> Self {
        Self::new(RateTable::builtin(), EngineSettings::default())
    }
}

impl QuoteEngine {
    pub fn new(rates: RateTable, settings: EngineSettings) -> Self {
        let extractor = QuantityExtractor::new(settings.min_quantity, settings.max_quantity);
        Self {
            rates,
            settings,
            extractor,
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// 描述文本 -> 报价草稿
    pub fn generate(&self, customer: Option<CustomerRef>, description: &str) -> QuoteResult<GeneratedQuote> {
        let customer = check_preconditions(customer, description)?;
        let text = normalize(description);

        let mut draft = QuotationDraft::new(customer, self.settings.tax_rate());
        let env = RuleEnv {
            rates: &self.rates,
            settings: &self.settings,
        };
        let mut ctx = RuleContext::new(&text, &self.extractor);
        let mut hits = Vec::new();

        for rule in RULES.iter() {
            (rule.apply)(&mut ctx, &env, &mut draft);
            let items = ctx.take_emitted();
            if !items.is_empty() {
                tracing::debug!("Rule {} emitted {:?}", rule.name, items);
                hits.push(RuleHit {
                    rule: rule.name,
                    items,
                });
            }
        }

        let warnings = ctx.into_warnings();
        if !warnings.is_empty() {
            tracing::warn!(
                "Customer {}: {} implausible quantities discarded",
                customer, warnings.len()
            );
        }

        tracing::info!(
            "Customer {}: generated {} items, subtotal {}, grand total {}",
            customer,
            draft.item_count(),
            draft.subtotal(),
            draft.grand_total()
        );

        Ok(GeneratedQuote {
            draft,
            warnings,
            hits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  20 LED Lights \n"), "20 led lights");
    }

    #[test]
    fn test_rejects_missing_customer() {
        let engine = QuoteEngine::default();
        let err = engine.generate(None, "10 sockets").unwrap_err();
        assert!(matches!(err, QuoteError::CustomerNotBound));
    }

    #[test]
    fn test_rejects_blank_description() {
        let engine = QuoteEngine::default();
        assert!(matches!(
            engine.generate(Some(CustomerRef(1)), "").unwrap_err(),
            QuoteError::EmptyDescription
        ));
        assert!(matches!(
            engine.generate(Some(CustomerRef(1)), "   \n\t").unwrap_err(),
            QuoteError::EmptyDescription
        ));
    }

    #[test]
    fn test_deterministic_output() {
        let engine = QuoteEngine::default();
        let text = "2 BHK flat wiring, 10 lights, 8 sockets, 4 fans, modular switches";
        let a = engine.generate(Some(CustomerRef(5)), text).unwrap();
        let b = engine.generate(Some(CustomerRef(5)), text).unwrap();

        assert_eq!(a.draft.snapshot(), b.draft.snapshot());
        assert_eq!(a.hits, b.hits);
    }

    #[test]
    fn test_rule_hits_audit_trail() {
        let engine = QuoteEngine::default();
        let quote = engine.generate(Some(CustomerRef(5)), "3 fans").unwrap();

        assert_eq!(
            quote.hits,
            vec![
                RuleHit { rule: "fans", items: vec!["Ceiling Fan".to_string()] },
                RuleHit { rule: "labour", items: vec!["Electrical Labour".to_string()] },
            ]
        );
    }

    #[test]
    fn test_warnings_returned() {
        let engine = QuoteEngine::default();
        let quote = engine.generate(Some(CustomerRef(5)), "0 fans and 3 fans").unwrap();
        assert_eq!(quote.warnings.len(), 1);
        let fan = quote.draft.items().find(|i| i.name == "Ceiling Fan").unwrap();
        assert_eq!(fan.quantity, BigDecimal::from(3));
    }

    #[test]
    fn test_tax_rate_from_settings() {
        let settings = EngineSettings {
            tax_rate_percent: 5,
            ..EngineSettings::default()
        };
        let engine = QuoteEngine::new(RateTable::builtin(), settings);
        let quote = engine.generate(Some(CustomerRef(1)), "1 fan").unwrap();

        // 1500 + 5 x 300 人工
        assert_eq!(quote.draft.subtotal(), &BigDecimal::from(3000));
        assert_eq!(quote.draft.tax_amount(), &BigDecimal::from(150));
    }
}
