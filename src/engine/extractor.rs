//! 数量抽取
//!
//! 在规范化文本中查找 "<整数><可选空白><触发词>" 并累加。触发词按子串匹配，
//! `light` 同样命中 `lights`。多个触发词命中同一个数字时会重复计数。
//! 每组触发词的正则只在 [`TermSet::new`] 中编译一次。

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 超出合理区间被丢弃的数量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub term: String,
    pub raw: String,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "discarded implausible quantity {} before '{}'", self.raw, self.term)
    }
}

/// 一组触发词及其预编译的数量正则
#[derive(Debug, Clone)]
pub struct TermSet {
    patterns: Vec<(&'static str, Regex)>,
}

impl TermSet {
    pub fn new(terms: &[&'static str]) -> Self {
        let patterns = terms
            .iter()
            .filter_map(|term| {
                match Regex::new(&format!(r"(\d+)\s*{}", regex::escape(term))) {
                    Ok(re) => Some((*term, re)),
                    Err(e) => {
                        tracing::warn!("Skipping trigger term '{}': {}", term, e);
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn terms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.patterns.iter().map(|(term, _)| *term)
    }

    /// 文本中出现任一触发词 (子串)
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.terms().any(|term| text.contains(term))
    }
}

#[derive(Debug, Clone)]
pub struct QuantityExtractor {
    min: u32,
    max: u32,
}

impl Default for QuantityExtractor {
    fn default() -> Self {
        Self::new(1, 9999)
    }
}

impl QuantityExtractor {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// 累加所有触发词前的合法数量，无命中时返回 0
    pub fn extract(&self, text: &str, terms: &TermSet, warnings: &mut Vec<ExtractionWarning>) -> u32 {
        let mut total: u32 = 0;

        for (term, re) in &terms.patterns {
            for cap in re.captures_iter(text) {
                let raw = &cap[1];
                match raw.parse::<u32>() {
                    Ok(value) if value >= self.min && value <= self.max => {
                        total = total.saturating_add(value);
                    }
                    _ => {
                        tracing::warn!("Discarded quantity {} before '{}'", raw, term);
                        warnings.push(ExtractionWarning {
                            term: term.to_string(),
                            raw: raw.to_string(),
                        });
                    }
                }
            }
        }

        total
    }
}
