use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 计量单位 (固定词表)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Meter,
    Piece,
    Point,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Meter => "meter",
            Unit::Piece => "piece",
            Unit::Point => "point",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meter" | "meters" | "m" | "mtr" => Ok(Unit::Meter),
            "piece" | "pieces" | "pc" | "pcs" | "nos" => Ok(Unit::Piece),
            "point" | "points" | "pt" => Ok(Unit::Point),
            other => Err(format!("unknown unit '{}'. Use meter, piece or point", other)),
        }
    }
}

/// 报价明细行
///
/// `amount` 始终等于 `quantity * rate`，只能通过 [`LineItem::new`] 与
/// [`LineItem::add_quantity`] 产生。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: Unit,
    pub rate: BigDecimal,
    pub amount: BigDecimal,
}

impl LineItem {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        quantity: BigDecimal,
        unit: Unit,
        rate: BigDecimal,
    ) -> Self {
        let amount = &quantity * &rate;
        Self {
            name: name.into(),
            description: description.into(),
            quantity,
            unit,
            rate,
            amount,
        }
    }

    /// 累加数量并重算金额
    pub fn add_quantity(&mut self, quantity: &BigDecimal) {
        self.quantity = &self.quantity + quantity;
        self.amount = &self.quantity * &self.rate;
    }
}
