use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 物料目录 (materials)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub default_rate: BigDecimal,
    pub default_unit: String,
}
