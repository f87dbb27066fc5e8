use bigdecimal::BigDecimal;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// 超过该秒数的语句记为慢查询
    pub slow_statement_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: 10,
            acquire_timeout_secs: 10,
            slow_statement_secs: 2,
        }
    }
}

fn default_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/contractor_quote".to_string())
}

/// 规则引擎参数
///
/// 比例类参数使用整数百分比，避免浮点误差进入金额。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// 统一税率 (GST)
    pub tax_rate_percent: u32,
    /// 抽取数量的合理区间
    pub min_quantity: u32,
    pub max_quantity: u32,
    /// 2.5 sq.mm 重载线按主线数量的百分比
    pub secondary_wire_percent: u32,
    /// 无主线数量时的重载线默认米数
    pub secondary_wire_default: u32,
    /// 线管按主线数量的百分比
    pub conduit_percent: u32,
    /// 每个人工点位对应的面积 (sqft)
    pub area_per_labour_point: u32,
    pub min_labour_points: u32,
    /// 无面积时每条明细折算的人工点位
    pub labour_points_per_item: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tax_rate_percent: 18,
            min_quantity: 1,
            max_quantity: 9999,
            secondary_wire_percent: 60,
            secondary_wire_default: 50,
            conduit_percent: 80,
            area_per_labour_point: 150,
            min_labour_points: 5,
            labour_points_per_item: 1,
        }
    }
}

impl EngineSettings {
    pub fn tax_rate(&self) -> BigDecimal {
        BigDecimal::from(self.tax_rate_percent) / BigDecimal::from(100)
    }
}

impl AppConfig {
    /// 加载配置: 内置默认值 -> quote-engine.toml (可选) -> QUOTE__* 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database.url", default_database_url())?
            .add_source(File::with_name("quote-engine").required(false))
            .add_source(
                Environment::with_prefix("QUOTE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_engine_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.tax_rate(), BigDecimal::from_str("0.18").unwrap());
        assert_eq!(settings.max_quantity, 9999);
        assert_eq!(settings.min_labour_points, 5);
    }

    #[test]
    fn test_partial_engine_section_keeps_defaults() {
        let settings: EngineSettings =
            serde_json::from_str(r#"{ "tax_rate_percent": 12 }"#).unwrap();
        assert_eq!(settings.tax_rate(), BigDecimal::from_str("0.12").unwrap());
        assert_eq!(settings.area_per_labour_point, 150);
    }

    #[test]
    fn test_database_section_partial_override() {
        let db: DatabaseConfig =
            serde_json::from_str(r#"{ "url": "postgres://db/quotes", "max_connections": 4 }"#).unwrap();
        assert_eq!(db.url, "postgres://db/quotes");
        assert_eq!(db.max_connections, 4);
        assert_eq!(db.slow_statement_secs, 2);
    }

    #[test]
    fn test_server_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
