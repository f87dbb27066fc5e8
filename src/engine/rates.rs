//! 单价表
//!
//! 规则只引用 [`Material`]，名称、单位、单价都来自 [`RateTable`]。
//! 物料目录可以覆盖内置单价，覆盖值在构建单价表时校验。

use crate::error::{QuoteError, QuoteResult};
use crate::models::{self, Unit};
use bigdecimal::{BigDecimal, Zero};
use std::collections::HashMap;

/// 规则引擎可产出的物料
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    CopperWire1_5,
    CopperWire2_5,
    LedPanelLight,
    CeilingFan,
    Socket15A,
    Socket5A,
    ModularSwitch,
    Mcb6A,
    DistributionBox,
    IndustrialMcb63A,
    PvcConduit,
    ElectricalLabour,
}

impl Material {
    pub const ALL: [Material; 12] = [
        Material::CopperWire1_5,
        Material::CopperWire2_5,
        Material::LedPanelLight,
        Material::CeilingFan,
        Material::Socket15A,
        Material::Socket5A,
        Material::ModularSwitch,
        Material::Mcb6A,
        Material::DistributionBox,
        Material::IndustrialMcb63A,
        Material::PvcConduit,
        Material::ElectricalLabour,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Material::CopperWire1_5 => "1.5 sq.mm Copper Wire",
            Material::CopperWire2_5 => "2.5 sq.mm Copper Wire",
            Material::LedPanelLight => "LED Panel Light 18W",
            Material::CeilingFan => "Ceiling Fan",
            Material::Socket15A => "15A Socket",
            Material::Socket5A => "5A Socket",
            Material::ModularSwitch => "Modular Switch 1-Gang",
            Material::Mcb6A => "6A MCB",
            Material::DistributionBox => "Distribution Box 8-way",
            Material::IndustrialMcb63A => "Industrial MCB 63A",
            Material::PvcConduit => "20mm PVC Conduit",
            Material::ElectricalLabour => "Electrical Labour",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Material::CopperWire1_5 => "PVC insulated",
            Material::CopperWire2_5 => "Heavy duty",
            Material::LedPanelLight => "LED panel",
            Material::CeilingFan => "1200mm with regulator",
            Material::Socket15A => "power socket",
            Material::Socket5A => "switch socket",
            Material::ModularSwitch => "modular switch",
            Material::Mcb6A => "SP MCB",
            Material::DistributionBox => "DB",
            Material::IndustrialMcb63A => "3 phase MCB",
            Material::PvcConduit => "conduit pipe",
            Material::ElectricalLabour => "installation labour",
        }
    }

    fn default_unit(&self) -> Unit {
        match self {
            Material::CopperWire1_5 | Material::CopperWire2_5 | Material::PvcConduit => Unit::Meter,
            Material::ElectricalLabour => Unit::Point,
            _ => Unit::Piece,
        }
    }

    fn default_rate(&self) -> u32 {
        match self {
            Material::CopperWire1_5 => 48,
            Material::CopperWire2_5 => 65,
            Material::LedPanelLight => 450,
            Material::CeilingFan => 1500,
            Material::Socket15A => 150,
            Material::Socket5A => 120,
            Material::ModularSwitch => 180,
            Material::Mcb6A => 200,
            Material::DistributionBox => 800,
            Material::IndustrialMcb63A => 850,
            Material::PvcConduit => 30,
            Material::ElectricalLabour => 300,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// 单价表条目
#[derive(Debug, Clone, PartialEq)]
pub struct RateEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub unit: Unit,
    pub rate: BigDecimal,
}

impl RateEntry {
    fn builtin(material: Material) -> Self {
        Self {
            name: material.name(),
            description: material.description(),
            unit: material.default_unit(),
            rate: BigDecimal::from(material.default_rate()),
        }
    }
}

/// 物料目录中的默认单位与单价
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub unit: String,
    pub rate: BigDecimal,
}

/// 物料目录 (可选协作方)
pub trait MaterialCatalog {
    /// 按名称查找，名称不区分大小写
    fn lookup(&self, name: &str) -> Option<CatalogEntry>;
}

/// 物料目录快照，在规则运行前一次性加载
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    entries: HashMap<String, CatalogEntry>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_materials(rows: Vec<models::Material>) -> Self {
        let mut snapshot = Self::new();
        for row in rows {
            snapshot.insert(&row.name, &row.default_unit, row.default_rate);
        }
        snapshot
    }

    pub fn insert(&mut self, name: &str, unit: &str, rate: BigDecimal) {
        self.entries.insert(
            name.trim().to_lowercase(),
            CatalogEntry {
                unit: unit.to_string(),
                rate,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MaterialCatalog for CatalogSnapshot {
    fn lookup(&self, name: &str) -> Option<CatalogEntry> {
        self.entries.get(&name.trim().to_lowercase()).cloned()
    }
}

/// 规则使用的单价表
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    entries: [RateEntry; 12],
}

impl Default for RateTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RateTable {
    /// 内置默认单价
    pub fn builtin() -> Self {
        Self {
            entries: Material::ALL.map(RateEntry::builtin),
        }
    }

    /// 内置单价叠加物料目录覆盖值
    ///
    /// 目录中负单价或无法识别的单位直接拒绝，不会进入报价金额。
    pub fn with_catalog(catalog: &dyn MaterialCatalog) -> QuoteResult<Self> {
        let mut table = Self::builtin();
        let mut overridden = 0usize;

        for material in Material::ALL {
            let Some(entry) = catalog.lookup(material.name()) else {
                continue;
            };

            let unit: Unit = entry.unit.parse().map_err(|reason| {
                tracing::warn!("Rejected catalog entry {}: {}", material.name(), reason);
                QuoteError::InvalidCatalogEntry {
                    name: material.name().to_string(),
                    reason,
                }
            })?;
            table.set(material, unit, entry.rate)?;
            overridden += 1;
        }

        tracing::debug!("Rate table built, {} catalog overrides", overridden);
        Ok(table)
    }

    /// 覆盖单个物料的单位与单价
    pub fn set(&mut self, material: Material, unit: Unit, rate: BigDecimal) -> QuoteResult<()> {
        if rate < BigDecimal::zero() {
            tracing::warn!("Rejected negative rate {} for {}", rate, material.name());
            return Err(QuoteError::InvalidCatalogEntry {
                name: material.name().to_string(),
                reason: format!("negative rate {}", rate),
            });
        }

        let entry = &mut self.entries[material.index()];
        entry.unit = unit;
        entry.rate = rate;
        Ok(())
    }

    pub fn entry(&self, material: Material) -> &RateEntry {
        &self.entries[material.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_builtin_rates() {
        let table = RateTable::builtin();
        let wire = table.entry(Material::CopperWire1_5);
        assert_eq!(wire.name, "1.5 sq.mm Copper Wire");
        assert_eq!(wire.unit, Unit::Meter);
        assert_eq!(wire.rate, BigDecimal::from(48));

        let labour = table.entry(Material::ElectricalLabour);
        assert_eq!(labour.unit, Unit::Point);
        assert_eq!(labour.rate, BigDecimal::from(300));

        assert_eq!(table.entry(Material::IndustrialMcb63A).rate, BigDecimal::from(850));
    }

    #[test]
    fn test_entries_follow_material_order() {
        let table = RateTable::builtin();
        for material in Material::ALL {
            assert_eq!(table.entry(material).name, material.name());
        }
    }

    #[test]
    fn test_catalog_override_case_insensitive() {
        let mut catalog = CatalogSnapshot::new();
        catalog.insert("ceiling fan", "pcs", BigDecimal::from_str("1650.50").unwrap());
        catalog.insert("Unrelated Item", "piece", BigDecimal::from(1));

        let table = RateTable::with_catalog(&catalog).unwrap();
        let fan = table.entry(Material::CeilingFan);
        assert_eq!(fan.rate, BigDecimal::from_str("1650.50").unwrap());
        assert_eq!(fan.unit, Unit::Piece);
        assert_eq!(table.entry(Material::LedPanelLight).rate, BigDecimal::from(450));
    }

    #[test]
    fn test_negative_catalog_rate_rejected() {
        let mut catalog = CatalogSnapshot::new();
        catalog.insert("6A MCB", "piece", BigDecimal::from(-200));

        let err = RateTable::with_catalog(&catalog).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidCatalogEntry { ref name, .. } if name == "6A MCB"));
    }

    #[test]
    fn test_unknown_catalog_unit_rejected() {
        let mut catalog = CatalogSnapshot::new();
        catalog.insert("20mm PVC Conduit", "bundle", BigDecimal::from(30));

        assert!(RateTable::with_catalog(&catalog).is_err());
    }

    #[test]
    fn test_snapshot_from_material_rows() {
        let rows = vec![models::Material {
            name: "Electrical Labour".to_string(),
            default_rate: BigDecimal::from(350),
            default_unit: "point".to_string(),
        }];
        let catalog = CatalogSnapshot::from_materials(rows);
        assert_eq!(catalog.len(), 1);

        let table = RateTable::with_catalog(&catalog).unwrap();
        assert_eq!(table.entry(Material::ElectricalLabour).rate, BigDecimal::from(350));
    }
}
