//! 分类规则
//!
//! 八条规则按固定顺序执行。开关规则读取插座数量，线管规则读取主线数量，
//! 这些跨规则数据都放在 [`RuleContext`] 中显式传递。

use super::extractor::{ExtractionWarning, QuantityExtractor, TermSet};
use super::rates::{Material, RateTable};
use crate::config::EngineSettings;
use crate::models::{ProposalOutcome, QuotationDraft};
use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;

/// 包含 "wiring"，"factory wiring" 这类描述同样触发电线规则
pub const WIRE_TERMS: &[&str] = &["wire", "wiring", "cable", "copper"];
pub const HEAVY_POWER_TERMS: &[&str] = &["power", "factory", "3 phase", "3-phase", "three phase"];
pub const LIGHT_TERMS: &[&str] = &["light", "led", "panel"];
pub const FAN_TERMS: &[&str] = &["fan"];
pub const SOCKET_TERMS: &[&str] = &["socket", "plug", "point"];
pub const SWITCH_TERMS: &[&str] = &["switch", "modular"];
pub const PROTECTION_TERMS: &[&str] = &["mcb", "distribution", "board"];
pub const INDUSTRIAL_TERMS: &[&str] = &["industrial", "3 phase", "3-phase", "three phase"];
pub const CONDUIT_TERMS: &[&str] = &["conduit", "pipe", "pvc"];
pub const AREA_TERMS: &[&str] = &["sqft", "square", "area"];

static WIRE: Lazy<TermSet> = Lazy::new(|| TermSet::new(WIRE_TERMS));
static HEAVY_POWER: Lazy<TermSet> = Lazy::new(|| TermSet::new(HEAVY_POWER_TERMS));
static LIGHT: Lazy<TermSet> = Lazy::new(|| TermSet::new(LIGHT_TERMS));
static FAN: Lazy<TermSet> = Lazy::new(|| TermSet::new(FAN_TERMS));
static SOCKET: Lazy<TermSet> = Lazy::new(|| TermSet::new(SOCKET_TERMS));
static SWITCH: Lazy<TermSet> = Lazy::new(|| TermSet::new(SWITCH_TERMS));
static PROTECTION: Lazy<TermSet> = Lazy::new(|| TermSet::new(PROTECTION_TERMS));
static INDUSTRIAL: Lazy<TermSet> = Lazy::new(|| TermSet::new(INDUSTRIAL_TERMS));
static CONDUIT: Lazy<TermSet> = Lazy::new(|| TermSet::new(CONDUIT_TERMS));
static AREA: Lazy<TermSet> = Lazy::new(|| TermSet::new(AREA_TERMS));

const MCB_SET_COUNT: u32 = 4;
const SWITCH_FALLBACK_EXTRA: u32 = 5;

/// 规则间共享的抽取上下文
#[derive(Debug)]
pub struct RuleContext<'a> {
    text: &'a str,
    extractor: &'a QuantityExtractor,
    /// 规则 1 抽取的主线米数 (可能为 0)
    pub wire_qty: u32,
    /// 规则 4 抽取的插座数量 (可能为 0)
    pub socket_qty: u32,
    warnings: Vec<ExtractionWarning>,
    emitted: Vec<String>,
}

impl<'a> RuleContext<'a> {
    pub fn new(text: &'a str, extractor: &'a QuantityExtractor) -> Self {
        Self {
            text,
            extractor,
            wire_qty: 0,
            socket_qty: 0,
            warnings: Vec::new(),
            emitted: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        self.text
    }

    pub fn mentions(&self, terms: &TermSet) -> bool {
        terms.mentioned_in(self.text)
    }

    pub fn extract(&mut self, terms: &TermSet) -> u32 {
        self.extractor.extract(self.text, terms, &mut self.warnings)
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ExtractionWarning> {
        self.warnings
    }

    /// 取出上一条规则产出的明细名称
    pub fn take_emitted(&mut self) -> Vec<String> {
        std::mem::take(&mut self.emitted)
    }

    fn emit(&mut self, env: &RuleEnv<'_>, draft: &mut QuotationDraft, material: Material, qty: u32) {
        let entry = env.rates.entry(material);
        let outcome = draft.propose(
            entry.name,
            entry.description,
            BigDecimal::from(qty),
            entry.unit,
            entry.rate.clone(),
        );
        if outcome != ProposalOutcome::Ignored {
            self.emitted.push(entry.name.to_string());
        }
    }
}

/// 规则的只读依赖
#[derive(Debug, Clone, Copy)]
pub struct RuleEnv<'a> {
    pub rates: &'a RateTable,
    pub settings: &'a EngineSettings,
}

pub type RuleFn = fn(&mut RuleContext<'_>, &RuleEnv<'_>, &mut QuotationDraft);

pub struct Rule {
    pub name: &'static str,
    pub apply: RuleFn,
}

/// 执行顺序固定，后面的规则依赖前面的结果
pub const RULES: [Rule; 8] = [
    Rule { name: "wiring", apply: wiring },
    Rule { name: "lighting", apply: lighting },
    Rule { name: "fans", apply: fans },
    Rule { name: "sockets", apply: sockets },
    Rule { name: "switches", apply: switches },
    Rule { name: "protection", apply: protection },
    Rule { name: "conduit", apply: conduit },
    Rule { name: "labour", apply: labour },
];

fn percent_of(qty: u32, percent: u32) -> u32 {
    let scaled = u64::from(qty) * u64::from(percent) / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// 1. 电线：1.5 sq.mm 主线；重载用电时追加 2.5 sq.mm
pub fn wiring(ctx: &mut RuleContext<'_>, env: &RuleEnv<'_>, draft: &mut QuotationDraft) {
    if !ctx.mentions(&WIRE) {
        return;
    }

    let qty = ctx.extract(&WIRE);
    ctx.wire_qty = qty;
    ctx.emit(env, draft, Material::CopperWire1_5, qty);

    if ctx.mentions(&HEAVY_POWER) {
        let heavy = if qty > 0 {
            percent_of(qty, env.settings.secondary_wire_percent).max(1)
        } else {
            env.settings.secondary_wire_default
        };
        ctx.emit(env, draft, Material::CopperWire2_5, heavy);
    }
}

/// 2. 灯具
pub fn lighting(ctx: &mut RuleContext<'_>, env: &RuleEnv<'_>, draft: &mut QuotationDraft) {
    if !ctx.mentions(&LIGHT) {
        return;
    }
    let qty = ctx.extract(&LIGHT);
    ctx.emit(env, draft, Material::LedPanelLight, qty);
}

/// 3. 吊扇
pub fn fans(ctx: &mut RuleContext<'_>, env: &RuleEnv<'_>, draft: &mut QuotationDraft) {
    if !ctx.mentions(&FAN) {
        return;
    }
    let qty = ctx.extract(&FAN);
    ctx.emit(env, draft, Material::CeilingFan, qty);
}

/// 4. 插座：15A 与 5A 各一套
pub fn sockets(ctx: &mut RuleContext<'_>, env: &RuleEnv<'_>, draft: &mut QuotationDraft) {
    if !ctx.mentions(&SOCKET) {
        return;
    }
    let qty = ctx.extract(&SOCKET);
    ctx.socket_qty = qty;
    ctx.emit(env, draft, Material::Socket15A, qty);
    ctx.emit(env, draft, Material::Socket5A, qty);
}

/// 5. 开关：未写数量时按插座数 + 5
pub fn switches(ctx: &mut RuleContext<'_>, env: &RuleEnv<'_>, draft: &mut QuotationDraft) {
    if !ctx.mentions(&SWITCH) {
        return;
    }
    let mut qty = ctx.extract(&SWITCH);
    if qty == 0 {
        qty = ctx.socket_qty.saturating_add(SWITCH_FALLBACK_EXTRA);
    }
    ctx.emit(env, draft, Material::ModularSwitch, qty);
}

/// 6. 保护与配电：固定套餐，三相/工业追加 63A
pub fn protection(ctx: &mut RuleContext<'_>, env: &RuleEnv<'_>, draft: &mut QuotationDraft) {
    if !ctx.mentions(&PROTECTION) {
        return;
    }
    ctx.emit(env, draft, Material::Mcb6A, MCB_SET_COUNT);
    ctx.emit(env, draft, Material::DistributionBox, 1);

    if ctx.mentions(&INDUSTRIAL) {
        ctx.emit(env, draft, Material::IndustrialMcb63A, 1);
    }
}

/// 7. 线管：未写米数时按主线米数折算
pub fn conduit(ctx: &mut RuleContext<'_>, env: &RuleEnv<'_>, draft: &mut QuotationDraft) {
    if !ctx.mentions(&CONDUIT) {
        return;
    }
    let mut qty = ctx.extract(&CONDUIT);
    if qty == 0 && ctx.wire_qty > 0 {
        qty = percent_of(ctx.wire_qty, env.settings.conduit_percent);
    }
    ctx.emit(env, draft, Material::PvcConduit, qty);
}

/// 8. 人工：无触发词，总是产出
pub fn labour(ctx: &mut RuleContext<'_>, env: &RuleEnv<'_>, draft: &mut QuotationDraft) {
    let settings = env.settings;
    let min_points = settings.min_labour_points.max(1);

    let area = ctx.extract(&AREA);
    let points = if area > 0 {
        (area / settings.area_per_labour_point.max(1)).max(min_points)
    } else {
        let per_item = u32::try_from(draft.item_count())
            .unwrap_or(u32::MAX)
            .saturating_mul(settings.labour_points_per_item);
        per_item.max(min_points)
    };

    ctx.emit(env, draft, Material::ElectricalLabour, points);
}
