use mcstats_common::{StatId, StatsRecord};

use crate::expr::{EvalContext, Expr, ExprError};

/// How to turn a raw stat value into display text.
#[derive(Debug, Clone, PartialEq)]
pub struct StatFormat {
    pub expr: Expr,
    pub decimals: usize,
    pub suffix: String,
}

impl StatFormat {
    pub fn new(expr: &str, decimals: usize, suffix: &str) -> Result<Self, ExprError> {
        Ok(Self {
            expr: Expr::parse(expr)?,
            decimals,
            suffix: suffix.to_string(),
        })
    }

    /// The raw value, unchanged.
    pub fn raw() -> Self {
        Self {
            expr: Expr::Value,
            decimals: 0,
            suffix: String::new(),
        }
    }

    pub fn apply(&self, value: i64, record: Option<&StatsRecord>) -> Result<String, ExprError> {
        let ctx = EvalContext {
            value: value as f64,
            record,
        };
        let x = self.expr.eval(&ctx)?;
        Ok(format!("{:.*}{}", self.decimals, x, self.suffix))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Matcher {
    Exact(StatId),
    /// Any stat whose name ends with the suffix, e.g. `_one_cm`.
    NameSuffix(String),
}

impl Matcher {
    fn matches(&self, id: &StatId) -> bool {
        match self {
            Matcher::Exact(want) => want == id,
            Matcher::NameSuffix(suffix) => id.name.ends_with(suffix.as_str()),
        }
    }
}

/// Table of formatting rules. The first matching rule wins; exact ids
/// registered later still take priority over suffix rules.
#[derive(Debug, Clone, Default)]
pub struct StatFormatter {
    exact: Vec<(Matcher, StatFormat)>,
    suffix: Vec<(Matcher, StatFormat)>,
}

/// Ticks per second on a vanilla server.
const TICKS_PER_SECOND: i64 = 20;

/// `minecraft:custom` stats counted in ticks.
const TICK_STATS: &[&str] = &[
    "play_time",
    "total_world_time",
    "time_since_death",
    "time_since_rest",
    "sneak_time",
];

/// `minecraft:custom` stats counted in tenths of a heart point.
const DAMAGE_STATS: &[&str] = &[
    "damage_dealt",
    "damage_dealt_absorbed",
    "damage_dealt_resisted",
    "damage_taken",
    "damage_blocked_by_shield",
    "damage_absorbed",
    "damage_resisted",
];

impl StatFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter preloaded with the units vanilla stats are stored in.
    pub fn vanilla() -> Self {
        let mut formatter = Self::new();
        let hours = format!("value / {TICKS_PER_SECOND} / 3600");
        for name in TICK_STATS {
            formatter.insert_parsed(StatId::new("custom", name), &hours, 2, " h");
        }
        for name in DAMAGE_STATS {
            formatter.insert_parsed(StatId::new("custom", name), "value / 20", 1, " ♥");
        }
        if let Ok(format) = StatFormat::new("value / 100000", 2, " km") {
            formatter.add_suffix_rule("_one_cm", format);
        }
        formatter
    }

    fn insert_parsed(&mut self, id: StatId, expr: &str, decimals: usize, suffix: &str) {
        match StatFormat::new(expr, decimals, suffix) {
            Ok(format) => self.insert(id, format),
            Err(e) => tracing::warn!(%id, error = %e, "skipping bad builtin format"),
        }
    }

    /// Register (or replace) the format for one stat.
    pub fn insert(&mut self, id: StatId, format: StatFormat) {
        self.exact.retain(|(m, _)| m != &Matcher::Exact(id.clone()));
        self.exact.push((Matcher::Exact(id), format));
    }

    pub fn add_suffix_rule(&mut self, suffix: &str, format: StatFormat) {
        self.suffix
            .push((Matcher::NameSuffix(suffix.to_string()), format));
    }

    /// The format that applies to `id`, if any rule matches.
    pub fn rule_for(&self, id: &StatId) -> Option<&StatFormat> {
        self.exact
            .iter()
            .chain(self.suffix.iter())
            .find(|(m, _)| m.matches(id))
            .map(|(_, f)| f)
    }

    /// Format one stat of a player's record. Unmatched stats print raw.
    pub fn format(&self, id: &StatId, record: &StatsRecord) -> Result<String, ExprError> {
        let value = record.get_or_zero(id);
        match self.rule_for(id) {
            Some(format) => format.apply(value, Some(record)),
            None => StatFormat::raw().apply(value, Some(record)),
        }
    }
}
