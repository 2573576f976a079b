//! Stat formatting: turns raw stat counters (ticks, centimetres, damage
//! tenths) into display text through a small expression language.
//!
//! # Invariants
//! - Expressions are parsed once into an AST and interpreted; nothing is evaluated as code.
//! - Unrecorded stats read as zero; division by zero is an error, not infinity.

mod expr;
mod format;

pub use expr::{BinaryOp, EvalContext, Expr, ExprError, Func};
pub use format::{StatFormat, StatFormatter};

pub fn crate_info() -> &'static str {
    "mcstats-stats v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("stats"));
    }
}
