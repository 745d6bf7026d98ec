//! Document validation: the typed visitor framework and the specified
//! rules.

mod context;
mod multi_visitor;
pub mod rules;
mod traits;
mod visitor;

#[cfg(test)]
pub(crate) mod test_harness;

pub use self::context::{RuleError, ValidatorContext};
pub use self::multi_visitor::{MultiVisitorCons, MultiVisitorNil};
pub use self::rules::{visit_all_rules, visit_all_sdl_rules};
pub use self::traits::Visitor;
pub use self::visitor::visit;

#[cfg(test)]
pub(crate) use self::test_harness::{
    expect_fails_rule, expect_fails_rule_with_schema, expect_fails_sdl_rule, expect_passes_rule,
    expect_passes_rule_with_schema, expect_passes_sdl_rule,
};
