pub mod rules;

pub use rules::{default_rules, ReplyRule, ResponseEngine, RuleCondition};
