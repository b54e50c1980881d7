//! Typed attributes: the declared type space, values, and validation state.

mod rules;
mod typed;
mod value;

pub use rules::{compile_rules, parse_rule_names, CompiledRule};
pub use typed::TypedAttribute;
pub use value::{AttributeValue, TypeTag};
