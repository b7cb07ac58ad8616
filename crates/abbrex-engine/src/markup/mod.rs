//! Markup abbreviation grammar: element shorthand with `+`, `>`, `^`
//! operators, groups and multipliers.

mod node;
mod parser;

pub use node::{AbbreviationNode, Attribute, Repeat, squash};
pub use parser::{DEFAULT_MAX_DEPTH, parse, parse_with_limits};
