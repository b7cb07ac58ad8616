//! Stylesheet abbreviations: `p10-20`, `-bxsh`, `c#f.5+m0!`.

mod parser;
mod resolve;
mod value;

pub use parser::{CssProperty, Prefixes, parse};
pub use resolve::{CssResolver, CssSnippet};
pub use value::{Color, CssValue, format_number, join_values};
