//! Abbreviation expansion for markup and stylesheets.
//!
//! `ul>li.item$*3` becomes a list of three numbered items and `p10-20`
//! becomes `padding: 10px 20px;`. [`Expander`] runs the whole pipeline; the
//! stages are public for hosts that need only part of it.

pub mod defaults;
pub mod error;
pub mod expander;
pub mod fields;
pub mod filters;
pub mod markup;
pub mod options;
pub mod profile;
pub mod registry;
pub mod scanner;
pub mod stylesheet;
pub mod syntax;
pub mod tree;

pub use error::{ExpandError, ScannerError, UnknownName};
pub use expander::{ExpandRequest, Expander};
pub use filters::Filter;
pub use options::{MarkupOptions, Options, StylesheetOptions, VendorPrefix};
pub use profile::{FieldOutput, FieldStyle, Profile, ProfileOverrides};
pub use registry::{Registry, Snippet, SnippetKey, SnippetValue, Storage};
pub use syntax::Syntax;
