//! Entry point: one abbreviation in, one expanded string out.

use log::debug;
use regex::Captures;

use crate::defaults::{self, DEFAULT_LEVEL};
use crate::error::ExpandError;
use crate::fields;
use crate::filters::{Filter, FilterContext, Pipeline, VARIABLE, split_filters};
use crate::markup;
use crate::options::Options;
use crate::profile::Profile;
use crate::registry::Registry;
use crate::stylesheet::{self, CssResolver};
use crate::syntax::Syntax;
use crate::tree::{Resolver, rollout};

/// One expansion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandRequest<'a> {
    pub abbreviation: &'a str,
    /// Text to wrap with the abbreviation (usually the editor selection).
    pub text: Option<&'a str>,
    /// Indentation level of the insertion point.
    pub level: usize,
}

impl<'a> ExpandRequest<'a> {
    pub fn new(abbreviation: &'a str) -> Self {
        Self {
            abbreviation,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: &'a str) -> Self {
        self.text = Some(text);
        self
    }
}

/// Everything an expansion reads: syntax, profile, options and the
/// resource registries. None of it is modified while expanding, so a shared
/// `Expander` can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct Expander {
    pub syntax: Syntax,
    pub profile: Profile,
    pub options: Options,
    /// Markup abbreviations (`a` -> `a[href]`).
    pub abbreviations: Registry,
    /// Markup text snippets with a `${child}` slot.
    pub snippets: Registry,
    pub stylesheet_snippets: Registry,
    pub variables: Registry,
    /// Filters added to every markup expansion.
    pub filters: Vec<Filter>,
}

impl Expander {
    /// Expander with the built-in resources and the syntax's default profile.
    pub fn new(syntax: Syntax) -> Self {
        let builtin = |store| {
            let mut registry = Registry::new();
            registry.add(store, DEFAULT_LEVEL);
            registry
        };
        Self {
            syntax,
            profile: syntax.default_profile(),
            options: Options::default(),
            abbreviations: builtin(defaults::markup_abbreviations()),
            snippets: builtin(defaults::markup_snippets()),
            stylesheet_snippets: builtin(defaults::stylesheet_snippets()),
            variables: builtin(defaults::variables()),
            filters: Vec::new(),
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn expand(&self, abbreviation: &str) -> Result<String, ExpandError> {
        self.expand_with(&ExpandRequest::new(abbreviation))
    }

    pub fn expand_with(&self, request: &ExpandRequest<'_>) -> Result<String, ExpandError> {
        debug!("expanding {:?} as {}", request.abbreviation, self.syntax);
        let output = if self.syntax.is_stylesheet() {
            self.expand_stylesheet(request.abbreviation)?
        } else {
            self.expand_markup(request)?
        };
        self.finish(&output)
    }

    fn expand_markup(&self, request: &ExpandRequest<'_>) -> Result<String, ExpandError> {
        let (abbreviation, requested) = split_filters(request.abbreviation);
        let mut filters = self.filters.clone();
        filters.extend(requested);

        let root =
            markup::parse_with_limits(abbreviation, self.options.max_repeat, self.options.max_depth)?;
        let resolver = Resolver {
            abbreviations: &self.abbreviations,
            snippets: &self.snippets,
            profile: &self.profile,
            options: &self.options.markup,
            max_repeat: self.options.max_repeat,
        };
        let resolved = resolver.resolve(root)?;
        let mut tree = rollout(&resolved, request.text, self.options.max_repeat)?;

        let mut ctx = FilterContext::new(&self.profile, &self.options.markup, &self.variables);
        ctx.level = request.level;
        Pipeline::new(self.syntax.serializer(), &filters).run(&mut tree, &mut ctx)?;
        Ok(tree.render())
    }

    fn expand_stylesheet(&self, abbreviation: &str) -> Result<String, ExpandError> {
        let options = self.syntax.stylesheet_options(&self.options.stylesheet);
        let properties = stylesheet::parse(abbreviation, &options.vendor_letters())?;
        CssResolver::new(&self.stylesheet_snippets, &options).resolve(&properties)
    }

    /// Fills in known variables and prints fields the way the profile wants.
    fn finish(&self, output: &str) -> Result<String, ExpandError> {
        let output = VARIABLE.replace_all(output, |caps: &Captures<'_>| {
            match self.variables.resolve(&caps[1]) {
                Some(variable) => variable.render(&caps[1]),
                None => caps[0].to_string(),
            }
        });

        let parsed = fields::parse(&output).map_err(|err| ExpandError::Field {
            message: err.message,
            pos: err.pos,
        })?;
        let marked = parsed.mark_with(|index, placeholder| self.profile.field(index, placeholder));
        if self.profile.fields.is_plain() {
            return Ok(marked.replace("\\$", "$"));
        }
        Ok(marked)
    }
}

impl Default for Expander {
    fn default() -> Self {
        Self::new(Syntax::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FieldOutput;
    use crate::registry::Storage;
    use pretty_assertions::assert_eq;

    fn html(abbr: &str) -> String {
        Expander::new(Syntax::Html).expand(abbr).unwrap()
    }

    fn tabstops(syntax: Syntax) -> Expander {
        let mut expander = Expander::new(syntax);
        expander.profile.fields = FieldOutput::Tabstops;
        expander
    }

    #[test]
    fn markup_basics() {
        assert_eq!(html("a>b"), "<a href=\"\"><b></b></a>");
        assert_eq!(html("div>p"), "<div>\n\t<p></p>\n</div>");
    }

    #[test]
    fn stylesheet_basics() {
        let css = Expander::new(Syntax::Css);
        assert_eq!(css.expand("p0").unwrap(), "padding: 0;");
        assert_eq!(css.expand("p5-6").unwrap(), "padding: 5px 6px;");
        assert_eq!(css.expand("auto").unwrap(), "auto: ;");
    }

    #[test]
    fn fields_are_numbered_across_nodes() {
        let expander = tabstops(Syntax::Html);
        assert_eq!(
            expander.expand("a+a").unwrap(),
            "<a href=\"${1}\">${2}</a><a href=\"${3}\">${4}</a>"
        );
    }

    #[test]
    fn variables_fill_abbreviations() {
        let mut expander = Expander::new(Syntax::Html);
        expander.variables.add(Storage::from_pairs([("lang", "fr")]), 1);
        let out = expander.expand("doc").unwrap();
        assert!(out.starts_with("<html lang=\"fr\">"), "{out}");
        assert!(out.contains("<meta charset=\"UTF-8\">"), "{out}");
    }

    #[test]
    fn wrap_with_text() {
        let expander = Expander::new(Syntax::Html);
        let request = ExpandRequest::new("ul>li*").with_text("one\ntwo");
        assert_eq!(
            expander.expand_with(&request).unwrap(),
            "<ul>\n\t<li>one</li>\n\t<li>two</li>\n</ul>"
        );
    }

    #[test]
    fn configured_filters_always_run() {
        let mut expander = Expander::new(Syntax::Html);
        expander.filters = vec![Filter::Escape];
        assert_eq!(expander.expand("b").unwrap(), "&lt;b&gt;&lt;/b&gt;");
    }

    #[test]
    fn errors_surface() {
        let expander = Expander::new(Syntax::Html);
        assert!(matches!(
            expander.expand("div*2000"),
            Err(ExpandError::LimitExceeded { .. })
        ));
        assert!(matches!(
            expander.expand("(div"),
            Err(ExpandError::Syntax { .. })
        ));
    }
}
