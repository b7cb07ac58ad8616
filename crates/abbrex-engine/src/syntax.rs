use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownName;
use crate::filters::Filter;
use crate::options::StylesheetOptions;
use crate::profile::Profile;

/// Document syntax an abbreviation is expanded for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Html,
    Xhtml,
    Xml,
    Xsl,
    Haml,
    Css,
    Scss,
    Less,
    Sass,
    Stylus,
}

impl Syntax {
    pub const ALL: [Syntax; 10] = [
        Syntax::Html,
        Syntax::Xhtml,
        Syntax::Xml,
        Syntax::Xsl,
        Syntax::Haml,
        Syntax::Css,
        Syntax::Scss,
        Syntax::Less,
        Syntax::Sass,
        Syntax::Stylus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Syntax::Html => "html",
            Syntax::Xhtml => "xhtml",
            Syntax::Xml => "xml",
            Syntax::Xsl => "xsl",
            Syntax::Haml => "haml",
            Syntax::Css => "css",
            Syntax::Scss => "scss",
            Syntax::Less => "less",
            Syntax::Sass => "sass",
            Syntax::Stylus => "stylus",
        }
    }

    #[must_use]
    pub fn is_stylesheet(self) -> bool {
        matches!(
            self,
            Syntax::Css | Syntax::Scss | Syntax::Less | Syntax::Sass | Syntax::Stylus
        )
    }

    #[must_use]
    pub fn is_markup(self) -> bool {
        !self.is_stylesheet()
    }

    /// Name of the built-in profile used when none is configured.
    pub fn profile_name(self) -> &'static str {
        match self {
            Syntax::Xhtml => "xhtml",
            Syntax::Xml | Syntax::Xsl => "xml",
            _ => "html",
        }
    }

    pub fn default_profile(self) -> Profile {
        Profile::named(self.profile_name()).unwrap_or_default()
    }

    /// Filter that turns the formatted tree into text.
    pub fn serializer(self) -> Filter {
        match self {
            Syntax::Haml => Filter::Haml,
            _ => Filter::Html,
        }
    }

    /// Stylesheet options adjusted for this syntax's declaration style.
    pub fn stylesheet_options(self, base: &StylesheetOptions) -> StylesheetOptions {
        let mut options = base.clone();
        match self {
            Syntax::Sass => options.after = String::new(),
            Syntax::Stylus => {
                options.between = " ".to_string();
                options.after = String::new();
            }
            _ => {}
        }
        options
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Syntax {
    type Err = UnknownName;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Syntax::ALL
            .into_iter()
            .find(|syntax| syntax.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownName::new("syntax", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_round_trip() {
        for syntax in Syntax::ALL {
            assert_eq!(syntax.name().parse::<Syntax>().unwrap(), syntax);
        }
        assert!("jade".parse::<Syntax>().is_err());
    }

    #[test]
    fn classification() {
        assert!(Syntax::Scss.is_stylesheet());
        assert!(Syntax::Xsl.is_markup());
        assert_eq!(Syntax::Haml.serializer(), Filter::Haml);
        assert_eq!(Syntax::Xsl.default_profile().name, "xml");
    }

    #[test]
    fn stylus_drops_colon_and_semicolon() {
        let options = Syntax::Stylus.stylesheet_options(&StylesheetOptions::default());
        assert_eq!(options.between, " ");
        assert_eq!(options.after, "");
        let sass = Syntax::Sass.stylesheet_options(&StylesheetOptions::default());
        assert_eq!((sass.between.as_str(), sass.after.as_str()), (": ", ""));
    }
}
