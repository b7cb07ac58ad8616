//! TOML configuration for abbrex.
//!
//! A [`Config`] is one file: variables, resource tables per type and
//! per-syntax overrides. [`ConfigLayers`] stacks the global file, the project
//! file and any `snippets/*.toml` files next to them, and builds an
//! [`abbrex_engine::Expander`] from the result.

mod layers;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use abbrex_engine::{Profile, ProfileOverrides, Syntax};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use layers::ConfigLayers;

/// Project override file, looked up from the working directory upwards.
pub const PROJECT_FILE: &str = ".abbrex.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid snippet pattern {key}: {source}")]
    InvalidPattern { key: String, source: regex::Error },

    #[error("Invalid options: {source}")]
    InvalidOptions { source: toml::de::Error },

    #[error("Unknown syntax: {0}")]
    UnknownSyntax(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupSection {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub abbreviations: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub snippets: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesheetSection {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub snippets: BTreeMap<String, String>,
}

/// `[syntax.<name>]` overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntaxSection {
    /// Base profile name (`html`, `xhtml`, `xml`, `plain`).
    pub profile: Option<String>,
    /// Filters run on every expansion in this syntax.
    pub filters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub abbreviations: BTreeMap<String, String>,
    /// Markup snippets, or stylesheet snippets for stylesheet syntaxes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub snippets: BTreeMap<String, String>,
    pub options: Option<toml::Table>,
    pub profile_overrides: ProfileOverrides,
}

impl SyntaxSection {
    fn merge(&mut self, other: SyntaxSection) {
        if other.profile.is_some() {
            self.profile = other.profile;
        }
        if other.filters.is_some() {
            self.filters = other.filters;
        }
        self.abbreviations.extend(other.abbreviations);
        self.snippets.extend(other.snippets);
        merge_options(&mut self.options, other.options);
        self.profile_overrides.merge(&other.profile_overrides);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extra files merged after this one. `~` and `$VAR` are expanded;
    /// relative paths are resolved against this file's directory.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    pub markup: MarkupSection,
    pub stylesheet: StylesheetSection,
    /// Partial [`abbrex_engine::Options`] table.
    pub options: Option<toml::Table>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub syntax: BTreeMap<String, SyntaxSection>,
    /// Anything else; reported and ignored.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        for key in config.unknown.keys() {
            warn!("{}: ignoring unknown key {key}", config_path.display());
        }
        config.validate()?;
        Ok(Some(config))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Global config file, `~/.config/abbrex/config.toml`.
    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/abbrex");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Nearest [`PROJECT_FILE`] in `dir` or one of its ancestors.
    pub fn find_project_file(dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .map(|ancestor| ancestor.join(PROJECT_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Layers `other` on top of `self`; entries in `other` win.
    pub fn merge(&mut self, other: Config) {
        self.variables.extend(other.variables);
        self.markup.abbreviations.extend(other.markup.abbreviations);
        self.markup.snippets.extend(other.markup.snippets);
        self.stylesheet.snippets.extend(other.stylesheet.snippets);
        merge_options(&mut self.options, other.options);
        for (name, section) in other.syntax {
            self.syntax.entry(name).or_default().merge(section);
        }
    }

    /// The `[syntax.<name>]` table for `syntax`, if any.
    pub fn section(&self, syntax: Syntax) -> Option<&SyntaxSection> {
        self.syntax
            .iter()
            .find(|(name, _)| name.parse::<Syntax>().ok() == Some(syntax))
            .map(|(_, section)| section)
    }

    /// Checks names and patterns so mistakes surface when the file is read,
    /// not on the first expansion.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, section) in &self.syntax {
            if name.parse::<Syntax>().is_err() {
                return Err(ConfigError::UnknownSyntax(name.clone()));
            }
            if let Some(profile) = &section.profile {
                Profile::named(profile).map_err(|_| ConfigError::UnknownProfile(profile.clone()))?;
            }
            layers::storage(&section.abbreviations)?;
            layers::storage(&section.snippets)?;
            if let Some(options) = &section.options {
                layers::options(options.clone())?;
            }
        }
        layers::storage(&self.markup.abbreviations)?;
        layers::storage(&self.markup.snippets)?;
        layers::storage(&self.stylesheet.snippets)?;
        if let Some(options) = &self.options {
            layers::options(options.clone())?;
        }
        Ok(())
    }

    /// Starting point written by `abbrex init`.
    pub fn starter() -> Self {
        let mut config = Config::default();
        config.variables.extend([
            ("lang".to_string(), "en".to_string()),
            ("charset".to_string(), "UTF-8".to_string()),
        ]);
        config.syntax.insert(
            Syntax::Html.name().to_string(),
            SyntaxSection {
                profile: Some("html".to_string()),
                ..SyntaxSection::default()
            },
        );
        config
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// Paths of `include` entries, expanded and resolved against `base`.
    fn include_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.include
            .iter()
            .map(|path| {
                let path = Self::expand_path(path).unwrap_or_else(|| path.clone());
                if path.is_relative() {
                    base.join(path)
                } else {
                    path
                }
            })
            .collect()
    }
}

/// Deep merge of option tables; scalar values in `overlay` replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn merge_options(base: &mut Option<toml::Table>, overlay: Option<toml::Table>) {
    if let Some(overlay) = overlay {
        merge_tables(base.get_or_insert_with(toml::Table::new), overlay);
    }
}
