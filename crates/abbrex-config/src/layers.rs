//! Stacking config files and turning them into an [`Expander`].
//!
//! Each file becomes one layer. Layer `n` puts its per-type tables at
//! registry level `2n + 1` and its `[syntax.<name>]` tables at `2n + 2`, so
//! the built-in resources (level 0) lose to global tables, which lose to
//! syntax tables, which lose to the next file.

use std::collections::BTreeMap;
use std::path::Path;

use abbrex_engine::{
    Expander, Filter, Options, Profile, ProfileOverrides, Registry, Storage, Syntax,
};
use log::{debug, warn};
use regex::Regex;

use crate::{Config, ConfigError, merge_tables};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayers {
    /// Lowest precedence first.
    pub layers: Vec<Config>,
}

impl ConfigLayers {
    /// Global config plus the nearest project file above `project_dir`.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let mut paths = vec![Config::config_path()];
        paths.extend(Config::find_project_file(project_dir));
        Self::from_paths(paths)
    }

    /// One layer per path that exists. `include` entries and
    /// `snippets/*.toml` files next to a config are folded into its layer.
    pub fn from_paths<I, P>(paths: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut layers = Vec::new();
        for path in paths {
            if let Some(layer) = load_layer(path.as_ref())? {
                layers.push(layer);
            }
        }
        Ok(Self { layers })
    }

    pub fn push(&mut self, config: Config) {
        self.layers.push(config);
    }

    /// Expander for `syntax` with every layer applied. `profile` names a
    /// built-in profile and beats any `profile` set in the files.
    pub fn expander(&self, syntax: Syntax, profile: Option<&str>) -> Result<Expander, ConfigError> {
        let mut expander = Expander::new(syntax);
        let mut options = toml::Table::new();
        let mut syntax_options = toml::Table::new();
        let mut overrides = ProfileOverrides::default();
        let mut profile_name = None;
        let mut filters = None;

        for (index, layer) in self.layers.iter().enumerate() {
            let level = 2 * index as i32 + 1;
            add(&mut expander.variables, variables(&layer.variables), level);
            add(&mut expander.abbreviations, storage(&layer.markup.abbreviations)?, level);
            add(&mut expander.snippets, storage(&layer.markup.snippets)?, level);
            add(
                &mut expander.stylesheet_snippets,
                storage(&layer.stylesheet.snippets)?,
                level,
            );
            if let Some(table) = &layer.options {
                merge_tables(&mut options, table.clone());
            }

            let Some(section) = layer.section(syntax) else {
                continue;
            };
            let level = level + 1;
            add(&mut expander.abbreviations, storage(&section.abbreviations)?, level);
            let snippets = if syntax.is_stylesheet() {
                &mut expander.stylesheet_snippets
            } else {
                &mut expander.snippets
            };
            add(snippets, storage(&section.snippets)?, level);
            if let Some(table) = &section.options {
                merge_tables(&mut syntax_options, table.clone());
            }
            overrides.merge(&section.profile_overrides);
            if section.profile.is_some() {
                profile_name = section.profile.as_deref();
            }
            if section.filters.is_some() {
                filters = section.filters.as_deref();
            }
        }

        merge_tables(&mut options, syntax_options);
        expander.options = self::options(options)?;

        let base = match profile.or(profile_name) {
            Some(name) => {
                Profile::named(name).map_err(|_| ConfigError::UnknownProfile(name.to_string()))?
            }
            None => syntax.default_profile(),
        };
        expander.profile = base.apply(&overrides);

        expander.filters = filters
            .unwrap_or_default()
            .iter()
            .filter_map(|name| match name.parse::<Filter>() {
                Ok(filter) => Some(filter),
                Err(err) => {
                    warn!("{err} in config, skipping");
                    None
                }
            })
            .collect();

        debug!(
            "{} layers for {syntax}: profile {}, filters {:?}",
            self.layers.len(),
            expander.profile.name,
            expander.filters
        );
        Ok(expander)
    }
}

fn load_layer(path: &Path) -> Result<Option<Config>, ConfigError> {
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut layer = Config::load_from_path(path)?;

    if let Some(config) = &layer {
        for include in config.include_paths(base) {
            match Config::load_from_path(&include)? {
                Some(extra) => layer.get_or_insert_with(Config::default).merge(extra),
                None => warn!("included file {} not found", include.display()),
            }
        }
    }

    for file in snippet_files(base) {
        if let Some(extra) = Config::load_from_path(&file)? {
            debug!("merging snippets from {}", file.display());
            layer.get_or_insert_with(Config::default).merge(extra);
        }
    }
    Ok(layer)
}

/// `snippets/*.toml` next to a config file, in name order.
fn snippet_files(dir: &Path) -> Vec<std::path::PathBuf> {
    let pattern = format!(
        "{}/snippets/*.toml",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    match glob::glob(&pattern) {
        Ok(paths) => paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(err) => {
                    warn!("skipping snippet file: {err}");
                    None
                }
            })
            .collect(),
        Err(err) => {
            warn!("bad snippet pattern {pattern}: {err}");
            Vec::new()
        }
    }
}

fn add(registry: &mut Registry, store: Storage, level: i32) {
    if !store.values().is_empty() {
        registry.add(store, level);
    }
}

fn variables(entries: &BTreeMap<String, String>) -> Storage {
    Storage::from_pairs(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Builds a store from a TOML table. A key written as `/pattern/` becomes a
/// regular-expression key.
pub(crate) fn storage(entries: &BTreeMap<String, String>) -> Result<Storage, ConfigError> {
    let mut store = Storage::new();
    for (key, value) in entries {
        match pattern_key(key) {
            Some(pattern) => {
                let re = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    key: key.clone(),
                    source,
                })?;
                store.set(re, value.as_str());
            }
            None => {
                store.set(key.as_str(), value.as_str());
            }
        }
    }
    Ok(store)
}

fn pattern_key(key: &str) -> Option<&str> {
    key.strip_prefix('/')?
        .strip_suffix('/')
        .filter(|pattern| !pattern.is_empty())
}

pub(crate) fn options(table: toml::Table) -> Result<Options, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|source| ConfigError::InvalidOptions { source })
}
