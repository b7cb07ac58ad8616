//! Layered snippet registry.
//!
//! A [`Registry`] holds one [`Storage`] per priority level. Lookups walk the
//! levels from the highest to the lowest and return the first hit, so user
//! snippets (higher level) shadow built-in ones without replacing them.

mod score;
mod storage;

use std::collections::HashSet;

use log::debug;

pub use score::{calculate_score, find_best_match};
pub use storage::{Snippet, SnippetFn, SnippetKey, SnippetValue, Storage};

/// Which snippets [`Registry::all`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyKind {
    #[default]
    Any,
    Name,
    Pattern,
}

#[derive(Debug, Clone)]
struct Layer {
    level: i32,
    store: Storage,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    layers: Vec<Layer>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from stores listed in ascending priority: the first
    /// store gets level 0, the next level 1 and so on.
    pub fn from_levels(stores: impl IntoIterator<Item = Storage>) -> Self {
        let mut registry = Self::new();
        for (level, store) in stores.into_iter().enumerate() {
            registry.add(store, level as i32);
        }
        registry
    }

    /// Installs `store` at `level`, replacing whatever was there.
    pub fn add(&mut self, store: Storage, level: i32) -> &mut Storage {
        self.remove(level);
        self.layers.push(Layer { level, store });
        self.layers.sort_by(|a, b| b.level.cmp(&a.level));

        let index = self
            .layers
            .iter()
            .position(|layer| layer.level == level)
            .unwrap_or_default();
        &mut self.layers[index].store
    }

    pub fn get(&self, level: i32) -> Option<&Storage> {
        self.layers
            .iter()
            .find(|layer| layer.level == level)
            .map(|layer| &layer.store)
    }

    pub fn get_mut(&mut self, level: i32) -> Option<&mut Storage> {
        self.layers
            .iter_mut()
            .find(|layer| layer.level == level)
            .map(|layer| &mut layer.store)
    }

    pub fn remove(&mut self, level: i32) {
        self.layers.retain(|layer| layer.level != level);
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Snippet for `name` from the highest level that has one.
    pub fn resolve(&self, name: &str) -> Option<&Snippet> {
        self.layers.iter().find_map(|layer| layer.store.get(name))
    }

    /// Every visible snippet; a key defined on several levels is reported
    /// once, from the highest level.
    pub fn all(&self, kind: KeyKind) -> Vec<&Snippet> {
        let mut seen: HashSet<(bool, &str)> = HashSet::new();
        let mut result = Vec::new();

        for layer in &self.layers {
            for snippet in layer.store.values() {
                let is_pattern = snippet.key.is_pattern();
                let wanted = match kind {
                    KeyKind::Any => true,
                    KeyKind::Name => !is_pattern,
                    KeyKind::Pattern => is_pattern,
                };
                if wanted && seen.insert((is_pattern, snippet.key.as_str())) {
                    result.push(snippet);
                }
            }
        }

        result
    }

    /// Fuzzy lookup over name keys, for tokens with no exact match.
    pub fn find_best_match(&self, name: &str, min_score: f64) -> Option<&Snippet> {
        let candidates = self.all(KeyKind::Name);
        let best = find_best_match(name, candidates, |snippet| snippet.key.as_str(), min_score);
        if let Some(snippet) = best {
            debug!("fuzzy match {name:?} -> {:?}", snippet.key);
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regex::Regex;

    const GLOBAL: i32 = 0;
    const USER: i32 = 1;

    fn resolved(registry: &Registry, name: &str) -> Option<String> {
        registry.resolve(name).map(|s| s.render(name))
    }

    #[test]
    fn create_and_fill() {
        let mut registry = Registry::from_levels([
            Storage::from_pairs([("a", "b"), ("c", "d")]),
            Storage::from_pairs([("a", "b2"), ("c2", "d2")]),
        ]);

        assert_eq!(resolved(&registry, "a").as_deref(), Some("b2"));
        assert_eq!(resolved(&registry, "c").as_deref(), Some("d"));
        assert_eq!(resolved(&registry, "c2").as_deref(), Some("d2"));
        assert_eq!(resolved(&registry, "a2"), None);

        registry.remove(GLOBAL);
        assert_eq!(resolved(&registry, "a").as_deref(), Some("b2"));
        assert_eq!(resolved(&registry, "c"), None);
        assert_eq!(resolved(&registry, "c2").as_deref(), Some("d2"));

        registry.add(Storage::from_pairs([("a2", "b2"), ("d2", "e2")]), USER);
        assert_eq!(resolved(&registry, "a"), None);
        assert_eq!(resolved(&registry, "a2").as_deref(), Some("b2"));
        assert_eq!(resolved(&registry, "c2"), None);
        assert_eq!(resolved(&registry, "d2").as_deref(), Some("e2"));
    }

    #[test]
    fn disabled_layers_are_skipped() {
        let mut registry = Registry::new();
        registry.add(Storage::from_pairs([("a", "b2"), ("c2", "d2")]), USER);
        registry.add(Storage::from_pairs([("a", "b"), ("c", "d")]), GLOBAL);

        let dict = |registry: &Registry| -> Vec<(String, String)> {
            registry
                .all(KeyKind::Any)
                .into_iter()
                .map(|s| (s.key.as_str().to_string(), s.render("")))
                .collect()
        };
        let pairs = |items: &[(&str, &str)]| -> Vec<(String, String)> {
            items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };

        assert_eq!(resolved(&registry, "a").as_deref(), Some("b2"));
        assert_eq!(dict(&registry), pairs(&[("a", "b2"), ("c2", "d2"), ("c", "d")]));

        registry.get_mut(USER).unwrap().disable();
        assert_eq!(resolved(&registry, "a").as_deref(), Some("b"));
        assert_eq!(resolved(&registry, "c2"), None);
        assert_eq!(dict(&registry), pairs(&[("a", "b"), ("c", "d")]));

        registry.get_mut(USER).unwrap().enable();
        assert_eq!(resolved(&registry, "a").as_deref(), Some("b2"));
        assert_eq!(dict(&registry), pairs(&[("a", "b2"), ("c2", "d2"), ("c", "d")]));
    }

    #[test]
    fn all_by_kind() {
        let mut registry = Registry::new();
        let store = registry.add(Storage::new(), GLOBAL);
        store.set("a", "b").set("c", "d").set(Regex::new("foo").unwrap(), "bar");

        let keys = |kind| -> Vec<String> {
            registry
                .all(kind)
                .into_iter()
                .map(|s| format!("{:?}", s.key))
                .collect()
        };
        assert_eq!(keys(KeyKind::Any), vec!["\"a\"", "\"c\"", "/foo/"]);
        assert_eq!(keys(KeyKind::Name), vec!["\"a\"", "\"c\""]);
        assert_eq!(keys(KeyKind::Pattern), vec!["/foo/"]);
    }

    #[test]
    fn clear_and_get() {
        let mut registry = Registry::from_levels([Storage::from_pairs([("a", "b")])]);
        assert!(registry.get(GLOBAL).is_some());
        assert!(registry.get(USER).is_none());
        registry.clear();
        assert!(registry.resolve("a").is_none());
    }

    #[test]
    fn fuzzy_lookup() {
        let registry = Registry::from_levels([Storage::from_pairs([
            ("pos", "position:relative"),
            ("pos:a", "position:absolute"),
            ("bxsh", "box-shadow:${1}"),
        ])]);
        let hit = registry.find_best_match("poa", 0.3).unwrap();
        assert_eq!(hit.key.as_str(), "pos:a");
        assert!(registry.find_best_match("zzz", 0.3).is_none());
    }
}
