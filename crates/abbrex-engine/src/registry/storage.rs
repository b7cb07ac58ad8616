use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// Function-valued snippet: receives the matched name (`lorem10`) and
/// produces the snippet text.
pub type SnippetFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Clone)]
pub enum SnippetKey {
    Name(String),
    Pattern(Regex),
}

impl SnippetKey {
    #[must_use]
    pub fn is_pattern(&self) -> bool {
        matches!(self, SnippetKey::Pattern(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            SnippetKey::Name(name) => name,
            SnippetKey::Pattern(re) => re.as_str(),
        }
    }
}

impl PartialEq for SnippetKey {
    fn eq(&self, other: &Self) -> bool {
        self.is_pattern() == other.is_pattern() && self.as_str() == other.as_str()
    }
}

impl fmt::Debug for SnippetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnippetKey::Name(name) => write!(f, "{name:?}"),
            SnippetKey::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for SnippetKey {
    fn from(name: &str) -> Self {
        SnippetKey::Name(name.to_string())
    }
}

impl From<String> for SnippetKey {
    fn from(name: String) -> Self {
        SnippetKey::Name(name)
    }
}

impl From<Regex> for SnippetKey {
    fn from(re: Regex) -> Self {
        SnippetKey::Pattern(re)
    }
}

#[derive(Clone)]
pub enum SnippetValue {
    Text(String),
    Function(SnippetFn),
}

impl SnippetValue {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        SnippetValue::Function(Arc::new(f))
    }

    /// Snippet text for the name that matched this snippet.
    pub fn render(&self, name: &str) -> String {
        match self {
            SnippetValue::Text(text) => text.clone(),
            SnippetValue::Function(f) => f(name),
        }
    }
}

impl fmt::Debug for SnippetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnippetValue::Text(text) => write!(f, "{text:?}"),
            SnippetValue::Function(_) => f.write_str("<function>"),
        }
    }
}

impl From<&str> for SnippetValue {
    fn from(text: &str) -> Self {
        SnippetValue::Text(text.to_string())
    }
}

impl From<String> for SnippetValue {
    fn from(text: String) -> Self {
        SnippetValue::Text(text)
    }
}

#[derive(Debug, Clone)]
pub struct Snippet {
    pub key: SnippetKey,
    pub value: SnippetValue,
}

impl Snippet {
    /// Text of the snippet as produced for `name`.
    pub fn render(&self, name: &str) -> String {
        self.value.render(name)
    }
}

/// One disable-able layer of snippets.
///
/// Name keys are looked up before pattern keys; patterns are tried in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct Storage {
    disabled: bool,
    names: HashMap<String, usize>,
    strings: Vec<Snippet>,
    patterns: Vec<Snippet>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SnippetKey>,
        V: Into<SnippetValue>,
    {
        let mut storage = Self::new();
        storage.load(pairs);
        storage
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// A disabled storage resolves nothing and lists no values.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    /// Registers a snippet. A name key containing `|` registers one entry per
    /// alias, all sharing the value.
    pub fn set(&mut self, key: impl Into<SnippetKey>, value: impl Into<SnippetValue>) -> &mut Self {
        let value = value.into();
        match key.into() {
            SnippetKey::Name(names) => {
                for name in names.split('|') {
                    let snippet = Snippet {
                        key: SnippetKey::Name(name.to_string()),
                        value: value.clone(),
                    };
                    match self.names.get(name) {
                        Some(&index) => self.strings[index] = snippet,
                        None => {
                            self.names.insert(name.to_string(), self.strings.len());
                            self.strings.push(snippet);
                        }
                    }
                }
            }
            key @ SnippetKey::Pattern(_) => {
                let snippet = Snippet { key, value };
                match self.patterns.iter_mut().find(|s| s.key == snippet.key) {
                    Some(existing) => *existing = snippet,
                    None => self.patterns.push(snippet),
                }
            }
        }
        self
    }

    /// Exact name match first, then the first pattern that matches.
    pub fn get(&self, key: &str) -> Option<&Snippet> {
        if self.disabled {
            return None;
        }

        if let Some(&index) = self.names.get(key) {
            return self.strings.get(index);
        }

        self.patterns.iter().find(|snippet| match &snippet.key {
            SnippetKey::Pattern(re) => re.is_match(key),
            SnippetKey::Name(_) => false,
        })
    }

    /// Replaces the whole content.
    pub fn load<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SnippetKey>,
        V: Into<SnippetValue>,
    {
        self.reset();
        for (key, value) in pairs {
            self.set(key, value);
        }
    }

    pub fn reset(&mut self) {
        self.names.clear();
        self.strings.clear();
        self.patterns.clear();
    }

    /// Name snippets in insertion order followed by pattern snippets.
    pub fn values(&self) -> Vec<&Snippet> {
        if self.disabled {
            return Vec::new();
        }
        self.strings.iter().chain(self.patterns.iter()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn value(storage: &Storage, key: &str) -> Option<String> {
        storage.get(key).map(|s| s.render(key))
    }

    #[test]
    fn set_and_get() {
        let mut storage = Storage::new();
        assert!(storage.get("foo").is_none());

        storage.set("foo", "bar");
        assert_eq!(storage.get("foo").unwrap().key, SnippetKey::from("foo"));
        assert_eq!(value(&storage, "foo").as_deref(), Some("bar"));

        storage.set("a1|a2", "baz");
        assert_eq!(storage.get("a1").unwrap().key, SnippetKey::from("a1"));
        assert_eq!(value(&storage, "a1").as_deref(), Some("baz"));
        assert_eq!(storage.get("a2").unwrap().key, SnippetKey::from("a2"));
        assert_eq!(value(&storage, "a2").as_deref(), Some("baz"));

        storage.set(Regex::new(r"foo\d+").unwrap(), "ban");
        assert_eq!(value(&storage, "foo").as_deref(), Some("bar"));
        assert_eq!(value(&storage, "foo123").as_deref(), Some("ban"));

        assert_eq!(storage.values().len(), 4);

        storage.reset();
        assert!(storage.get("foo").is_none());
        assert!(storage.get("foo123").is_none());
        assert_eq!(storage.values().len(), 0);
    }

    #[test]
    fn batch_load_replaces_content() {
        let mut storage = Storage::from_pairs([("old", "x")]);
        storage.load([("foo", "bar"), ("a1|a2", "baz")]);
        assert!(storage.get("old").is_none());
        assert_eq!(value(&storage, "a2").as_deref(), Some("baz"));
    }

    #[test]
    fn overwriting_keeps_insertion_order() {
        let mut storage = Storage::from_pairs([("a", "1"), ("b", "2")]);
        storage.set("a", "3");
        let keys: Vec<_> = storage.values().iter().map(|s| s.key.as_str().to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(value(&storage, "a").as_deref(), Some("3"));
    }

    #[test]
    fn enable_and_disable() {
        let mut storage = Storage::from_pairs([("foo", "bar")]);
        assert!(!storage.is_disabled());
        assert!(storage.get("foo").is_some());

        storage.disable();
        assert!(storage.is_disabled());
        assert!(storage.get("foo").is_none());
        assert!(storage.values().is_empty());

        storage.enable();
        assert!(storage.get("foo").is_some());
    }

    #[test]
    fn function_snippets_receive_the_matched_name() {
        let mut storage = Storage::new();
        storage.set(
            Regex::new(r"^x(\d+)$").unwrap(),
            SnippetValue::function(|name| name.trim_start_matches('x').to_string()),
        );
        assert_eq!(value(&storage, "x42").as_deref(), Some("42"));
    }
}
