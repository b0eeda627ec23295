use std::cell::RefCell;
use std::collections::HashMap;

use url::form_urlencoded;

/// Address-bar query state, injected into the stores.
///
/// `write` replaces the current history entry; it never adds a navigation step.
pub trait UrlStateAdapter {
    fn read(&self) -> HashMap<String, String>;
    fn write(&self, key: &str, value: &str);
}

/// Ordered query-string pairs. Setting an existing key replaces it in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts input with or without the leading `?`.
    pub fn parse(search: &str) -> Self {
        let raw = search.trim().trim_start_matches('?');
        let mut qs = QueryString::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            qs.set(&key, &value);
        }
        qs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.pairs.iter().cloned().collect()
    }

    /// Percent-encoded form, without the leading `?`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// In-memory address bar. Keeps a log of every write for inspection.
#[derive(Debug, Default)]
pub struct MemoryUrl {
    query: RefCell<QueryString>,
    writes: RefCell<Vec<(String, String)>>,
}

impl MemoryUrl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query(search: &str) -> Self {
        MemoryUrl {
            query: RefCell::new(QueryString::parse(search)),
            writes: RefCell::new(Vec::new()),
        }
    }

    pub fn query(&self) -> QueryString {
        self.query.borrow().clone()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.query.borrow().get(key).map(str::to_string)
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.borrow().clone()
    }

    pub fn writes_for(&self, key: &str) -> Vec<String> {
        self.writes
            .borrow()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }
}

impl UrlStateAdapter for MemoryUrl {
    fn read(&self) -> HashMap<String, String> {
        self.query.borrow().to_map()
    }

    fn write(&self, key: &str, value: &str) {
        self.query.borrow_mut().set(key, value);
        self.writes
            .borrow_mut()
            .push((key.to_string(), value.to_string()));
    }
}
