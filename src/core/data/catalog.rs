use std::collections::HashMap;

use super::{
    entry::{Entry, EntryKey},
    headers::{CONTENT_TRANSFER_ENCODING, CONTENT_TYPE, Headers, X_DOMAIN},
};

/// An ordered collection of unique entries plus header metadata.
///
/// Entries keep insertion order; `index` maps each key to its position, so
/// no two entries can ever share a `(context, msgid)` key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    domain: Option<String>,
    headers: Headers,
    entries: Vec<Entry>,
    index: HashMap<EntryKey, usize>,
}

impl Catalog {
    /// An empty catalog with no headers.
    pub fn new(domain: Option<&str>) -> Self {
        Self {
            domain: domain.map(str::to_string),
            ..Default::default()
        }
    }

    /// An empty catalog carrying the headers a freshly extracted template gets.
    pub fn for_domain(domain: &str) -> Self {
        let mut catalog = Self::new(Some(domain));
        catalog
            .headers
            .set(CONTENT_TYPE, "text/plain; charset=UTF-8");
        catalog.headers.set(CONTENT_TRANSFER_ENCODING, "8bit");
        catalog.headers.set(X_DOMAIN, domain);
        catalog
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn set_domain(&mut self, domain: Option<String>) {
        self.domain = domain;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn set_headers(&mut self, headers: Headers) {
        self.headers = headers;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn get(&self, key: &EntryKey) -> Option<&Entry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn find(&self, context: Option<&str>, msgid: &str) -> Option<&Entry> {
        self.get(&EntryKey::new(context, msgid))
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        self.index.contains_key(key)
    }

    /// Insert an entry, replacing (in place) any entry with the same key.
    ///
    /// Returns the replaced entry.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        let key = entry.key();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i], entry)),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    /// Add an entry, folding it into an existing one with the same key.
    pub fn add(&mut self, entry: Entry) {
        let key = entry.key();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].absorb(entry),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Number of entries flagged obsolete.
    pub fn obsolete_count(&self) -> usize {
        self.entries.iter().filter(|e| e.obsolete).count()
    }
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.headers == other.headers
            && self.entries == other.entries
    }
}

impl Eq for Catalog {}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Extend<Entry> for Catalog {
    fn extend<T: IntoIterator<Item = Entry>>(&mut self, iter: T) {
        for entry in iter {
            self.add(entry);
        }
    }
}
