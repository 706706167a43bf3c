//! Scan-and-load merge of a fresh scan against a previously persisted catalog.
//!
//! For keys found by both sides, translator work (translations, flags,
//! translator comments) comes from `existing` while code facts (references,
//! extracted comments, plural text) come from `fresh`. Keys only in
//! `existing` are kept and marked obsolete unless purging was requested.

use std::collections::HashMap;

use super::data::{Catalog, Entry, EntryKey};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Drop entries that the current scan no longer finds.
    pub purge_obsolete: bool,
}

/// Merge `fresh` (current scan) with `existing` (primary target contents).
///
/// The result lists fresh entries in scan order followed by the entries only
/// `existing` knows, in their original order. Merging the result again with
/// the same `fresh` yields the same catalog.
pub fn merge(fresh: Catalog, existing: Catalog, options: MergeOptions) -> Catalog {
    let domain = fresh
        .domain()
        .or(existing.domain())
        .map(str::to_string);

    let mut merged = Catalog::new(domain.as_deref());
    merged.set_headers(if existing.headers().is_empty() {
        fresh.headers().clone()
    } else {
        existing.headers().clone()
    });

    let existing_entries = existing.into_entries();
    let order: Vec<EntryKey> = existing_entries.iter().map(Entry::key).collect();
    let mut previous: HashMap<EntryKey, Entry> = existing_entries
        .into_iter()
        .map(|e| (e.key(), e))
        .collect();

    for entry in fresh.into_entries() {
        let merged_entry = match previous.remove(&entry.key()) {
            Some(old) => reconcile(entry, old),
            None => Entry {
                obsolete: false,
                ..entry
            },
        };
        merged.insert(merged_entry);
    }

    if !options.purge_obsolete {
        for key in order {
            if let Some(mut old) = previous.remove(&key) {
                old.obsolete = true;
                old.references.clear();
                merged.insert(old);
            }
        }
    }

    merged
}

fn reconcile(fresh: Entry, old: Entry) -> Entry {
    let translations = if old.is_translated() {
        old.translations
    } else {
        fresh.translations
    };

    Entry {
        context: fresh.context,
        msgid: fresh.msgid,
        plural: fresh.plural.or(old.plural),
        translations,
        references: fresh.references,
        comments: old.comments,
        extracted_comments: fresh.extracted_comments,
        flags: old.flags,
        obsolete: false,
    }
}
