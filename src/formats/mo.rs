//! GNU gettext `.mo` binary catalogs.
//!
//! Layout: a 28-byte header (magic, revision, string count, offsets of the
//! original and translation tables, hash table size and offset), two tables
//! of `(length, offset)` pairs, then NUL-terminated strings. Keys are sorted
//! bytewise so runtime lookups can binary search. No hash table is written.

use std::collections::BTreeMap;

use anyhow::Result;

use super::{Generator, Loader};
use crate::core::{
    data::{Catalog, Entry, Headers, headers::X_DOMAIN},
    error::ParseError,
};

const MAGIC: u32 = 0x9504_12de;
const MAGIC_SWAPPED: u32 = 0xde12_0495;
const HEADER_SIZE: usize = 28;
const CONTEXT_SEPARATOR: char = '\u{04}';
const PLURAL_SEPARATOR: char = '\0';

#[derive(Debug, Clone, Copy, Default)]
pub struct MoFormat;

impl Loader for MoFormat {
    fn load(&self, bytes: &[u8]) -> Result<Catalog> {
        Ok(parse(bytes)?)
    }
}

impl Generator for MoFormat {
    fn generate(&self, catalog: &Catalog) -> Result<Vec<u8>> {
        Ok(render(catalog))
    }
}

/// Serialize translated, non-obsolete entries (plus the header).
pub fn render(catalog: &Catalog) -> Vec<u8> {
    let mut strings: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();

    if !catalog.headers().is_empty() {
        strings.insert(
            Vec::new(),
            catalog.headers().to_header_text().into_bytes(),
        );
    }

    for entry in catalog.iter().filter(|e| !e.obsolete && e.is_translated()) {
        let mut key = String::new();
        if let Some(context) = &entry.context {
            key.push_str(context);
            key.push(CONTEXT_SEPARATOR);
        }
        key.push_str(&entry.msgid);

        let value = match &entry.plural {
            Some(plural) => {
                key.push(PLURAL_SEPARATOR);
                key.push_str(plural);
                entry.translations.join("\0")
            }
            None => entry.translations[0].clone(),
        };
        strings.insert(key.into_bytes(), value.into_bytes());
    }

    let count = strings.len();
    let originals_offset = HEADER_SIZE;
    let translations_offset = originals_offset + count * 8;
    let mut data_offset = translations_offset + count * 8;

    let mut originals_table = Vec::with_capacity(count * 8);
    let mut translations_table = Vec::with_capacity(count * 8);
    let mut data = Vec::new();

    for key in strings.keys() {
        push_u32(&mut originals_table, key.len());
        push_u32(&mut originals_table, data_offset);
        data.extend_from_slice(key);
        data.push(0);
        data_offset += key.len() + 1;
    }
    for value in strings.values() {
        push_u32(&mut translations_table, value.len());
        push_u32(&mut translations_table, data_offset);
        data.extend_from_slice(value);
        data.push(0);
        data_offset += value.len() + 1;
    }

    let mut out = Vec::with_capacity(data_offset);
    out.extend_from_slice(&MAGIC.to_le_bytes());
    push_u32(&mut out, 0); // revision
    push_u32(&mut out, count);
    push_u32(&mut out, originals_offset);
    push_u32(&mut out, translations_offset);
    push_u32(&mut out, 0); // hash table size
    push_u32(&mut out, translations_offset + count * 8); // hash table offset
    out.extend_from_slice(&originals_table);
    out.extend_from_slice(&translations_table);
    out.extend_from_slice(&data);
    out
}

fn push_u32(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&(value as u32).to_le_bytes());
}

/// Parse a `.mo` file written in either byte order.
pub fn parse(bytes: &[u8]) -> Result<Catalog, ParseError> {
    let reader = Reader::new(bytes)?;

    let revision = reader.u32_at(4)?;
    if revision >> 16 > 1 {
        return Err(ParseError::new(format!(
            "unsupported revision {}",
            revision
        )));
    }
    let count = reader.u32_at(8)? as usize;
    let originals = reader.u32_at(12)? as usize;
    let translations = reader.u32_at(16)? as usize;

    let mut catalog = Catalog::new(None);
    for i in 0..count {
        let key = reader.string(originals + i * 8)?;
        let value = reader.string(translations + i * 8)?;

        if key.is_empty() {
            let headers = Headers::parse(&value).map_err(ParseError::new)?;
            catalog.set_headers(headers);
            continue;
        }

        let (context, rest) = match key.split_once(CONTEXT_SEPARATOR) {
            Some((context, rest)) => (Some(context.to_string()), rest),
            None => (None, key.as_str()),
        };
        let (msgid, plural) = match rest.split_once(PLURAL_SEPARATOR) {
            Some((msgid, plural)) => (msgid.to_string(), Some(plural.to_string())),
            None => (rest.to_string(), None),
        };

        catalog.insert(Entry {
            context,
            msgid,
            plural,
            translations: value.split(PLURAL_SEPARATOR).map(str::to_string).collect(),
            ..Default::default()
        });
    }

    let domain = catalog.headers().get(X_DOMAIN).map(str::to_string);
    catalog.set_domain(domain);
    Ok(catalog)
}

struct Reader<'a> {
    bytes: &'a [u8],
    little_endian: bool,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Result<Self, ParseError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ParseError::new("file is too short to be a MO catalog"));
        }
        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let little_endian = match magic {
            MAGIC => true,
            MAGIC_SWAPPED => false,
            other => return Err(ParseError::new(format!("bad magic number {:#010x}", other))),
        };
        Ok(Self {
            bytes,
            little_endian,
        })
    }

    fn u32_at(&self, offset: usize) -> Result<u32, ParseError> {
        let raw: [u8; 4] = self
            .bytes
            .get(offset..offset + 4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ParseError::new(format!("truncated file at offset {}", offset)))?;
        Ok(if self.little_endian {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    }

    /// Read the string described by the `(length, offset)` pair at `entry`.
    fn string(&self, entry: usize) -> Result<String, ParseError> {
        let len = self.u32_at(entry)? as usize;
        let offset = self.u32_at(entry + 4)? as usize;
        let raw = self
            .bytes
            .get(offset..offset.saturating_add(len))
            .ok_or_else(|| ParseError::new(format!("string at offset {} is truncated", offset)))?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| ParseError::new(format!("string at offset {} is not valid UTF-8", offset)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn translated(msgid: &str, translations: &[&str]) -> Entry {
        let mut entry = Entry::new(msgid);
        entry.translations = translations.iter().map(|s| s.to_string()).collect();
        entry
    }

    #[test]
    fn test_render_single_entry_bytes() {
        let mut catalog = Catalog::new(None);
        catalog.insert(translated("a", &["b"]));

        let bytes = render(&catalog);

        let expected: Vec<u8> = [
            &0x950412de_u32.to_le_bytes()[..],
            &0u32.to_le_bytes(),
            &1u32.to_le_bytes(),
            &28u32.to_le_bytes(),
            &36u32.to_le_bytes(),
            &0u32.to_le_bytes(),
            &44u32.to_le_bytes(),
            // originals table
            &1u32.to_le_bytes(),
            &44u32.to_le_bytes(),
            // translations table
            &1u32.to_le_bytes(),
            &46u32.to_le_bytes(),
            b"a\0b\0",
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_render_skips_untranslated_and_obsolete() {
        let mut catalog = Catalog::new(None);
        catalog.insert(Entry::new("untranslated"));
        let mut old = translated("old", &["vieux"]);
        old.obsolete = true;
        catalog.insert(old);

        let parsed = parse(&render(&catalog)).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_render_sorts_keys_and_encodes_context_and_plurals() {
        let mut catalog = Catalog::for_domain("messages");
        catalog.insert(translated("zebra", &["zèbre"]));
        let mut file = translated("file", &["fichier", "fichiers"]);
        file.context = Some("menu".to_string());
        file.plural = Some("files".to_string());
        catalog.insert(file);

        let parsed = parse(&render(&catalog)).unwrap();

        let msgids: Vec<_> = parsed.iter().map(|e| e.msgid.as_str()).collect();
        assert_eq!(msgids, vec!["file", "zebra"]);

        let file = parsed.find(Some("menu"), "file").unwrap();
        assert_eq!(file.plural.as_deref(), Some("files"));
        assert_eq!(file.translations, vec!["fichier", "fichiers"]);
        assert_eq!(parsed.domain(), Some("messages"));
        assert_eq!(parsed.headers(), catalog.headers());
    }

    #[test]
    fn test_parse_big_endian() {
        let mut bytes = Vec::new();
        for value in [0x950412de_u32, 0, 1, 28, 36, 0, 44, 1, 44, 2, 46] {
            bytes.extend_from_slice(&value.to_be_bytes());
        }
        bytes.extend_from_slice(b"a\0ok\0");

        let catalog = parse(&bytes).unwrap();
        assert_eq!(
            catalog.find(None, "a").and_then(Entry::translation),
            Some("ok")
        );
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let err = parse(&[0u8; 28]).unwrap_err();
        assert!(err.message.contains("bad magic"));
    }

    #[test]
    fn test_parse_rejects_truncated_tables() {
        let mut bytes = render(&{
            let mut catalog = Catalog::new(None);
            catalog.insert(translated("a", &["b"]));
            catalog
        });
        bytes.truncate(40);
        assert!(parse(&bytes).is_err());
    }

    #[test]
    fn test_parse_rejects_short_file() {
        assert!(parse(b"\xde\x12\x04\x95").is_err());
    }
}
