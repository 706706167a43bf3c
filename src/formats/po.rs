//! gettext `.po` / `.pot` text catalogs.

use anyhow::Result;

use super::{Generator, Loader};
use crate::core::{
    data::{Catalog, Entry, Headers, Reference, headers::X_DOMAIN},
    error::ParseError,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PoFormat;

impl Loader for PoFormat {
    fn load(&self, bytes: &[u8]) -> Result<Catalog> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| ParseError::new(format!("file is not valid UTF-8: {}", e)))?;
        Ok(parse(content)?)
    }
}

impl Generator for PoFormat {
    fn generate(&self, catalog: &Catalog) -> Result<Vec<u8>> {
        Ok(render(catalog).into_bytes())
    }
}

// ============================================================
// Parsing
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Msgid,
    Plural,
    Msgstr(usize),
}

/// Entry being assembled while reading lines.
#[derive(Debug, Default)]
struct Pending {
    start_line: usize,
    comments: Vec<String>,
    extracted_comments: Vec<String>,
    references: Vec<Reference>,
    flags: Vec<String>,
    context: Option<String>,
    msgid: Option<String>,
    plural: Option<String>,
    msgstr: Vec<(usize, String)>,
    obsolete: bool,
    last: Option<Field>,
}

impl Pending {
    fn has_keywords(&self) -> bool {
        self.context.is_some() || self.msgid.is_some() || !self.msgstr.is_empty()
    }

    fn has_comments(&self) -> bool {
        !self.comments.is_empty()
            || !self.extracted_comments.is_empty()
            || !self.references.is_empty()
            || !self.flags.is_empty()
    }

    fn append(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Context => self.context.get_or_insert_with(String::new),
            Field::Msgid => self.msgid.get_or_insert_with(String::new),
            Field::Plural => self.plural.get_or_insert_with(String::new),
            Field::Msgstr(index) => {
                let pos = match self.msgstr.iter().position(|(i, _)| *i == index) {
                    Some(pos) => pos,
                    None => {
                        self.msgstr.push((index, String::new()));
                        self.msgstr.len() - 1
                    }
                };
                &mut self.msgstr[pos].1
            }
        };
        target.push_str(text);
    }
}

struct Parser {
    catalog: Catalog,
    pending: Pending,
    seen_header: bool,
}

/// Parse PO text into a catalog.
///
/// The header entry (empty msgid, no context) becomes the catalog headers;
/// `#~` entries are loaded as obsolete.
pub fn parse(content: &str) -> Result<Catalog, ParseError> {
    let mut parser = Parser {
        catalog: Catalog::new(None),
        pending: Pending::default(),
        seen_header: false,
    };

    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    for (index, raw) in content.lines().enumerate() {
        parser.line(index + 1, raw)?;
    }
    parser.flush()?;

    let domain = parser.catalog.headers().get(X_DOMAIN).map(str::to_string);
    parser.catalog.set_domain(domain);
    Ok(parser.catalog)
}

impl Parser {
    fn line(&mut self, number: usize, raw: &str) -> Result<(), ParseError> {
        let line = raw.trim();
        if line.is_empty() {
            return self.flush();
        }

        if let Some(rest) = line.strip_prefix("#~") {
            // Previous-string markers of obsolete entries carry no data.
            if rest.starts_with('|') {
                return Ok(());
            }
            let rest = rest.trim_start();
            if !rest.starts_with('"') && self.starts_new_entry(rest) {
                self.flush()?;
            }
            self.pending.obsolete = true;
            return self.keyword(number, rest);
        }

        if let Some(rest) = line.strip_prefix('#') {
            if self.pending.has_keywords() {
                self.flush()?;
            }
            if self.pending.start_line == 0 {
                self.pending.start_line = number;
            }
            self.comment(rest);
            return Ok(());
        }

        if !line.starts_with('"') && self.starts_new_entry(line) {
            self.flush()?;
        }
        self.keyword(number, line)
    }

    /// A `msgctxt`/`msgid` after a complete msgstr begins the next entry.
    fn starts_new_entry(&self, line: &str) -> bool {
        let keyword = line.split_whitespace().next().unwrap_or("");
        matches!(keyword, "msgctxt" | "msgid") && !self.pending.msgstr.is_empty()
    }

    fn comment(&mut self, rest: &str) {
        let pending = &mut self.pending;
        if let Some(text) = rest.strip_prefix('.') {
            pending.extracted_comments.push(text.trim().to_string());
        } else if let Some(text) = rest.strip_prefix(':') {
            pending
                .references
                .extend(text.split_whitespace().map(Reference::parse));
        } else if let Some(text) = rest.strip_prefix(',') {
            pending.flags.extend(
                text.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            );
        } else if rest.starts_with('|') {
            // Previous msgid of a fuzzy entry; not kept.
        } else {
            let text = rest.strip_prefix(' ').unwrap_or(rest);
            pending.comments.push(text.to_string());
        }
    }

    fn keyword(&mut self, number: usize, line: &str) -> Result<(), ParseError> {
        if self.pending.start_line == 0 {
            self.pending.start_line = number;
        }

        if line.starts_with('"') {
            let Some(field) = self.pending.last else {
                return Err(ParseError::at(number, "string without a keyword"));
            };
            let text = unquote(line).map_err(|e| ParseError::at(number, e))?;
            self.pending.append(field, &text);
            return Ok(());
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| ParseError::at(number, format!("unexpected content \"{}\"", line)))?;

        let field = match keyword {
            "msgctxt" => Field::Context,
            "msgid" => Field::Msgid,
            "msgid_plural" => Field::Plural,
            "msgstr" => Field::Msgstr(0),
            other => match other
                .strip_prefix("msgstr[")
                .and_then(|s| s.strip_suffix(']'))
            {
                Some(index) => Field::Msgstr(index.parse().map_err(|_| {
                    ParseError::at(number, format!("invalid plural index \"{}\"", other))
                })?),
                None => {
                    return Err(ParseError::at(
                        number,
                        format!("unknown keyword \"{}\"", other),
                    ));
                }
            },
        };

        let already_set = match field {
            Field::Context => self.pending.context.is_some(),
            Field::Msgid => self.pending.msgid.is_some(),
            Field::Plural => self.pending.plural.is_some(),
            Field::Msgstr(index) => self.pending.msgstr.iter().any(|(i, _)| *i == index),
        };
        if already_set {
            return Err(ParseError::at(number, format!("duplicate \"{}\"", keyword)));
        }

        let text = unquote(rest.trim()).map_err(|e| ParseError::at(number, e))?;
        self.pending.append(field, &text);
        self.pending.last = Some(field);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ParseError> {
        let pending = std::mem::take(&mut self.pending);
        if !pending.has_keywords() {
            // Stray comments without an entry are dropped.
            return Ok(());
        }

        let line = pending.start_line;
        let Some(msgid) = pending.msgid else {
            return Err(ParseError::at(line, "entry without msgid"));
        };
        if pending.msgstr.is_empty() {
            return Err(ParseError::at(line, "entry without msgstr"));
        }

        let mut msgstr = pending.msgstr;
        msgstr.sort_by_key(|(i, _)| *i);
        let translations: Vec<String> = if msgstr.iter().all(|(_, s)| s.is_empty()) {
            Vec::new()
        } else {
            msgstr.into_iter().map(|(_, s)| s).collect()
        };

        if msgid.is_empty() && pending.context.is_none() && !pending.obsolete {
            if self.seen_header {
                return Err(ParseError::at(line, "duplicate header entry"));
            }
            self.seen_header = true;
            let text = translations.first().map(String::as_str).unwrap_or("");
            let headers = Headers::parse(text).map_err(|e| ParseError::at(line, e))?;
            self.catalog.set_headers(headers);
            return Ok(());
        }

        self.catalog.insert(Entry {
            context: pending.context,
            msgid,
            plural: pending.plural,
            translations,
            references: pending.references,
            comments: pending.comments,
            extracted_comments: pending.extracted_comments,
            flags: pending.flags,
            obsolete: pending.obsolete,
        });
        Ok(())
    }
}

/// Strip the quotes of a PO string and resolve C escapes.
fn unquote(s: &str) -> Result<String, String> {
    let inner = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .filter(|_| s.len() >= 2)
        .ok_or_else(|| format!("malformed string {}", s))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('a') => out.push('\u{07}'),
                Some('b') => out.push('\u{08}'),
                Some('f') => out.push('\u{0C}'),
                Some('v') => out.push('\u{0B}'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => return Err(format!("invalid escape \\{} in {}", other, s)),
                None => return Err(format!("malformed string {}", s)),
            },
            '"' => return Err(format!("unescaped quote in {}", s)),
            c => out.push(c),
        }
    }
    Ok(out)
}

// ============================================================
// Rendering
// ============================================================

/// Render a catalog as PO text.
pub fn render(catalog: &Catalog) -> String {
    let mut out = String::new();
    let plural_count = catalog.headers().plural_count();

    if !catalog.headers().is_empty() {
        write_string(&mut out, "", "msgid", "");
        write_multiline(&mut out, "", "msgstr", &catalog.headers().to_header_text());
    }

    for entry in catalog.iter() {
        if !out.is_empty() {
            out.push('\n');
        }
        write_entry(&mut out, entry, plural_count);
    }

    out
}

fn write_entry(out: &mut String, entry: &Entry, plural_count: usize) {
    for comment in &entry.comments {
        if comment.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str(&format!("# {}\n", comment));
        }
    }
    for comment in &entry.extracted_comments {
        out.push_str(&format!("#. {}\n", comment));
    }
    if !entry.references.is_empty() {
        let refs: Vec<String> = entry.references.iter().map(|r| r.to_string()).collect();
        out.push_str(&format!("#: {}\n", refs.join(" ")));
    }
    if !entry.flags.is_empty() {
        out.push_str(&format!("#, {}\n", entry.flags.join(", ")));
    }

    let prefix = if entry.obsolete { "#~ " } else { "" };
    if let Some(context) = &entry.context {
        write_string(out, prefix, "msgctxt", context);
    }
    write_string(out, prefix, "msgid", &entry.msgid);

    match &entry.plural {
        Some(plural) => {
            write_string(out, prefix, "msgid_plural", plural);
            let forms = plural_count.max(entry.translations.len());
            for i in 0..forms {
                let value = entry.translations.get(i).map(String::as_str).unwrap_or("");
                write_string(out, prefix, &format!("msgstr[{}]", i), value);
            }
        }
        None => {
            let value = entry.translations.first().map(String::as_str).unwrap_or("");
            write_string(out, prefix, "msgstr", value);
        }
    }
}

/// `keyword "value"`, switching to one quoted line per `\n` when the value
/// spans several lines.
fn write_string(out: &mut String, prefix: &str, keyword: &str, value: &str) {
    let lines = value.split_inclusive('\n').count();
    if lines > 1 {
        write_multiline(out, prefix, keyword, value);
    } else {
        out.push_str(&format!("{}{} \"{}\"\n", prefix, keyword, escape(value)));
    }
}

fn write_multiline(out: &mut String, prefix: &str, keyword: &str, value: &str) {
    out.push_str(&format!("{}{} \"\"\n", prefix, keyword));
    for line in value.split_inclusive('\n') {
        out.push_str(&format!("{}\"{}\"\n", prefix, escape(line)));
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0B}' => out.push_str("\\v"),
            '\u{0C}' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out
}
