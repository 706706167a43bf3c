use std::fmt;

/// Identity of an entry inside one catalog: `(context, msgid)`.
///
/// `None` and `Some("")` are different contexts, matching how gettext keeps
/// an absent `msgctxt` apart from an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    pub context: Option<String>,
    pub msgid: String,
}

impl EntryKey {
    pub fn new(context: Option<&str>, msgid: impl Into<String>) -> Self {
        Self {
            context: context.map(str::to_string),
            msgid: msgid.into(),
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}|{}", context, self.msgid),
            None => write!(f, "{}", self.msgid),
        }
    }
}

/// Source location where a translatable string was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    /// Path of the source file, with forward slashes.
    pub file: String,
    /// Line number (1-indexed), if known.
    pub line: Option<usize>,
}

impl Reference {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }

    /// Parse a `#:` style reference (`path/to/file.php:12` or just a path).
    pub fn parse(raw: &str) -> Self {
        match raw.rsplit_once(':') {
            Some((file, line)) if !file.is_empty() => match line.parse::<usize>() {
                Ok(line) => Self {
                    file: file.to_string(),
                    line: Some(line),
                },
                Err(_) => Self {
                    file: raw.to_string(),
                    line: None,
                },
            },
            _ => Self {
                file: raw.to_string(),
                line: None,
            },
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => write!(f, "{}", self.file),
        }
    }
}

/// One translatable unit.
///
/// Created by scanners (fresh, untranslated, with references) or by loaders
/// (with translations and whatever metadata the format carries). Only the
/// merge step mutates entries after that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Disambiguating context (`msgctxt`).
    pub context: Option<String>,
    /// Original singular text (`msgid`). Never empty for a real entry.
    pub msgid: String,
    /// Original plural text (`msgid_plural`).
    pub plural: Option<String>,
    /// Translated forms. Index 0 is `msgstr` (or `msgstr[0]`), the rest are
    /// the indexed plural forms. Empty when untranslated.
    pub translations: Vec<String>,
    /// Where the string appears in the source tree.
    pub references: Vec<Reference>,
    /// Translator comments (`# ...`).
    pub comments: Vec<String>,
    /// Comments extracted from source code (`#. ...`).
    pub extracted_comments: Vec<String>,
    /// Flags such as `fuzzy` or `php-format`.
    pub flags: Vec<String>,
    /// Set when the string is no longer found in the source tree.
    pub obsolete: bool,
}

impl Entry {
    pub fn new(msgid: impl Into<String>) -> Self {
        Self {
            msgid: msgid.into(),
            ..Default::default()
        }
    }

    pub fn with_context(context: impl Into<String>, msgid: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            msgid: msgid.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> EntryKey {
        EntryKey {
            context: self.context.clone(),
            msgid: self.msgid.clone(),
        }
    }

    /// Singular translation, if any.
    pub fn translation(&self) -> Option<&str> {
        self.translations
            .first()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    pub fn is_translated(&self) -> bool {
        self.translations.iter().any(|t| !t.is_empty())
    }

    pub fn add_reference(&mut self, reference: Reference) {
        if !self.references.contains(&reference) {
            self.references.push(reference);
        }
    }

    pub fn add_extracted_comment(&mut self, comment: impl Into<String>) {
        let comment = comment.into();
        if !self.extracted_comments.contains(&comment) {
            self.extracted_comments.push(comment);
        }
    }

    /// Fold another occurrence of the same key into this entry.
    ///
    /// References and extracted comments are appended (duplicates dropped),
    /// a missing plural text is adopted. Translations are left alone.
    pub fn absorb(&mut self, other: Entry) {
        for reference in other.references {
            self.add_reference(reference);
        }
        for comment in other.extracted_comments {
            self.add_extracted_comment(comment);
        }
        for comment in other.comments {
            if !self.comments.contains(&comment) {
                self.comments.push(comment);
            }
        }
        if self.plural.is_none() {
            self.plural = other.plural;
        }
    }
}
