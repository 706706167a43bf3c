//! Source scanners: find translatable strings in source files.
//!
//! An [`Extractor`] is the stateless, per-format part (tokenize and find
//! calls). A [`Scanner`] wraps one extractor for the duration of a run and
//! owns the per-domain accumulation of what it found.
//!
//! ## Module Structure
//!
//! - `lexer`: tokenizer for C-like call syntax
//! - `calls`: gettext function table and call finder
//! - `regions`: code-region detection for PHP, Blade and Twig files

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use enum_dispatch::enum_dispatch;

use crate::core::data::{Catalog, Entry, Reference};

pub mod calls;
pub mod lexer;
pub mod regions;

use calls::{CallScanner, Concat, Signature};
use lexer::LexerOptions;

/// Comment prefixes that mark a comment as a note for translators.
pub const DEFAULT_COMMENT_PREFIXES: &[&str] = &["i18n:", "Translators:"];

/// One translatable call found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Domain named by the call (`d*gettext`), if any.
    pub domain: Option<String>,
    pub context: Option<String>,
    pub msgid: String,
    pub plural: Option<String>,
    /// Line of the function name (1-indexed).
    pub line: usize,
    /// Translator comments found right above the call.
    pub comments: Vec<String>,
}

/// Options shared by every extractor.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub comment_prefixes: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            comment_prefixes: DEFAULT_COMMENT_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Finds translatable calls in the text of one source file.
#[enum_dispatch]
pub trait Extractor {
    fn extract(&self, source: &str) -> Vec<Occurrence>;
}

/// Every source format with a scanner.
#[enum_dispatch(Extractor)]
#[derive(Debug, Clone)]
pub enum CodeExtractor {
    PhpExtractor,
    BladeExtractor,
    TwigExtractor,
    JsExtractor,
}

/// PHP code; only `<?php ... ?>` blocks are scanned.
#[derive(Debug, Clone)]
pub struct PhpExtractor {
    calls: CallScanner,
}

impl PhpExtractor {
    pub fn new(options: &ScanOptions) -> Self {
        Self {
            calls: CallScanner::new(php_lexer(), Concat::Dot, &options.comment_prefixes),
        }
    }
}

impl Extractor for PhpExtractor {
    fn extract(&self, source: &str) -> Vec<Occurrence> {
        let code = regions::mask(source, &regions::php_regions(source));
        self.calls.extract(&code)
    }
}

/// Laravel Blade templates: echoes, directives and PHP blocks.
#[derive(Debug, Clone)]
pub struct BladeExtractor {
    calls: CallScanner,
}

impl BladeExtractor {
    pub fn new(options: &ScanOptions) -> Self {
        let msgid_only = Signature {
            domain: None,
            context: None,
            msgid: 0,
            plural: None,
        };
        let lexer = LexerOptions {
            at_identifiers: true,
            ..php_lexer()
        };
        Self {
            calls: CallScanner::new(lexer, Concat::Dot, &options.comment_prefixes)
                .with_function("trans", msgid_only)
                .with_function("trans_choice", msgid_only)
                .with_function("@lang", msgid_only)
                .with_function("@choice", msgid_only),
        }
    }
}

impl Extractor for BladeExtractor {
    fn extract(&self, source: &str) -> Vec<Occurrence> {
        let code = regions::mask(source, &regions::blade_regions(source));
        self.calls.extract(&code)
    }
}

/// Twig templates: `{{ }}` and `{% %}` blocks.
#[derive(Debug, Clone)]
pub struct TwigExtractor {
    calls: CallScanner,
}

impl TwigExtractor {
    pub fn new(options: &ScanOptions) -> Self {
        Self {
            calls: CallScanner::new(
                LexerOptions::default(),
                Concat::Tilde,
                &options.comment_prefixes,
            ),
        }
    }
}

impl Extractor for TwigExtractor {
    fn extract(&self, source: &str) -> Vec<Occurrence> {
        let code = regions::mask(source, &regions::twig_regions(source));
        self.calls.extract(&code)
    }
}

/// JavaScript / TypeScript; the whole file is code.
#[derive(Debug, Clone)]
pub struct JsExtractor {
    calls: CallScanner,
}

impl JsExtractor {
    pub fn new(options: &ScanOptions) -> Self {
        let lexer = LexerOptions {
            template_literals: true,
            ..Default::default()
        };
        Self {
            calls: CallScanner::new(lexer, Concat::Plus, &options.comment_prefixes),
        }
    }
}

impl Extractor for JsExtractor {
    fn extract(&self, source: &str) -> Vec<Occurrence> {
        self.calls.extract(source)
    }
}

fn php_lexer() -> LexerOptions {
    LexerOptions {
        hash_comments: true,
        raw_single_quotes: true,
        ..Default::default()
    }
}

/// Stateful scanner for one source format during one run.
///
/// Strings are attributed to the domain named in the call or, failing that,
/// to the default domain. The accumulated catalogs are read out once with
/// [`Scanner::into_translations`].
#[derive(Debug)]
pub struct Scanner<'a> {
    extractor: &'a CodeExtractor,
    default_domain: String,
    translations: BTreeMap<String, Catalog>,
}

impl<'a> Scanner<'a> {
    pub fn new(extractor: &'a CodeExtractor, default_domain: &str) -> Self {
        Self {
            extractor,
            default_domain: default_domain.to_string(),
            translations: BTreeMap::new(),
        }
    }

    /// Read one source file and extract its calls.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Takes `&self` so
    /// files can be read in parallel and recorded afterwards.
    pub fn scan_file(&self, path: &Path) -> Result<Vec<Occurrence>> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        Ok(self.extractor.extract(&String::from_utf8_lossy(&bytes)))
    }

    /// Add occurrences found by [`Scanner::scan_file`] in the file named
    /// `reference`.
    pub fn record(&mut self, reference: &str, occurrences: Vec<Occurrence>) {
        for occurrence in occurrences {
            let domain = occurrence
                .domain
                .unwrap_or_else(|| self.default_domain.clone());

            let mut entry = Entry::new(occurrence.msgid);
            entry.context = occurrence.context;
            entry.plural = occurrence.plural;
            entry.add_reference(Reference::new(reference, occurrence.line));
            for comment in occurrence.comments {
                entry.add_extracted_comment(comment);
            }

            self.translations
                .entry(domain)
                .or_insert_with_key(|domain| Catalog::new(Some(domain)))
                .add(entry);
        }
    }

    pub fn into_translations(self) -> BTreeMap<String, Catalog> {
        self.translations
    }
}
