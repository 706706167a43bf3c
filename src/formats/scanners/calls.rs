//! Finds gettext-style function calls in a token stream.

use std::collections::HashMap;

use super::{
    Occurrence,
    lexer::{LexerOptions, Token, TokenKind, tokenize},
};

/// Argument positions of one translation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub domain: Option<usize>,
    pub context: Option<usize>,
    pub msgid: usize,
    pub plural: Option<usize>,
}

impl Signature {
    const fn new(
        domain: Option<usize>,
        context: Option<usize>,
        msgid: usize,
        plural: Option<usize>,
    ) -> Self {
        Self {
            domain,
            context,
            msgid,
            plural,
        }
    }
}

/// The classic gettext family plus the short `__` aliases.
pub const GETTEXT_FUNCTIONS: &[(&str, Signature)] = &[
    ("gettext", Signature::new(None, None, 0, None)),
    ("__", Signature::new(None, None, 0, None)),
    ("_", Signature::new(None, None, 0, None)),
    ("ngettext", Signature::new(None, None, 0, Some(1))),
    ("n__", Signature::new(None, None, 0, Some(1))),
    ("pgettext", Signature::new(None, Some(0), 1, None)),
    ("p__", Signature::new(None, Some(0), 1, None)),
    ("dgettext", Signature::new(Some(0), None, 1, None)),
    ("d__", Signature::new(Some(0), None, 1, None)),
    ("dngettext", Signature::new(Some(0), None, 1, Some(2))),
    ("dn__", Signature::new(Some(0), None, 1, Some(2))),
    ("npgettext", Signature::new(None, Some(0), 1, Some(2))),
    ("np__", Signature::new(None, Some(0), 1, Some(2))),
    ("dpgettext", Signature::new(Some(0), Some(1), 2, None)),
    ("dp__", Signature::new(Some(0), Some(1), 2, None)),
    ("dnpgettext", Signature::new(Some(0), Some(1), 2, Some(3))),
    ("dnp__", Signature::new(Some(0), Some(1), 2, Some(3))),
];

/// Operators that may join string literals inside one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concat {
    /// PHP: `'a' . 'b'`
    Dot,
    /// JavaScript: `'a' + 'b'`
    Plus,
    /// Twig: `'a' ~ 'b'`
    Tilde,
}

impl Concat {
    fn as_char(self) -> char {
        match self {
            Concat::Dot => '.',
            Concat::Plus => '+',
            Concat::Tilde => '~',
        }
    }
}

/// Token-level call finder shared by every source scanner.
#[derive(Debug, Clone)]
pub struct CallScanner {
    functions: HashMap<String, Signature>,
    lexer: LexerOptions,
    concat: Concat,
    comment_prefixes: Vec<String>,
}

impl CallScanner {
    pub fn new(lexer: LexerOptions, concat: Concat, comment_prefixes: &[String]) -> Self {
        Self {
            functions: GETTEXT_FUNCTIONS
                .iter()
                .map(|(name, sig)| (name.to_string(), *sig))
                .collect(),
            lexer,
            concat,
            comment_prefixes: comment_prefixes.to_vec(),
        }
    }

    pub fn with_function(mut self, name: &str, signature: Signature) -> Self {
        self.functions.insert(name.to_string(), signature);
        self
    }

    pub fn extract(&self, code: &str) -> Vec<Occurrence> {
        let tokens = tokenize(code, self.lexer);
        let mut occurrences = Vec::new();
        let mut last_comment: Option<(&str, usize)> = None;

        for (i, token) in tokens.iter().enumerate() {
            match &token.kind {
                TokenKind::Comment(text) => {
                    last_comment = Some((text.as_str(), token.end_line));
                }
                TokenKind::Ident(name) => {
                    let Some(signature) = self.functions.get(name) else {
                        continue;
                    };
                    if tokens.get(i + 1).map(|t| &t.kind) != Some(&TokenKind::OpenParen) {
                        continue;
                    }
                    let Some(args) = self.call_arguments(&tokens[i + 2..]) else {
                        continue;
                    };
                    let Some(mut occurrence) = build_occurrence(signature, &args, token.line)
                    else {
                        continue;
                    };
                    if let Some((text, end_line)) = last_comment
                        && (end_line == token.line || end_line + 1 == token.line)
                        && self.is_translator_comment(text)
                    {
                        occurrence.comments.push(text.to_string());
                    }
                    occurrences.push(occurrence);
                }
                _ => {}
            }
        }

        occurrences
    }

    fn is_translator_comment(&self, text: &str) -> bool {
        self.comment_prefixes
            .iter()
            .any(|prefix| text.starts_with(prefix.as_str()))
    }

    /// Collect the arguments of a call whose `(` was just consumed.
    ///
    /// Each argument is `Some(text)` when it is a string literal (or a
    /// concatenation of literals) and `None` otherwise. Returns `None` when
    /// the closing parenthesis is missing.
    fn call_arguments(&self, tokens: &[Token]) -> Option<Vec<Option<String>>> {
        let mut args = Vec::new();
        let mut current: Vec<&TokenKind> = Vec::new();
        let mut depth = 0usize;

        for token in tokens {
            match &token.kind {
                TokenKind::Comment(_) => continue,
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen if depth == 0 => {
                    if !current.is_empty() || !args.is_empty() {
                        args.push(self.literal(&current));
                    }
                    return Some(args);
                }
                TokenKind::CloseParen => depth -= 1,
                TokenKind::Comma if depth == 0 => {
                    args.push(self.literal(&current));
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(&token.kind);
        }

        None
    }

    fn literal(&self, parts: &[&TokenKind]) -> Option<String> {
        let op = self.concat.as_char();
        let mut text = String::new();
        let mut expect_string = true;
        for part in parts {
            match part {
                TokenKind::Str(s) if expect_string => {
                    text.push_str(s);
                    expect_string = false;
                }
                TokenKind::Punct(c) if !expect_string && *c == op => {
                    expect_string = true;
                }
                _ => return None,
            }
        }
        (!expect_string).then_some(text)
    }
}

fn build_occurrence(
    signature: &Signature,
    args: &[Option<String>],
    line: usize,
) -> Option<Occurrence> {
    let required = |index: usize| args.get(index).cloned().flatten();

    let msgid = required(signature.msgid).filter(|m| !m.is_empty())?;
    let domain = match signature.domain {
        Some(index) => Some(required(index)?),
        None => None,
    };
    let context = match signature.context {
        Some(index) => Some(required(index)?),
        None => None,
    };
    let plural = match signature.plural {
        Some(index) => Some(required(index)?),
        None => None,
    };

    Some(Occurrence {
        domain,
        context,
        msgid,
        plural,
        line,
        comments: Vec::new(),
    })
}
