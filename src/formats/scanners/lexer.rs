//! A small tokenizer for C-like call syntax.
//!
//! It only knows enough to find `name("literal", ...)` calls: identifiers,
//! string literals, comments, parentheses and commas. Everything else is
//! passed through as `Punct` so argument lists can be checked for
//! concatenation operators.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    /// A string literal with escapes resolved.
    Str(String),
    /// A string that cannot be used as a msgid, such as an interpolated
    /// template literal or one holding NUL or EOT (the MO separators).
    Dynamic,
    Comment(String),
    OpenParen,
    CloseParen,
    Comma,
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Line where the token starts (1-indexed).
    pub line: usize,
    /// Line where the token ends; differs from `line` for multi-line tokens.
    pub end_line: usize,
}

/// Language-specific lexing switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexerOptions {
    /// `#` starts a line comment (PHP).
    pub hash_comments: bool,
    /// Backtick template literals (JavaScript).
    pub template_literals: bool,
    /// `@name` is lexed as one identifier (Blade directives).
    pub at_identifiers: bool,
    /// Single-quoted strings only understand `\\` and `\'` (PHP).
    pub raw_single_quotes: bool,
}

pub fn tokenize(source: &str, options: LexerOptions) -> Vec<Token> {
    Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        options,
    }
    .run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    options: LexerOptions,
}

impl Lexer {
    fn run(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek(0) {
            let line = self.line;
            let kind = match c {
                '\n' => {
                    self.bump();
                    continue;
                }
                c if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                '/' if self.peek(1) == Some('/') => self.line_comment(2),
                '#' if self.options.hash_comments && self.peek(1) != Some('[') => {
                    self.line_comment(1)
                }
                '/' if self.peek(1) == Some('*') => self.block_comment(),
                '"' | '\'' => self.string(c),
                '`' if self.options.template_literals => self.template(),
                '(' => {
                    self.bump();
                    TokenKind::OpenParen
                }
                ')' => {
                    self.bump();
                    TokenKind::CloseParen
                }
                ',' => {
                    self.bump();
                    TokenKind::Comma
                }
                '@' if self.options.at_identifiers
                    && self.peek(1).is_some_and(is_ident_start) =>
                {
                    self.bump();
                    let mut name = String::from("@");
                    name.push_str(&self.ident());
                    TokenKind::Ident(name)
                }
                c if is_ident_start(c) => TokenKind::Ident(self.ident()),
                c => {
                    self.bump();
                    TokenKind::Punct(c)
                }
            };
            tokens.push(Token {
                kind,
                line,
                end_line: self.line,
            });
        }
        tokens
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn ident(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek(0) {
            if is_ident_continue(c) {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        name
    }

    fn line_comment(&mut self, marker_len: usize) -> TokenKind {
        for _ in 0..marker_len {
            self.bump();
        }
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        TokenKind::Comment(text.trim().to_string())
    }

    fn block_comment(&mut self) -> TokenKind {
        self.bump();
        self.bump();
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c == '*' && self.peek(1) == Some('/') {
                self.bump();
                self.bump();
                break;
            }
            text.push(c);
            self.bump();
        }
        let cleaned: Vec<&str> = text
            .lines()
            .map(|l| l.trim().trim_start_matches('*').trim())
            .filter(|l| !l.is_empty())
            .collect();
        TokenKind::Comment(cleaned.join(" "))
    }

    fn string(&mut self, quote: char) -> TokenKind {
        self.bump();
        let raw = quote == '\'' && self.options.raw_single_quotes;
        let mut value = String::new();
        while let Some(c) = self.bump() {
            if c == quote {
                return literal(value);
            }
            if c != '\\' {
                value.push(c);
                continue;
            }
            let Some(next) = self.bump() else { break };
            if raw {
                if next != '\\' && next != '\'' {
                    value.push('\\');
                }
                value.push(next);
                continue;
            }
            match next {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                'v' => value.push('\u{0B}'),
                'f' => value.push('\u{0C}'),
                '0' => value.push('\0'),
                '\n' => {}
                '\\' | '"' | '\'' | '`' | '$' => value.push(next),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
        }
        // Unterminated literal: not usable as a msgid.
        TokenKind::Dynamic
    }

    fn template(&mut self) -> TokenKind {
        self.bump();
        let mut value = String::new();
        let mut dynamic = false;
        while let Some(c) = self.bump() {
            match c {
                '`' => {
                    return if dynamic {
                        TokenKind::Dynamic
                    } else {
                        literal(value)
                    };
                }
                '\\' => {
                    if let Some(next) = self.bump() {
                        match next {
                            'n' => value.push('\n'),
                            't' => value.push('\t'),
                            other => value.push(other),
                        }
                    }
                }
                '$' if self.peek(0) == Some('{') => {
                    dynamic = true;
                    value.push(c);
                }
                other => value.push(other),
            }
        }
        TokenKind::Dynamic
    }
}

fn literal(value: String) -> TokenKind {
    if value.contains(['\0', '\u{04}']) {
        TokenKind::Dynamic
    } else {
        TokenKind::Str(value)
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}
