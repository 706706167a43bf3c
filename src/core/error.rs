//! Typed errors for the failures callers branch on.
//!
//! Everything else travels as `anyhow::Error` with context attached.

use std::fmt;

use thiserror::Error;

/// Which plugin capability a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Scanner,
    Loader,
    Generator,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Scanner => write!(f, "scanner"),
            PluginKind::Loader => write!(f, "loader"),
            PluginKind::Generator => write!(f, "generator"),
        }
    }
}

/// Format registry lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No registered suffix matches the file name.
    #[error("no {kind} has been found for \"{file}\"")]
    NotFound { kind: PluginKind, file: String },
    /// The best matching suffix has no implementation of the requested kind.
    #[error("format \"{suffix}\" has no {kind} (\"{file}\")")]
    Unsupported {
        kind: PluginKind,
        suffix: String,
        file: String,
    },
}

/// Problems with the run configuration, detected before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no domains declared")]
    NoDomains,
    #[error("domain \"{0}\" has no target files")]
    NoTargets(String),
    #[error("domain name must not be empty")]
    EmptyDomainName,
    #[error("no source directories configured")]
    NoSources,
    #[error("default domain \"{0}\" is not declared")]
    UnknownDefaultDomain(String),
    #[error("invalid {field} pattern \"{pattern}\": {message}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        message: String,
    },
}

/// Malformed catalog content.
///
/// Loaders must return this instead of an empty catalog so existing
/// translations are never mistaken for "nothing there yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: Option<usize>,
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }

    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}
