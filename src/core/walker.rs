//! Source walker: one lazy stream of files over several source roots.

use std::{
    path::{Path, PathBuf},
    vec,
};

use glob::Pattern;
use regex::Regex;
use walkdir::{DirEntry, WalkDir};

/// A directory to scan, optionally narrowed to paths matching `pattern`.
#[derive(Debug, Clone)]
pub struct SourceRoot {
    pub path: PathBuf,
    /// Matched against the full path of each file.
    pub pattern: Option<Regex>,
}

impl SourceRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    fn includes(&self, path: &Path) -> bool {
        self.pattern
            .as_ref()
            .is_none_or(|p| p.is_match(&path.to_string_lossy()))
    }
}

/// Paths to leave out of every root.
///
/// Patterns containing `*` or `?` are globs matched against the full path;
/// anything else is a literal directory or file, matched by prefix.
#[derive(Debug, Clone, Default)]
pub struct Ignores {
    literal: Vec<PathBuf>,
    globs: Vec<Pattern>,
}

impl Ignores {
    /// Build from raw patterns; relative literals resolve against `base`.
    pub fn new(base: &Path, patterns: &[String]) -> Result<Self, glob::PatternError> {
        let mut ignores = Self::default();
        for raw in patterns {
            if is_glob_pattern(raw) {
                ignores.globs.push(Pattern::new(raw)?);
            } else {
                ignores.literal.push(base.join(raw));
            }
        }
        Ok(ignores)
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.literal.iter().any(|p| path.starts_with(p)) {
            return true;
        }
        let path = path.to_string_lossy();
        self.globs.iter().any(|p| p.matches(&path))
    }
}

/// Check if a pattern contains glob wildcards (* or ?).
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Depth-first walk of each root in turn.
///
/// Hidden entries below a root are skipped (a hidden root itself is walked).
/// Regular files and symlinks to files are yielded; symlinked directories
/// are not followed.
/// A file under two overlapping roots is yielded once per root. The
/// iterator is not restartable.
pub struct SourceWalker {
    roots: vec::IntoIter<SourceRoot>,
    current: Option<(SourceRoot, walkdir::IntoIter)>,
    ignores: Ignores,
    errors: usize,
}

impl SourceWalker {
    pub fn new(roots: Vec<SourceRoot>, ignores: Ignores) -> Self {
        Self {
            roots: roots.into_iter(),
            current: None,
            ignores,
            errors: 0,
        }
    }

    /// Entries that could not be read so far (permissions, vanished paths).
    pub fn errors(&self) -> usize {
        self.errors
    }
}

impl Iterator for SourceWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let Some((root, entries)) = &mut self.current else {
                let root = self.roots.next()?;
                let entries = WalkDir::new(&root.path).into_iter();
                self.current = Some((root, entries));
                continue;
            };

            let Some(entry) = entries.next() else {
                self.current = None;
                continue;
            };
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.errors += 1;
                    tracing::warn!("Cannot access path: {}", e);
                    continue;
                }
            };

            if entry.depth() > 0 && is_hidden(&entry) {
                if entry.file_type().is_dir() {
                    entries.skip_current_dir();
                }
                continue;
            }
            if self.ignores.matches(entry.path()) {
                if entry.file_type().is_dir() {
                    entries.skip_current_dir();
                }
                continue;
            }
            if !is_file(&entry) || !root.includes(entry.path()) {
                continue;
            }
            return Some(entry.into_path());
        }
    }
}

fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
