//! Plugin implementations: source scanners and catalog loaders/generators.
//!
//! ## Module Structure
//!
//! - `scanners`: extract translatable strings from source files
//! - `po`: gettext `.po` / `.pot` text catalogs
//! - `mo`: gettext `.mo` binary catalogs
//! - `json`: gettext JSON array catalogs
//! - `jed`: Jed locale data (`.jed.json`)
//! - `php_array`: PHP files returning the catalog as an array
//! - `atomic`: all-or-nothing file writes

use std::{fs, path::Path};

use anyhow::{Context, Result};
use enum_dispatch::enum_dispatch;

use crate::core::data::Catalog;

pub mod atomic;
pub mod jed;
pub mod json;
pub mod mo;
pub mod php_array;
pub mod po;
pub mod scanners;

pub use jed::JedFormat;
pub use json::JsonFormat;
pub use mo::MoFormat;
pub use php_array::PhpArrayFormat;
pub use po::PoFormat;

/// Parses an on-disk catalog.
#[enum_dispatch]
pub trait Loader {
    /// Parse catalog bytes. Malformed input is an error, never an empty catalog.
    fn load(&self, bytes: &[u8]) -> Result<Catalog>;

    fn load_file(&self, path: &Path) -> Result<Catalog> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        self.load(&bytes)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))
    }
}

/// Serializes a catalog to an on-disk format.
#[enum_dispatch]
pub trait Generator {
    fn generate(&self, catalog: &Catalog) -> Result<Vec<u8>>;

    /// Write the catalog to `path`, replacing any existing file atomically.
    fn generate_file(&self, catalog: &Catalog, path: &Path) -> Result<()> {
        let bytes = self.generate(catalog)?;
        atomic::write(path, &bytes)
    }
}

/// Every catalog format this crate reads or writes.
#[enum_dispatch(Loader, Generator)]
#[derive(Debug, Clone, Copy)]
pub enum CatalogFormat {
    PoFormat,
    MoFormat,
    JsonFormat,
    JedFormat,
    PhpArrayFormat,
}

/// `Some(s)` for non-empty strings.
fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
