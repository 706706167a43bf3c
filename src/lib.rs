//! msgsync - gettext string extraction and catalog synchronization
//!
//! msgsync scans a source tree for translatable strings (`__()`, `n__()`,
//! `dgettext()`, ...), groups them by gettext domain and merges them into
//! each domain's catalog files, keeping existing translations and marking
//! vanished strings obsolete.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Sync pipeline (walk, extract, merge, persist)
//! - `formats`: Source scanners and catalog loaders/generators

pub mod cli;
pub mod config;
pub mod core;
pub mod formats;
