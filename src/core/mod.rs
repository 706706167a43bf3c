//! The sync engine.
//!
//! ## Module Structure
//!
//! - `data`: entries, headers and catalogs
//! - `registry`: suffix → scanner / loader / generator resolution
//! - `walker`: lazy multi-root source enumeration
//! - `extract`: routes files to scanners and gathers results per domain
//! - `domains`: declared domains, their catalogs and targets
//! - `merge`: scan-and-load merge policy
//! - `persist`: per-domain merge and fan-out to targets
//! - `sync`: the full run and its result
//! - `error`: typed errors callers branch on

pub mod data;
pub mod domains;
pub mod error;
pub mod extract;
pub mod merge;
pub mod persist;
pub mod registry;
pub mod sync;
pub mod walker;
