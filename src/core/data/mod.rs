//! In-memory translation data shared by every stage of a run.
//!
//! ## Module Structure
//!
//! - `entry`: `Entry`, its key and source references
//! - `headers`: ordered catalog header metadata
//! - `catalog`: ordered, key-unique collection of entries

pub mod catalog;
pub mod entry;
pub mod headers;

pub use catalog::Catalog;
pub use entry::{Entry, EntryKey, Reference};
pub use headers::Headers;
