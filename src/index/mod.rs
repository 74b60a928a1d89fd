//! Index builder: turns a vault of markdown documents into the knowledge store.
//!
//! - [`frontmatter`] decodes each document's leading YAML block.
//! - [`cache`] holds the per-file fingerprint cache that makes rebuilds incremental.
//! - [`builder`] walks the vault and writes both artifacts.

pub mod builder;
pub mod cache;
pub mod frontmatter;

pub use builder::{build, collect_documents, BuildOptions, BuildReport, FileOutcome};
