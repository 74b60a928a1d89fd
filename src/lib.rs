//! Knowledge packages for AI coding agents: indexing, search, dependency resolution, and
//! per-session delivery tracking.
//!
//! tome turns a vault of markdown documents with YAML frontmatter into a JSON metadata
//! store, answers tag/text/category queries against it, expands results with their
//! declared prerequisites, and remembers what each agent session has already been given.
//! It runs as a CLI or as an [MCP](https://modelcontextprotocol.io/) server over stdio.
//!
//! # Architecture
//!
//! - **Index**: incremental build keyed by file fingerprint (mtime + size)
//! - **Store**: one JSON file, packages grouped by category, plus named command profiles
//! - **Search**: AND-ed filters, tag-overlap scoring, source-language exclusion
//! - **Session**: SQLite state database with append-only tracking events
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`index`]: Vault walk, frontmatter parsing, and the fingerprint cache
//! - [`store`]: The metadata store and package/profile types
//! - [`search`]: Filtering, scoring, and command-profile search
//! - [`resolve`]: Transitive `required_knowledge` expansion
//! - [`session`]: Loaded-package state and usage tracking
//! - [`load`]: Package delivery with session dedup
//! - [`validate`]: Corpus quality checks
//! - [`db`]: SQLite initialization and schema

pub mod category;
pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod load;
pub mod resolve;
pub mod search;
pub mod session;
pub mod store;
pub mod validate;
