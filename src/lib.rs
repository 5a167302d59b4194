//! Catalog and storage-lifecycle manager for an embedded relational engine.
//!
//! Maps a logical schema (databases, tables, columns, indexes) onto a
//! directory-per-database on-disk layout and keeps the in-memory schema
//! synchronized with the physical record and index files.

pub mod catalog;
pub mod common;
pub mod error;
pub mod printer;
pub mod storage;
