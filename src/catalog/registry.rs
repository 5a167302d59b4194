//! Exclusive owner of the open record-file and index handles of one
//! database. Tables are keyed by table name, indexes by the deterministic
//! identity from [`crate::catalog::layout::index_file_name`].
//!
//! A lookup miss here means the catalog and the registry have diverged, so
//! it surfaces as [`CatalogError::HandleMissing`] instead of a user-facing
//! not-found error.

use dashmap::mapref::one::Ref;
use dashmap::DashMap;

use crate::error::{CatalogError, Result};
use crate::storage::index::IndexHandle;
use crate::storage::record::RecordFileHandle;

#[derive(Debug, Default)]
pub struct ResourceHandleRegistry {
    table_handles: DashMap<String, RecordFileHandle>,
    index_handles: DashMap<String, IndexHandle>,
}

impl ResourceHandleRegistry {
    pub fn register_table_handle(&self, tab_name: &str, handle: RecordFileHandle) {
        self.table_handles.insert(tab_name.to_owned(), handle);
    }

    pub fn table_handle(&self, tab_name: &str) -> Result<Ref<'_, String, RecordFileHandle>> {
        self.table_handles
            .get(tab_name)
            .ok_or_else(|| CatalogError::HandleMissing(tab_name.to_owned()))
    }

    pub fn unregister_table_handle(&self, tab_name: &str) -> Result<RecordFileHandle> {
        self.table_handles
            .remove(tab_name)
            .map(|(_, handle)| handle)
            .ok_or_else(|| CatalogError::HandleMissing(tab_name.to_owned()))
    }

    pub fn register_index_handle(&self, identity: String, handle: IndexHandle) {
        self.index_handles.insert(identity, handle);
    }

    pub fn index_handle(&self, identity: &str) -> Result<Ref<'_, String, IndexHandle>> {
        self.index_handles
            .get(identity)
            .ok_or_else(|| CatalogError::HandleMissing(identity.to_owned()))
    }

    pub fn unregister_index_handle(&self, identity: &str) -> Result<IndexHandle> {
        self.index_handles
            .remove(identity)
            .map(|(_, handle)| handle)
            .ok_or_else(|| CatalogError::HandleMissing(identity.to_owned()))
    }

    pub fn has_table_handle(&self, tab_name: &str) -> bool {
        self.table_handles.contains_key(tab_name)
    }

    pub fn has_index_handle(&self, identity: &str) -> bool {
        self.index_handles.contains_key(identity)
    }

    pub fn table_handle_count(&self) -> usize {
        self.table_handles.len()
    }

    pub fn index_handle_count(&self) -> usize {
        self.index_handles.len()
    }

    /// Hands every handle back to the caller, leaving the registry empty.
    /// Used when closing a database.
    pub fn into_handles(self) -> (Vec<RecordFileHandle>, Vec<IndexHandle>) {
        let tables = self
            .table_handles
            .into_iter()
            .map(|(_, handle)| handle)
            .collect();
        let indexes = self
            .index_handles
            .into_iter()
            .map(|(_, handle)| handle)
            .collect();
        (tables, indexes)
    }
}
