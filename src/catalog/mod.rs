//! The catalog core: create/drop/open/close for databases, tables and
//! indexes.
//!
//! Every mutating operation follows the same shape: validate preconditions
//! against the in-memory schema, perform the physical effects through the
//! record and index stores, update the schema and the handle registry
//! together, and persist the metadata file. Callers serialize all mutations
//! with an external lock; nothing here is reentrant.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use dashmap::mapref::one::Ref;
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};
use crate::printer::TablePrinter;
use crate::storage::index::{IndexFileManager, IndexHandle};
use crate::storage::record::{RecordFileManager, RecordFileHandle};

pub mod layout;
pub mod meta;
pub mod registry;

use meta::{ColDef, ColMeta, DbMeta, IndexMeta, TabMeta};
use registry::ResourceHandleRegistry;

/// Entry point for database-level operations. Holds only the base directory
/// under which every database gets its own subdirectory.
pub struct CatalogManager {
    base_dir: PathBuf,
}

impl CatalogManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        if !base_dir.is_dir() {
            return Err(CatalogError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", base_dir.display()),
            )));
        }
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Creates a database: a directory carrying an empty-schema metadata
    /// file and an empty log file. The directory is assembled under a
    /// staging name and renamed into place, so a failure partway leaves no
    /// half-initialized database behind. Does not open the database.
    pub fn create_db(&self, db_name: &str) -> Result<()> {
        let db_dir = layout::database_dir(&self.base_dir, db_name);
        if db_dir.exists() {
            return Err(CatalogError::DatabaseExists(db_name.to_owned()));
        }

        let staging = self.base_dir.join(format!(".{}.staging", db_name));
        if staging.exists() {
            // leftover from an earlier interrupted attempt
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir(&staging)?;

        let populate = || -> Result<()> {
            meta::write_meta(&DbMeta::new(db_name), &layout::meta_path(&staging))?;
            File::create(layout::log_path(&staging))?;
            Ok(())
        };
        if let Err(err) = populate() {
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                warn!(db = db_name, error = %cleanup, "failed to remove staging directory");
            }
            return Err(err);
        }

        fs::rename(&staging, &db_dir)?;
        debug!(db = db_name, "created database");
        Ok(())
    }

    /// Removes the database directory and everything in it. The caller must
    /// ensure the database is not currently open.
    pub fn drop_db(&self, db_name: &str) -> Result<()> {
        let db_dir = layout::database_dir(&self.base_dir, db_name);
        if !db_dir.is_dir() {
            return Err(CatalogError::DatabaseNotFound(db_name.to_owned()));
        }
        fs::remove_dir_all(&db_dir)?;
        debug!(db = db_name, "dropped database");
        Ok(())
    }

    /// Opens a database: loads the schema from the metadata file, then opens
    /// the record file of every table and the file of every index.
    ///
    /// The open is all-or-nothing. Handles are collected into a staging
    /// registry and only committed as an [`OpenDatabase`] once every file
    /// opened; on any failure the registry is dropped, releasing whatever
    /// was opened so far.
    pub fn open_db(&self, db_name: &str) -> Result<OpenDatabase> {
        let db_dir = layout::database_dir(&self.base_dir, db_name);
        if !db_dir.is_dir() {
            return Err(CatalogError::DatabaseNotFound(db_name.to_owned()));
        }

        let db = meta::read_meta(&layout::meta_path(&db_dir))?;
        let records = RecordFileManager::new(&db_dir);
        let indexes = IndexFileManager::new(&db_dir);
        let registry = ResourceHandleRegistry::default();

        for tab in db.tabs.values() {
            let handle = records.open_file(&tab.name)?;
            registry.register_table_handle(&tab.name, handle);
            for index in &tab.indexes {
                let identity = indexes.index_name(&tab.name, &index.col_names);
                let handle = indexes.open_index(&tab.name, &index.col_names)?;
                registry.register_index_handle(identity, handle);
            }
        }

        debug!(db = db_name, tables = db.tabs.len(), "opened database");
        Ok(OpenDatabase {
            db_dir,
            db,
            registry,
            records,
            indexes,
        })
    }
}

/// A database whose schema is loaded and whose record and index files are
/// open. Owns the schema, the handle registry and the two file stores;
/// dropping or closing it is the only way those handles are released.
#[derive(Debug)]
pub struct OpenDatabase {
    db_dir: PathBuf,
    db: DbMeta,
    registry: ResourceHandleRegistry,
    records: RecordFileManager,
    indexes: IndexFileManager,
}

impl OpenDatabase {
    pub fn name(&self) -> &str {
        &self.db.name
    }

    pub fn meta(&self) -> &DbMeta {
        &self.db
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }

    /// Writes the current schema to the metadata file, replacing whatever
    /// was persisted before.
    pub fn flush_meta(&self) -> Result<()> {
        meta::write_meta(&self.db, &layout::meta_path(&self.db_dir))
    }

    /// Persists the schema, then closes every registered table and index
    /// handle. Consumes the database; a closed database cannot be touched
    /// again.
    pub fn close(self) -> Result<()> {
        self.flush_meta()?;
        let name = self.db.name;
        let (table_handles, index_handles) = self.registry.into_handles();
        for handle in table_handles {
            self.records.close_file(handle)?;
        }
        for handle in index_handles {
            self.indexes.close_index(handle)?;
        }
        debug!(db = %name, "closed database");
        Ok(())
    }

    pub fn show_tables(&self) -> String {
        let mut printer = TablePrinter::new(vec!["Tables"]);
        for tab in self.db.tabs.values() {
            printer.add_record(vec![tab.name.clone()]);
        }
        printer.render()
    }

    pub fn desc_table(&self, tab_name: &str) -> Result<String> {
        let tab = self.db.table(tab_name)?;
        let mut printer = TablePrinter::new(vec!["Field", "Type", "Index"]);
        for col in &tab.cols {
            printer.add_record(vec![
                col.name.clone(),
                col.col_type.to_string(),
                if col.indexed { "YES" } else { "NO" }.to_owned(),
            ]);
        }
        Ok(printer.render())
    }

    /// Creates a table: computes the record layout, creates and opens the
    /// record file, and persists the new schema. Column order is preserved
    /// verbatim and defines the on-disk record layout.
    pub fn create_table(&mut self, tab_name: &str, col_defs: &[ColDef]) -> Result<()> {
        if self.db.is_table(tab_name) {
            return Err(CatalogError::TableExists(tab_name.to_owned()));
        }
        let tab = TabMeta::new(tab_name, col_defs)?;
        self.records.create_file(tab_name, tab.record_size())?;
        let handle = self.records.open_file(tab_name)?;
        self.registry.register_table_handle(tab_name, handle);
        self.db.tabs.insert(tab_name.to_owned(), tab);
        debug!(db = %self.db.name, table = tab_name, "created table");
        self.flush_meta()
    }

    /// Drops a table and every index on it, destroying their files and
    /// releasing their handles, then persists the shrunk schema.
    pub fn drop_table(&mut self, tab_name: &str) -> Result<()> {
        if !self.db.is_table(tab_name) {
            return Err(CatalogError::TableNotFound(tab_name.to_owned()));
        }

        let index_col_lists: Vec<Vec<String>> = self
            .db
            .table(tab_name)?
            .indexes
            .iter()
            .map(|index| index.col_names.clone())
            .collect();
        for col_names in index_col_lists {
            self.drop_index_files(tab_name, &col_names)?;
        }

        let handle = self.registry.unregister_table_handle(tab_name)?;
        self.records.close_file(handle)?;
        self.records.destroy_file(tab_name)?;
        self.db.tabs.remove(tab_name);
        debug!(db = %self.db.name, table = tab_name, "dropped table");
        self.flush_meta()
    }

    /// Creates an index over the given columns, in the given order. The
    /// order defines the key layout and is part of the index identity.
    pub fn create_index<S: AsRef<str>>(&mut self, tab_name: &str, col_names: &[S]) -> Result<()> {
        let col_names: Vec<String> = col_names.iter().map(|c| c.as_ref().to_owned()).collect();
        let tab = self.db.table(tab_name)?;
        if tab.has_index(&col_names) || self.indexes.exists(tab_name, &col_names) {
            return Err(CatalogError::IndexExists(
                tab_name.to_owned(),
                col_names.join(", "),
            ));
        }

        let mut index_cols: Vec<ColMeta> = Vec::with_capacity(col_names.len());
        for col_name in &col_names {
            index_cols.push(tab.col(col_name)?.clone());
        }

        self.indexes.create_index(tab_name, &index_cols)?;
        let identity = self.indexes.index_name(tab_name, &col_names);
        let handle = self.indexes.open_index(tab_name, &col_names)?;
        self.registry.register_index_handle(identity, handle);

        let tab = self.db.table_mut(tab_name)?;
        tab.indexes.push(IndexMeta::new(tab_name, &index_cols));
        tab.refresh_index_flags();
        debug!(db = %self.db.name, table = tab_name, cols = %col_names.join(","), "created index");
        self.flush_meta()
    }

    /// Drops the index identified by the ordered column name list.
    pub fn drop_index<S: AsRef<str>>(&mut self, tab_name: &str, col_names: &[S]) -> Result<()> {
        let col_names: Vec<String> = col_names.iter().map(|c| c.as_ref().to_owned()).collect();
        self.drop_index_files(tab_name, &col_names)?;
        debug!(db = %self.db.name, table = tab_name, cols = %col_names.join(","), "dropped index");
        self.flush_meta()
    }

    /// Drops an index given its column metadata. Projects the columns to
    /// their names and resolves the same identity as [`Self::drop_index`].
    pub fn drop_index_by_meta(&mut self, tab_name: &str, cols: &[ColMeta]) -> Result<()> {
        let col_names: Vec<String> = cols.iter().map(|col| col.name.clone()).collect();
        self.drop_index(tab_name, &col_names)
    }

    /// Shared drop path: releases the handle, destroys the file and removes
    /// the index from the schema, without persisting.
    fn drop_index_files(&mut self, tab_name: &str, col_names: &[String]) -> Result<()> {
        let pos = self
            .db
            .table(tab_name)?
            .index_pos(col_names)
            .ok_or_else(|| {
                CatalogError::IndexNotFound(tab_name.to_owned(), col_names.join(", "))
            })?;

        let identity = self.indexes.index_name(tab_name, col_names);
        let handle = self.registry.unregister_index_handle(&identity)?;
        self.indexes.close_index(handle)?;
        self.indexes.destroy_index(tab_name, col_names)?;

        let tab = self.db.table_mut(tab_name)?;
        tab.indexes.remove(pos);
        tab.refresh_index_flags();
        Ok(())
    }

    /// Open record-file handle of a table. A miss means the catalog and the
    /// registry are out of sync.
    pub fn table_handle(&self, tab_name: &str) -> Result<Ref<'_, String, RecordFileHandle>> {
        self.registry.table_handle(tab_name)
    }

    /// Open handle of the index over the given ordered columns.
    pub fn index_handle<S: AsRef<str>>(
        &self,
        tab_name: &str,
        col_names: &[S],
    ) -> Result<Ref<'_, String, IndexHandle>> {
        let identity = self.indexes.index_name(tab_name, col_names);
        self.registry.index_handle(&identity)
    }
}
