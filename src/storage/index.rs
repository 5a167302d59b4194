//! Index-file store: creates, opens and destroys the files backing indexes.
//!
//! One file per index, named by the deterministic identity derived from the
//! table name and the ordered column list. The header records the total key
//! length; node layout inside the file belongs to the B+-tree engine.

use std::fs::{self, File, OpenOptions};
use std::os::unix::prelude::FileExt;
use std::path::{Path, PathBuf};

use crate::catalog::layout;
use crate::catalog::meta::ColMeta;
use crate::common::FILE_HEADER_SIZE;
use crate::error::Result;

#[derive(Debug)]
pub struct IndexFileManager {
    db_dir: PathBuf,
}

/// An open index file, keyed in the handle registry by its identity.
#[derive(Debug)]
pub struct IndexHandle {
    identity: String,
    file: File,
    key_len: u32,
}

impl IndexHandle {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn key_len(&self) -> u32 {
        self.key_len
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

impl IndexFileManager {
    pub fn new(db_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_dir: db_dir.into(),
        }
    }

    /// Identity of the index over the given ordered columns.
    pub fn index_name<S: AsRef<str>>(&self, tab_name: &str, col_names: &[S]) -> String {
        layout::index_file_name(tab_name, col_names)
    }

    fn path<S: AsRef<str>>(&self, tab_name: &str, col_names: &[S]) -> PathBuf {
        self.db_dir.join(self.index_name(tab_name, col_names))
    }

    pub fn exists<S: AsRef<str>>(&self, tab_name: &str, col_names: &[S]) -> bool {
        self.path(tab_name, col_names).is_file()
    }

    /// Creates the index file, failing if it already exists. The key length
    /// is the sum of the participating columns' lengths.
    pub fn create_index(&self, tab_name: &str, cols: &[ColMeta]) -> Result<()> {
        let names: Vec<&str> = cols.iter().map(|col| col.name.as_str()).collect();
        let key_len: u32 = cols.iter().map(|col| col.len).sum();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path(tab_name, &names))?;
        file.write_all_at(&key_len.to_le_bytes(), 0)?;
        file.sync_all()?;
        Ok(())
    }

    pub fn open_index<S: AsRef<str>>(&self, tab_name: &str, col_names: &[S]) -> Result<IndexHandle> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.path(tab_name, col_names))?;
        let mut header = [0u8; FILE_HEADER_SIZE];
        file.read_exact_at(&mut header, 0)?;
        Ok(IndexHandle {
            identity: self.index_name(tab_name, col_names),
            file,
            key_len: u32::from_le_bytes(header),
        })
    }

    /// Syncs and releases an open handle. The file itself stays on disk.
    pub fn close_index(&self, handle: IndexHandle) -> Result<()> {
        handle.file.sync_all()?;
        Ok(())
    }

    pub fn destroy_index<S: AsRef<str>>(&self, tab_name: &str, col_names: &[S]) -> Result<()> {
        fs::remove_file(self.path(tab_name, col_names))?;
        Ok(())
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }
}

#[cfg(test)]
mod tests {

    use anyhow::Result;
    use tempfile::tempdir;

    use super::IndexFileManager;
    use crate::catalog::meta::{ColDef, ColType, TabMeta};

    #[test]
    fn create_open_destroy_cycle() -> Result<()> {
        let dir = tempdir()?;
        let indexes = IndexFileManager::new(dir.path());
        let tab = TabMeta::new(
            "orders",
            &[
                ColDef::new("id", ColType::Int, 4),
                ColDef::new("total", ColType::Float, 8),
            ],
        )?;

        let cols = vec![tab.col("id")?.clone(), tab.col("total")?.clone()];
        indexes.create_index("orders", &cols)?;
        assert!(indexes.exists("orders", &["id", "total"]));
        assert!(!indexes.exists("orders", &["total", "id"]));

        let handle = indexes.open_index("orders", &["id", "total"])?;
        assert_eq!(handle.identity(), "orders_id_total.idx");
        assert_eq!(handle.key_len(), 12);
        indexes.close_index(handle)?;

        indexes.destroy_index("orders", &["id", "total"])?;
        assert!(!indexes.exists("orders", &["id", "total"]));
        Ok(())
    }

    #[test]
    fn creating_an_existing_index_fails() -> Result<()> {
        let dir = tempdir()?;
        let indexes = IndexFileManager::new(dir.path());
        let tab = TabMeta::new("orders", &[ColDef::new("id", ColType::Int, 4)])?;

        let cols = vec![tab.col("id")?.clone()];
        indexes.create_index("orders", &cols)?;
        assert!(indexes.create_index("orders", &cols).is_err());
        Ok(())
    }
}
