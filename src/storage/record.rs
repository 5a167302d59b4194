//! Record-file store: creates, opens and destroys the files backing tables.
//!
//! Each table is a single file inside the database directory, starting with
//! a fixed header that records the table's record size. Page and slot layout
//! inside the file is the record engine's business, not this module's.

use std::fs::{self, File, OpenOptions};
use std::os::unix::prelude::FileExt;
use std::path::{Path, PathBuf};

use crate::catalog::layout;
use crate::common::FILE_HEADER_SIZE;
use crate::error::Result;

#[derive(Debug)]
pub struct RecordFileManager {
    db_dir: PathBuf,
}

/// An open record file. Exclusively owned by the handle registry while the
/// database is open.
#[derive(Debug)]
pub struct RecordFileHandle {
    tab_name: String,
    file: File,
    record_size: u32,
}

impl RecordFileHandle {
    pub fn tab_name(&self) -> &str {
        &self.tab_name
    }

    pub fn record_size(&self) -> u32 {
        self.record_size
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

impl RecordFileManager {
    pub fn new(db_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_dir: db_dir.into(),
        }
    }

    fn path(&self, tab_name: &str) -> PathBuf {
        self.db_dir.join(layout::table_file_name(tab_name))
    }

    pub fn file_path(&self, tab_name: &str) -> PathBuf {
        self.path(tab_name)
    }

    /// Creates the record file for a table, failing if it already exists.
    pub fn create_file(&self, tab_name: &str, record_size: u32) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path(tab_name))?;
        file.write_all_at(&record_size.to_le_bytes(), 0)?;
        file.sync_all()?;
        Ok(())
    }

    pub fn open_file(&self, tab_name: &str) -> Result<RecordFileHandle> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.path(tab_name))?;
        let mut header = [0u8; FILE_HEADER_SIZE];
        file.read_exact_at(&mut header, 0)?;
        Ok(RecordFileHandle {
            tab_name: tab_name.to_owned(),
            file,
            record_size: u32::from_le_bytes(header),
        })
    }

    /// Syncs and releases an open handle. The file itself stays on disk.
    pub fn close_file(&self, handle: RecordFileHandle) -> Result<()> {
        handle.file.sync_all()?;
        Ok(())
    }

    pub fn destroy_file(&self, tab_name: &str) -> Result<()> {
        fs::remove_file(self.path(tab_name))?;
        Ok(())
    }

    pub fn exists(&self, tab_name: &str) -> bool {
        self.path(tab_name).is_file()
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }
}

#[cfg(test)]
mod tests {

    use anyhow::Result;
    use tempfile::tempdir;

    use super::RecordFileManager;

    #[test]
    fn create_open_destroy_cycle() -> Result<()> {
        let dir = tempdir()?;
        let records = RecordFileManager::new(dir.path());

        records.create_file("orders", 32)?;
        assert!(records.exists("orders"));

        let handle = records.open_file("orders")?;
        assert_eq!(handle.tab_name(), "orders");
        assert_eq!(handle.record_size(), 32);
        records.close_file(handle)?;

        records.destroy_file("orders")?;
        assert!(!records.exists("orders"));
        Ok(())
    }

    #[test]
    fn creating_an_existing_file_fails() -> Result<()> {
        let dir = tempdir()?;
        let records = RecordFileManager::new(dir.path());
        records.create_file("orders", 8)?;
        assert!(records.create_file("orders", 8).is_err());
        Ok(())
    }

    #[test]
    fn opening_a_missing_file_fails() {
        let dir = tempdir().unwrap();
        let records = RecordFileManager::new(dir.path());
        assert!(records.open_file("missing").is_err());
    }
}
