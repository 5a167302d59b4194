//! Deterministic mapping from logical names to filesystem paths.
//!
//! Every database is a directory named after the database; inside it live a
//! metadata file, a log file, one record file per table and one file per
//! index. The index file name doubles as the index identity, so it must be a
//! pure function of the table name and the ordered column name list.

use std::path::{Path, PathBuf};

use crate::common::{INDEX_FILE_SUFFIX, LOG_FILE_NAME, META_FILE_NAME, TABLE_FILE_SUFFIX};

pub fn database_dir(base: &Path, db_name: &str) -> PathBuf {
    base.join(db_name)
}

pub fn meta_path(db_dir: &Path) -> PathBuf {
    db_dir.join(META_FILE_NAME)
}

pub fn log_path(db_dir: &Path) -> PathBuf {
    db_dir.join(LOG_FILE_NAME)
}

pub fn table_file_name(tab_name: &str) -> String {
    format!("{}{}", tab_name, TABLE_FILE_SUFFIX)
}

/// File name of an index, and at the same time its identity. Column order is
/// part of the name so that indexes over the same columns in a different
/// order do not alias.
pub fn index_file_name<S: AsRef<str>>(tab_name: &str, col_names: &[S]) -> String {
    let cols = col_names
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join("_");
    format!("{}_{}{}", tab_name, cols, INDEX_FILE_SUFFIX)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn index_name_depends_on_column_order() {
        let forward = index_file_name("orders", &["id", "total"]);
        let backward = index_file_name("orders", &["total", "id"]);
        assert_eq!(forward, "orders_id_total.idx");
        assert_eq!(backward, "orders_total_id.idx");
        assert_ne!(forward, backward);
    }

    #[test]
    fn fixed_files_live_inside_the_database_dir() {
        let dir = database_dir(Path::new("/data"), "shop");
        assert_eq!(meta_path(&dir), Path::new("/data/shop/db.meta"));
        assert_eq!(log_path(&dir), Path::new("/data/shop/db.log"));
        assert_eq!(table_file_name("orders"), "orders.tbl");
    }
}
