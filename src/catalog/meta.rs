//! In-memory schema of a single database and its on-disk metadata codec.
//!
//! The metadata file holds a JSON rendering of [`DbMeta`]; reading it back
//! must reproduce the schema field for field. Writes go through a temporary
//! sibling file that is renamed over the target, so a failed write leaves
//! the previous metadata file untouched.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColType {
    Int,
    Float,
    Char,
}

impl Display for ColType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColType::Int => "INT",
            ColType::Float => "FLOAT",
            ColType::Char => "CHAR",
        };
        write!(f, "{}", s)
    }
}

/// A column as requested by `create_table`, before offsets are assigned.
#[derive(Clone, Debug, PartialEq)]
pub struct ColDef {
    pub name: String,
    pub col_type: ColType,
    pub len: u32,
}

impl ColDef {
    pub fn new(name: impl Into<String>, col_type: ColType, len: u32) -> Self {
        Self {
            name: name.into(),
            col_type,
            len,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColMeta {
    pub tab_name: String,
    pub name: String,
    pub col_type: ColType,
    pub len: u32,
    /// Byte offset within a record: the sum of the lengths of all columns
    /// declared before this one.
    pub offset: u32,
    /// Derived from the table's index list, never mutated on its own.
    pub indexed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub tab_name: String,
    /// Participating columns in key order. Together with `tab_name` this is
    /// the identity of the index.
    pub col_names: Vec<String>,
    pub col_num: usize,
    pub col_tot_len: u32,
}

impl IndexMeta {
    pub fn new(tab_name: &str, cols: &[ColMeta]) -> Self {
        Self {
            tab_name: tab_name.to_owned(),
            col_names: cols.iter().map(|col| col.name.clone()).collect(),
            col_num: cols.len(),
            col_tot_len: cols.iter().map(|col| col.len).sum(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TabMeta {
    pub name: String,
    pub cols: Vec<ColMeta>,
    pub indexes: Vec<IndexMeta>,
}

impl TabMeta {
    /// Builds the table metadata for a fresh table, assigning each column
    /// the offset right behind its predecessors. Duplicate column names are
    /// rejected before anything else looks at the definition.
    pub fn new(name: &str, col_defs: &[ColDef]) -> Result<Self> {
        let mut cols: Vec<ColMeta> = Vec::with_capacity(col_defs.len());
        let mut offset = 0;
        for def in col_defs {
            if cols.iter().any(|col| col.name == def.name) {
                return Err(CatalogError::DuplicateColumn(def.name.clone()));
            }
            cols.push(ColMeta {
                tab_name: name.to_owned(),
                name: def.name.clone(),
                col_type: def.col_type,
                len: def.len,
                offset,
                indexed: false,
            });
            offset += def.len;
        }
        Ok(Self {
            name: name.to_owned(),
            cols,
            indexes: Vec::new(),
        })
    }

    pub fn record_size(&self) -> u32 {
        self.cols.iter().map(|col| col.len).sum()
    }

    pub fn col(&self, col_name: &str) -> Result<&ColMeta> {
        self.cols
            .iter()
            .find(|col| col.name == col_name)
            .ok_or_else(|| CatalogError::ColumnNotFound(col_name.to_owned()))
    }

    pub fn has_index<S: AsRef<str>>(&self, col_names: &[S]) -> bool {
        self.index_pos(col_names).is_some()
    }

    /// Position of the index with the given ordered column list, if any.
    pub fn index_pos<S: AsRef<str>>(&self, col_names: &[S]) -> Option<usize> {
        self.indexes.iter().position(|index| {
            index.col_names.len() == col_names.len()
                && index
                    .col_names
                    .iter()
                    .zip(col_names)
                    .all(|(a, b)| a.as_str() == b.as_ref())
        })
    }

    /// Recomputes every column's `indexed` flag from the index list, the
    /// single authority for that derived state.
    pub fn refresh_index_flags(&mut self) {
        for col in self.cols.iter_mut() {
            col.indexed = self
                .indexes
                .iter()
                .any(|index| index.col_names.iter().any(|name| *name == col.name));
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DbMeta {
    pub name: String,
    pub tabs: BTreeMap<String, TabMeta>,
}

impl DbMeta {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            tabs: BTreeMap::new(),
        }
    }

    pub fn is_table(&self, tab_name: &str) -> bool {
        self.tabs.contains_key(tab_name)
    }

    pub fn table(&self, tab_name: &str) -> Result<&TabMeta> {
        self.tabs
            .get(tab_name)
            .ok_or_else(|| CatalogError::TableNotFound(tab_name.to_owned()))
    }

    pub fn table_mut(&mut self, tab_name: &str) -> Result<&mut TabMeta> {
        self.tabs
            .get_mut(tab_name)
            .ok_or_else(|| CatalogError::TableNotFound(tab_name.to_owned()))
    }
}

pub fn read_meta(path: &Path) -> Result<DbMeta> {
    let file = File::open(path)?;
    let meta = serde_json::from_reader(BufReader::new(file))?;
    Ok(meta)
}

/// Writes the schema to `path`, overwriting whatever was there. The content
/// is staged in a sibling file first so that the previous metadata survives
/// a failed write intact.
pub fn write_meta(db: &DbMeta, path: &Path) -> Result<()> {
    let tmp = path.with_extension("meta.tmp");
    let mut writer = BufWriter::new(File::create(&tmp)?);
    serde_json::to_writer_pretty(&mut writer, db)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
