/// Name of the metadata file inside every database directory.
pub const META_FILE_NAME: &str = "db.meta";
/// Name of the log file inside every database directory. Created empty at
/// database creation, otherwise unmanaged by this crate.
pub const LOG_FILE_NAME: &str = "db.log";

pub const TABLE_FILE_SUFFIX: &str = ".tbl";
pub const INDEX_FILE_SUFFIX: &str = ".idx";

/// Size of the fixed header at the start of record and index files.
pub const FILE_HEADER_SIZE: usize = 4;
