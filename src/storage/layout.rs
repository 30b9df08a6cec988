use crate::core::error::Result;
use std::fs;
use std::path::PathBuf;

/// Directory layout of a snapshot: one `<table>.tbl` file per logical table
/// under a single root directory.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(StorageLayout { base_dir })
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.base_dir.join(format!("{}.tbl", table))
    }

    pub fn tmp_path(&self, table: &str) -> PathBuf {
        self.base_dir.join(format!("{}.tbl.tmp", table))
    }
}
