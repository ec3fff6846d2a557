//! Append-only statement replay log.
//!
//! Persistence is write-ahead in the simplest possible sense: every
//! successful write statement is appended to one text file as raw SQL,
//! statements separated by `;`. On startup the file is split and each
//! fragment is parsed and re-evaluated to rebuild the catalog.
//!
//! A `;` inside a string literal will break the split; that limitation is
//! inherent to the log format.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Handle on the replay log file.
#[derive(Debug)]
pub struct ReplayLog {
    path: PathBuf,
}

impl ReplayLog {
    /// Opens a replay log at the given path. The file is created lazily on
    /// the first append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the logged statements, in append order. A missing file reads
    /// as an empty log.
    pub fn statements(&self) -> io::Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(content
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Appends statement text, ensuring a trailing `;` separator.
    pub fn append(&mut self, sql: &str) -> io::Result<()> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        if sql.ends_with(';') {
            writeln!(file, "{}", sql)
        } else {
            writeln!(file, "{};", sql)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let log = ReplayLog::open(dir.path().join("data.db"));
        assert!(log.statements().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = TempDir::new().unwrap();
        let mut log = ReplayLog::open(dir.path().join("data.db"));

        log.append("CREATE TABLE t (id int)").unwrap();
        log.append("INSERT INTO t VALUES (1);").unwrap();

        assert_eq!(
            log.statements().unwrap(),
            vec!["CREATE TABLE t (id int)", "INSERT INTO t VALUES (1)"]
        );
    }

    #[test]
    fn test_blank_fragments_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.db");
        std::fs::write(&path, "CREATE TABLE t (id int);\n\n;;  \n").unwrap();

        let log = ReplayLog::open(&path);
        assert_eq!(log.statements().unwrap().len(), 1);
    }
}
