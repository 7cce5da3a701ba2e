#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::{TempDir, tempdir};

/// Scratch directory with a `csv/` source tree and a database path, cleaned
/// up on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("temp dir");
        fs::create_dir(temp_dir.path().join("csv")).expect("create source dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source_dir(&self) -> PathBuf {
        self.path().join("csv")
    }

    pub fn database(&self) -> PathBuf {
        self.path().join("out.db")
    }

    /// Writes `contents` to `name` under the source directory, creating any
    /// intermediate directories.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.source_dir().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write source file");
        path
    }

    pub fn open_db(&self) -> Connection {
        Connection::open(self.database()).expect("open database")
    }
}

pub fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .expect("prepare table listing");
    let names = stmt
        .query_map([], |row| row.get(0))
        .expect("list tables")
        .collect::<Result<_, _>>()
        .expect("read table names");
    names
}

pub fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .expect("prepare column listing");
    let names = stmt
        .query_map([table], |row| row.get(0))
        .expect("list columns")
        .collect::<Result<_, _>>()
        .expect("read column names");
    names
}

/// All rows of `table` in insertion order, every value read back as text.
pub fn table_rows(conn: &Connection, table: &str) -> Vec<Vec<String>> {
    let columns = column_names(conn, table).len();
    let sql = format!(
        "SELECT * FROM \"{}\" ORDER BY rowid",
        table.replace('"', "\"\"")
    );
    let mut stmt = conn.prepare(&sql).expect("prepare select");
    let rows = stmt
        .query_map([], |row| {
            (0..columns)
                .map(|idx| row.get::<_, String>(idx))
                .collect::<Result<Vec<_>, _>>()
        })
        .expect("query rows")
        .collect::<Result<_, _>>()
        .expect("read rows");
    rows
}
