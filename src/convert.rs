//! Conversion orchestrator: discover, then decode and load each file in turn.
//!
//! A run moves through `Init → Connected → Discovered → per file → Finished`.
//! Only a missing source directory or an unopenable database end the run
//! early. Every per-file problem is captured as a [`FileOutcome::Failed`]
//! and the loop carries on with the next file.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{error, info, warn};
use rusqlite::Connection;

use crate::{
    config::{DuplicatePolicy, LoaderConfig},
    decode::{Row, TabularReader},
    discover::{SourceFile, discover_files},
    error::{ConvertError, DecodeError, FileError},
    loader::TableLoader,
    schema,
    table,
};

#[derive(Debug)]
pub enum FileOutcome {
    Loaded { rows: usize },
    Failed(FileError),
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub table: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Loaded { .. })
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.reports.len()
    }

    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Per-file table of results for console output.
    pub fn render(&self) -> String {
        let headers = ["file", "table", "rows", "status"].map(String::from);
        let rows = self
            .reports
            .iter()
            .map(|report| {
                let (rows, status) = match &report.outcome {
                    FileOutcome::Loaded { rows } => (rows.to_string(), "ok".to_string()),
                    FileOutcome::Failed(err) => (String::new(), err.chain_message()),
                };
                vec![
                    report.path.display().to_string(),
                    report.table.clone(),
                    rows,
                    status,
                ]
            })
            .collect::<Vec<_>>();
        table::render_table(&headers, &rows)
    }
}

pub struct Converter {
    config: LoaderConfig,
}

impl Converter {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, source_dir: &Path, destination: &Path) -> Result<RunSummary, ConvertError> {
        let files = discover_files(source_dir, &self.config)?;

        let mut conn = Connection::open(destination).map_err(|source| ConvertError::Connection {
            path: destination.to_path_buf(),
            source,
        })?;
        info!("Connected to database {:?}", destination);

        if files.is_empty() {
            info!(
                "No files matching '{}' found in {:?}",
                self.config.extension, source_dir
            );
            return Ok(RunSummary::default());
        }
        info!("Found {} file(s)", files.len());

        let mut summary = RunSummary::default();
        // Keyed by the ASCII-lowercased name, matching SQLite's identifier rules.
        let mut loaded_from: HashMap<String, PathBuf> = HashMap::new();
        for file in files {
            info!("Processing {:?} -> table '{}'", file.path, file.table_name);
            let table_key = file.table_name.to_ascii_lowercase();
            let result = match loaded_from.get(&table_key) {
                Some(first) if self.config.on_duplicate == DuplicatePolicy::Fail => {
                    Err(FileError::DuplicateTable {
                        table: file.table_name.clone(),
                        first: first.clone(),
                    })
                }
                previous => {
                    if let Some(first) = previous {
                        warn!(
                            "Table '{}' from {:?} is replaced by {:?}",
                            file.table_name, first, file.path
                        );
                    }
                    self.convert_file(&mut conn, &file)
                }
            };
            let outcome = match result {
                Ok(rows) => {
                    info!("✓ Inserted {rows} row(s) into '{}'", file.table_name);
                    loaded_from.insert(table_key, file.path.clone());
                    FileOutcome::Loaded { rows }
                }
                Err(err) => {
                    error!("Error processing {:?}: {}", file.path, err.chain_message());
                    FileOutcome::Failed(err)
                }
            };
            summary.reports.push(FileReport {
                path: file.path,
                table: file.table_name,
                outcome,
            });
        }
        info!(
            "Conversion finished: {} attempted, {} succeeded, {} failed",
            summary.attempted(),
            summary.succeeded(),
            summary.failed()
        );
        Ok(summary)
    }

    /// Decodes the whole file before touching the database, so an unreadable
    /// file never drops an existing table.
    fn convert_file(&self, conn: &mut Connection, file: &SourceFile) -> Result<usize, FileError> {
        let reader = TabularReader::open(file, &self.config)?;
        let schema = schema::synthesize(&file.path, reader.headers());
        let rows = reader.collect::<Result<Vec<Row>, DecodeError>>()?;

        let mut loader = TableLoader::new(conn);
        loader.recreate_table(&schema)?;
        info!(
            "Preparing to insert {} record(s) into '{}'",
            rows.len(),
            schema.table_name
        );
        Ok(loader.load_rows(&schema, rows.into_iter().map(Ok))?)
    }
}
