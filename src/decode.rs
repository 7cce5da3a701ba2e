//! Tabular decoding: one file in, a header plus a lazy stream of rows out.

use std::{fs, io::Cursor};

use log::debug;

use crate::{config::LoaderConfig, discover::SourceFile, error::DecodeError, io_utils};

pub type Row = Vec<String>;

/// Decoded view over a single delimited file.
///
/// The file is read and transcoded to UTF-8 up front, then records are
/// parsed on demand as the reader is iterated. Iteration consumes the
/// reader; it cannot be restarted.
pub struct TabularReader {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
    strict: bool,
}

impl TabularReader {
    /// Opens `source` using its own encoding label; delimiter, quoting and
    /// field-count policy come from `config`.
    pub fn open(source: &SourceFile, config: &LoaderConfig) -> Result<Self, DecodeError> {
        let path = source.path.as_path();
        let encoding = io_utils::resolve_encoding(&source.encoding)?;
        let bytes = fs::read(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = io_utils::decode_bytes(&bytes, encoding)?;
        debug!(
            "Decoded {} byte(s) of {:?} as {}",
            bytes.len(),
            path,
            encoding.name()
        );
        Self::from_text(text, config)
    }

    /// Builds a reader over text that is already UTF-8.
    pub fn from_text(text: String, config: &LoaderConfig) -> Result<Self, DecodeError> {
        let mut reader =
            io_utils::open_csv_reader(Cursor::new(text.into_bytes()), config.delimiter, config.quote);
        let mut header = csv::StringRecord::new();
        if !reader.read_record(&mut header)? {
            return Err(DecodeError::MissingHeader);
        }
        Ok(Self {
            headers: header.iter().map(str::to_string).collect(),
            records: reader.into_records(),
            strict: config.strict,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for TabularReader {
    type Item = Result<Row, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into())),
        };
        if self.strict && record.len() != self.headers.len() {
            return Some(Err(DecodeError::MalformedRecord {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: self.headers.len(),
                found: record.len(),
            }));
        }
        Some(Ok(record.iter().map(str::to_string).collect()))
    }
}
