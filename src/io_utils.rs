//! I/O utilities for CSV reading, writing, and encoding resolution.
//!
//! - **Encoding**: input decoding via `encoding_rs`, with BOM sniffing, and
//!   strict rejection of malformed byte sequences.
//! - **Reader/writer construction**: `open_csv_reader` and `open_csv_writer`
//!   apply the delimiter/quoting convention in one place.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use csv::QuoteStyle;
use encoding_rs::Encoding;

use crate::error::DecodeError;

pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, DecodeError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| DecodeError::Encoding {
        label: label.to_string(),
    })
}

/// Reader that treats the first record as data; header handling is left to
/// the caller so the header line can be decoded and checked like any row.
pub fn open_csv_reader<R>(reader: R, delimiter: u8, quote: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .quote(quote)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_writer(path: &Path, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = Box::new(BufWriter::new(
        File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
    ));
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(base))
}

/// Decodes a whole buffer. A leading BOM overrides `encoding`.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String, DecodeError> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(DecodeError::InvalidBytes {
            encoding: used.name(),
        })
    } else {
        Ok(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{SHIFT_JIS, UTF_8};

    #[test]
    fn resolve_encoding_accepts_common_labels() {
        assert_eq!(resolve_encoding("Shift_JIS").unwrap(), SHIFT_JIS);
        assert_eq!(resolve_encoding(" utf-8 ").unwrap(), UTF_8);
        assert!(matches!(
            resolve_encoding("klingon"),
            Err(DecodeError::Encoding { .. })
        ));
    }

    #[test]
    fn decode_bytes_rejects_invalid_sequences() {
        let err = decode_bytes(&[0x61, 0xff, 0xfe, 0x62], UTF_8).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidBytes { encoding: "UTF-8" }));
    }

    #[test]
    fn decode_bytes_honours_utf8_bom() {
        let bytes = b"\xef\xbb\xbfid,name\n";
        assert_eq!(decode_bytes(bytes, SHIFT_JIS).unwrap(), "id,name\n");
    }
}
