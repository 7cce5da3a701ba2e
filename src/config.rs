//! Loader configuration.
//!
//! [`LoaderConfig`] carries every knob the discoverer and decoder read, so a
//! run is fully described by the config value and the two paths handed to
//! [`crate::convert::Converter`]. It can be built in code, deserialized from a
//! YAML file, and is finally overridden by command-line flags.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use clap::ValueEnum;
use serde::Deserialize;

pub const DEFAULT_EXTENSION: &str = ".csv";
pub const DEFAULT_ENCODING: &str = "Shift_JIS";
pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_QUOTE: u8 = b'"';

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Suffix a file name must end with to be loaded, compared case-insensitively.
    pub extension: String,
    /// `encoding_rs` label used to decode every input file.
    pub encoding: String,
    #[serde(deserialize_with = "ascii_byte::deserialize")]
    pub delimiter: u8,
    #[serde(deserialize_with = "ascii_byte::deserialize")]
    pub quote: u8,
    /// Reject records whose field count differs from the header while decoding.
    pub strict: bool,
    pub on_duplicate: DuplicatePolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
            strict: false,
            on_duplicate: DuplicatePolicy::LastWins,
        }
    }
}

impl LoaderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: LoaderConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config file {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.extension.is_empty(),
            "File extension filter cannot be empty"
        );
        ensure!(
            self.delimiter != self.quote,
            "Delimiter and quote character must differ"
        );
        Ok(())
    }
}

/// What to do when two files map to the same table name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The file processed later replaces the earlier table.
    #[default]
    LastWins,
    /// Later files with an already-loaded table name are marked failed.
    Fail,
}

mod ascii_byte {
    use serde::{Deserialize, Deserializer, de};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::cli::parse_delimiter(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_only_named_fields() {
        let yaml = "encoding: utf-8\ndelimiter: tab\non_duplicate: fail\n";
        let config: LoaderConfig = serde_yaml::from_str(yaml).expect("parse config");
        assert_eq!(config.encoding, "utf-8");
        assert_eq!(config.delimiter, b'\t');
        assert_eq!(config.on_duplicate, DuplicatePolicy::Fail);
        assert_eq!(config.extension, DEFAULT_EXTENSION);
        assert_eq!(config.quote, DEFAULT_QUOTE);
        assert!(!config.strict);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<LoaderConfig, _> = serde_yaml::from_str("extention: .tsv\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_clashing_delimiter_and_quote() {
        let config = LoaderConfig {
            quote: b',',
            ..LoaderConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
