use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{config::DuplicatePolicy, scrape::ProxyAddr};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Load a directory of CSV files into a SQLite database",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load every matching file under a directory into one table per file
    Load(LoadArgs),
    /// Scrape bank codes and names into a TSV file
    ScrapeBanks(ScrapeBanksArgs),
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Directory containing CSV files (searched recursively)
    pub source_dir: PathBuf,
    /// SQLite database file to create or update
    pub database: PathBuf,
    /// YAML file with loader settings; flags given here take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Character encoding of the input files (defaults to Shift_JIS)
    #[arg(short, long)]
    pub encoding: Option<String>,
    /// File name suffix to load, matched case-insensitively (defaults to .csv)
    #[arg(long)]
    pub extension: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Quote character used around fields
    #[arg(long, value_parser = parse_delimiter)]
    pub quote: Option<u8>,
    /// Fail a file while decoding when a record's field count differs from its header
    #[arg(long)]
    pub strict: bool,
    /// How to handle two files that map to the same table name
    #[arg(long = "on-duplicate", value_enum)]
    pub on_duplicate: Option<DuplicatePolicy>,
    /// Exit with an error when any file fails to load
    #[arg(long = "fail-on-error")]
    pub fail_on_error: bool,
}

#[derive(Debug, Args)]
pub struct ScrapeBanksArgs {
    /// Outbound proxy as host:port
    #[arg(long)]
    pub proxy: Option<ProxyAddr>,
    /// Destination TSV file
    #[arg(short = 'o', long = "output", default_value = "banks.tsv")]
    pub output: PathBuf,
    /// Bank master JSON endpoint
    #[arg(long = "banks-url", default_value = crate::scrape::BANKS_JSON_URL)]
    pub banks_url: String,
    /// HTML page listing bank codes in table cells
    #[arg(long = "page-url", default_value = crate::scrape::BANK_CODES_PAGE_URL)]
    pub page_url: String,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
