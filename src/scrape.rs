//! Bank-code scraper.
//!
//! Produces a `code\tname` TSV that can be dropped into a source directory
//! for loading. The code list comes from the table cells of a public HTML
//! page; names are looked up in the zengin-code bank master JSON.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    io::Write,
    path::Path,
    str::FromStr,
    time::Duration,
};

use log::info;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use thiserror::Error;

use crate::io_utils;

pub const BANKS_JSON_URL: &str = "https://zengin-code.github.io/api/banks.json";
pub const BANK_CODES_PAGE_URL: &str =
    "https://www.kaikeikanri.metro.tokyo.lg.jp/noufu-uketori/koukinshuunou";
pub const MISSING_NAME: &str = "N/A";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const CODE_PATTERN: &str = r"^\d{4}$";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),
    #[error("Bank master is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("Invalid selector: {0}")]
    Selector(String),
    #[error(transparent)]
    Regex(#[from] regex::Error),
    #[error("Writing TSV output")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Output(String),
}

/// Outbound proxy given as `host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddr {
    pub host: String,
    pub port: u16,
}

impl FromStr for ProxyAddr {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (host, port) = value
            .rsplit_once(':')
            .ok_or_else(|| format!("Proxy '{value}' must be in host:port form"))?;
        if host.is_empty() {
            return Err(format!("Proxy '{value}' is missing a host"));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| format!("Proxy port '{port}' is not a valid port number"))?;
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for ProxyAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
struct Bank {
    name: String,
}

pub struct BankScraper {
    client: Client,
    banks_url: String,
    page_url: String,
}

impl BankScraper {
    pub fn new(
        banks_url: impl Into<String>,
        page_url: impl Into<String>,
        proxy: Option<&ProxyAddr>,
    ) -> Result<Self, ScrapeError> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT);
        if let Some(proxy) = proxy {
            info!("Using proxy: {proxy}");
            builder = builder.proxy(reqwest::Proxy::all(format!("http://{proxy}"))?);
        }
        Ok(Self {
            client: builder.build()?,
            banks_url: banks_url.into(),
            page_url: page_url.into(),
        })
    }

    /// Fetches both sources and writes the TSV to `output`. Returns the
    /// number of codes written.
    pub fn run(&self, output: &Path) -> Result<usize, ScrapeError> {
        info!("Fetching bank master data from {}", self.banks_url);
        let names = parse_bank_names(&self.get_text(&self.banks_url)?)?;
        info!("Bank master data fetched ({} bank(s))", names.len());

        info!("Fetching bank codes from {}", self.page_url);
        let codes = extract_codes(&self.get_text(&self.page_url)?)?;
        info!("Found {} unique bank code(s)", codes.len());

        let mut writer = io_utils::open_csv_writer(output, b'\t')
            .map_err(|e| ScrapeError::Output(format!("{e:#}")))?;
        write_bank_codes(&mut writer, &codes, &names)?;
        info!("TSV file {:?} created", output);
        Ok(codes.len())
    }

    fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        Ok(self.client.get(url).send()?.error_for_status()?.text()?)
    }
}

/// Maps bank code to bank name from the zengin-code `banks.json` layout.
pub fn parse_bank_names(json: &str) -> Result<HashMap<String, String>, ScrapeError> {
    let banks: HashMap<String, Bank> = serde_json::from_str(json)?;
    Ok(banks
        .into_iter()
        .map(|(code, bank)| (code, bank.name))
        .collect())
}

/// Every `td` whose whitespace-normalized text is exactly four digits,
/// deduplicated and sorted ascending.
pub fn extract_codes(html: &str) -> Result<Vec<String>, ScrapeError> {
    let document = Html::parse_document(html);
    let cells = Selector::parse("td").map_err(|e| ScrapeError::Selector(e.to_string()))?;
    let pattern = Regex::new(CODE_PATTERN)?;
    let codes = document
        .select(&cells)
        .map(|cell| cell.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| pattern.is_match(text))
        .collect::<BTreeSet<_>>();
    Ok(codes.into_iter().collect())
}

pub fn write_bank_codes<W: Write>(
    writer: &mut csv::Writer<W>,
    codes: &[String],
    names: &HashMap<String, String>,
) -> Result<(), ScrapeError> {
    writer.write_record(["code", "name"])?;
    for code in codes {
        let name = names.get(code).map(String::as_str).unwrap_or(MISSING_NAME);
        writer.write_record([code.as_str(), name])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
