pub mod cli;
pub mod config;
pub mod convert;
pub mod decode;
pub mod discover;
pub mod error;
pub mod io_utils;
pub mod loader;
pub mod schema;
pub mod scrape;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, LoadArgs, ScrapeBanksArgs},
    config::LoaderConfig,
    convert::Converter,
    scrape::BankScraper,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_db_loader", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => handle_load(&args),
        Commands::ScrapeBanks(args) => handle_scrape_banks(&args),
    }
}

fn handle_load(args: &LoadArgs) -> Result<()> {
    let config = resolve_config(args)?;
    info!("Starting CSV to SQLite conversion");
    info!("Source directory: {:?}", args.source_dir);
    info!("Output database: {:?}", args.database);
    info!(
        "Encoding '{}', delimiter '{}', extension '{}'",
        config.encoding,
        printable_delimiter(config.delimiter),
        config.extension
    );

    let summary = Converter::new(config)
        .run(&args.source_dir, &args.database)
        .with_context(|| format!("Converting {:?}", args.source_dir))?;

    if summary.is_empty() {
        println!("No files found in {}", args.source_dir.display());
        return Ok(());
    }
    print!("{}", summary.render());
    println!(
        "{} file(s) attempted, {} succeeded, {} failed",
        summary.attempted(),
        summary.succeeded(),
        summary.failed()
    );
    if args.fail_on_error && summary.failed() > 0 {
        bail!("{} file(s) failed to load", summary.failed());
    }
    Ok(())
}

fn handle_scrape_banks(args: &ScrapeBanksArgs) -> Result<()> {
    let scraper = BankScraper::new(&args.banks_url, &args.page_url, args.proxy.as_ref())
        .context("Building HTTP client")?;
    let written = scraper
        .run(&args.output)
        .with_context(|| format!("Scraping bank codes into {:?}", args.output))?;
    info!("Wrote {written} bank code(s) to {:?}", args.output);
    Ok(())
}

/// Config file values first, then any flag given on the command line.
fn resolve_config(args: &LoadArgs) -> Result<LoaderConfig> {
    let mut config = match &args.config {
        Some(path) => LoaderConfig::load(path)?,
        None => LoaderConfig::default(),
    };
    if let Some(encoding) = &args.encoding {
        config.encoding = encoding.clone();
    }
    if let Some(extension) = &args.extension {
        config.extension = extension.clone();
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(quote) = args.quote {
        config.quote = quote;
    }
    if args.strict {
        config.strict = true;
    }
    if let Some(policy) = args.on_duplicate {
        config.on_duplicate = policy;
    }
    config.validate()?;
    debug!("Resolved loader config: {:?}", config);
    Ok(config)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
