use std::io::Write;
use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{bail, Context};
use cc_items::cc::{read_bank, Bank};
use cc_items::xml::Element;
use cc_items::Item;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const USAGE: &str = "Usage: cc-items <input.json|input.yaml|input.xml> [output]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    RecordsToXml,
    XmlToRecords,
}

#[derive(Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    direction: Direction,
}

impl Config {
    pub fn new(input: PathBuf, output: Option<PathBuf>) -> anyhow::Result<Self> {
        let direction = match extension(&input).as_deref() {
            Some("json" | "yaml" | "yml") => Direction::RecordsToXml,
            Some("xml") => Direction::XmlToRecords,
            _ => bail!(
                "cannot tell the format of {}, expected a .json, .yaml, .yml or .xml file",
                input.display()
            ),
        };

        let output = output.unwrap_or_else(|| match direction {
            Direction::RecordsToXml => input.with_extension("xml"),
            Direction::XmlToRecords => input.with_extension("json"),
        });

        Ok(Self {
            input,
            output,
            direction,
        })
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn parse_config(mut args: impl Iterator<Item = String>) -> anyhow::Result<Config> {
    let input = args.next().context("an input file is required")?;
    let output = args.next().map(PathBuf::from);

    Config::new(PathBuf::from(input), output)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = match parse_config(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{USAGE}");
            return Err(e);
        }
    };
    debug!(?config, "parsed arguments");

    let count = match config.direction {
        Direction::RecordsToXml => records_to_xml(&config)?,
        Direction::XmlToRecords => xml_to_records(&config)?,
    };

    println!(
        "converted {BOLD}{}{RESET} items into {BOLD}{}{RESET}",
        count,
        config.output.display()
    );

    Ok(())
}

fn records_to_xml(config: &Config) -> anyhow::Result<usize> {
    let content = fs::read_to_string(&config.input)
        .context(format!("failed to read {}", config.input.display()))?;

    let records: Vec<Value> = match extension(&config.input).as_deref() {
        Some("json") => serde_json::from_str(&content).context("failed to parse JSON records")?,
        _ => serde_yaml_ng::from_str(&content).context("failed to parse YAML records")?,
    };

    let mut bank = Bank::default();
    for (idx, record) in records.iter().enumerate() {
        let item = Item::from_tagged_record(record).context(format!("record {idx} is invalid"))?;
        bank.append(&item);
    }

    let xml = bank.to_xml_string().context("failed to serialize bank")?;
    write_output(&config.output, &xml)?;
    info!(items = bank.len(), output = %config.output.display(), "wrote question bank");

    Ok(bank.len())
}

fn xml_to_records(config: &Config) -> anyhow::Result<usize> {
    let content = fs::read_to_string(&config.input)
        .context(format!("failed to read {}", config.input.display()))?;

    let document = Element::parse(&content).context("failed to parse XML")?;
    let items = read_bank(&document).context("failed to read items")?;

    let records: Vec<Value> = items.iter().map(Item::to_tagged_record).collect();
    let json = serde_json::to_string_pretty(&records).context("failed to serialize records")?;
    write_output(&config.output, &json)?;
    info!(items = items.len(), output = %config.output.display(), "wrote records");

    Ok(items.len())
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .context(format!("failed to create directory {}", parent.display()))?;
    }

    let mut file = fs::File::create(path)
        .context(format!("failed to open file for {}", path.display()))?;
    write!(file, "{}", content).context(format!("failed to write {}", path.display()))?;

    Ok(())
}
