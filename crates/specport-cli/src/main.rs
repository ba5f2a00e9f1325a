use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use specport_core::{init_tracing, ConvertOptions, Converter};
use tracing::{error, info};

/// Convert minitest/mocha S-expression trees into RSpec trees
#[derive(Parser, Debug)]
#[command(name = "specport", version = specport_core::VERSION)]
struct Cli {
    /// Tree to convert; read from stdin when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Input and output are serde JSON instead of S-expression notation
    #[arg(long)]
    json: bool,

    /// Follow rspec-rails conventions (type: metadata)
    #[arg(long)]
    rails: bool,

    /// Convert mocha stubs and expectations to rspec-mocks
    #[arg(long)]
    mocha: bool,

    /// Reject class names written in module shorthand
    #[arg(long)]
    strict_names: bool,

    /// JSON file with conversion options; flags given on the command line
    /// are added on top
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print per-rule statistics to stderr
    #[arg(long)]
    stats: bool,
}

impl Cli {
    fn options(&self) -> Result<ConvertOptions> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ConvertOptions::default(),
        };
        options.rails |= self.rails;
        options.mocha |= self.mocha;
        options.strict_names |= self.strict_names;
        Ok(options)
    }

    fn read_input(&self) -> Result<String> {
        match &self.file {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            None => {
                let mut input = String::new();
                io::stdin()
                    .read_to_string(&mut input)
                    .context("Failed to read stdin")?;
                Ok(input)
            }
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    let converter = Converter::new(cli.options()?);
    let input = cli.read_input()?;
    let source = cli
        .file
        .as_ref()
        .map_or_else(|| "<stdin>".to_string(), |path| path.display().to_string());
    info!(source = %source, options = ?converter.options(), "converting");

    let output = if cli.json {
        converter.convert_json(&input)
    } else {
        converter.convert(input.trim())
    }
    .with_context(|| format!("Failed to convert {source}"))?;

    if cli.stats {
        print_stats(&converter);
    }
    Ok(output)
}

fn print_stats(converter: &Converter) {
    let mut stats: Vec<_> = converter.stats().into_values().collect();
    stats.sort_by(|a, b| a.rule_name.cmp(&b.rule_name));
    for rule in stats {
        eprintln!(
            "{}: {} applied, {} converted, {} failed ({:.2} ms avg)",
            rule.rule_name,
            rule.applications,
            rule.transformations,
            rule.errors,
            rule.average_time_ms()
        );
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
