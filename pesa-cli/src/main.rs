use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pesa_ingest::{unlock, LopdfDocument, StatementDocument, StatementExtractor};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

mod config;
mod report;
mod state;

use config::{config_path, init_config, load_config, render_config};
use report::{OutputFormat, StatementReport};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PESA_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "pesa", version = VERSION, about = "M-PESA statement extractor")]
struct Cli {
    /// Config file (default: ~/.pesa/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract metadata, summary table, ledger and categories from a statement PDF
    Extract {
        pdf: PathBuf,

        /// Password of an encrypted statement
        #[arg(long)]
        password: Option<String>,

        /// Output format (default: from config, else json)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Refuse documents that fail the fingerprint or keyword checks
        #[arg(long)]
        strict: bool,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Check whether a PDF looks like a genuine M-PESA statement
    Validate {
        pdf: PathBuf,

        #[arg(long)]
        password: Option<String>,
    },

    /// Manage ~/.pesa/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            pdf,
            password,
            format,
            strict,
            output,
        } => {
            let cfg = load_config(cli.config.as_deref())?;
            let format = format.unwrap_or(cfg.output.format);
            let strict = strict || cfg.output.strict;

            let bytes = read_pdf(&pdf)?;
            let extractor = StatementExtractor::new(&cfg.layout).context("compile statement layout")?;
            let extraction = extractor
                .extract_pdf(&bytes, password.as_deref())
                .with_context(|| format!("extract {}", pdf.display()))?;

            if strict && !extraction.fingerprint_match {
                bail!(
                    "{} does not match a known statement producer (rerun without --strict to extract anyway)",
                    pdf.display()
                );
            }
            if strict && !extraction.recognized {
                bail!(
                    "{} is missing required statement keywords (rerun without --strict to extract anyway)",
                    pdf.display()
                );
            }

            let report = StatementReport::build(file_name(&pdf), extraction);
            match output {
                Some(path) => {
                    let f = File::create(&path)
                        .with_context(|| format!("create {}", path.display()))?;
                    report.write(format, BufWriter::new(f))?;
                    eprintln!(
                        "Wrote {} transactions to {}",
                        report.transactions.len(),
                        path.display()
                    );
                }
                None => report.write(format, io::stdout().lock())?,
            }
        }

        Command::Validate { pdf, password } => {
            let cfg = load_config(cli.config.as_deref())?;
            validate(&pdf, password.as_deref(), &StatementExtractor::new(&cfg.layout)?)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => init_config()?,
            ConfigCommand::Show => {
                let cfg = load_config(cli.config.as_deref())?;
                print!("{}", render_config(&cfg)?);
            }
            ConfigCommand::Path => println!("{}", config_path()?.display()),
        },
    }

    Ok(())
}

fn validate(pdf: &Path, password: Option<&str>, extractor: &StatementExtractor) -> Result<()> {
    let bytes = read_pdf(pdf)?;
    let mut doc = LopdfDocument::load(&bytes).with_context(|| format!("open {}", pdf.display()))?;
    unlock(&mut doc, password).with_context(|| format!("unlock {}", pdf.display()))?;

    let props = doc.properties().context("read document properties")?;
    let mismatches = extractor.validator().mismatches(&props);
    let fingerprint_ok = extractor.validator().is_valid(&props);

    let missing = missing_keywords(extractor, &doc)?;

    println!("File:        {}", pdf.display());
    println!("Producer:    {} / {}", props.producer, props.creator);
    println!("Fingerprint: {}", if fingerprint_ok { "match" } else { "MISMATCH" });
    for m in &mismatches {
        println!("  {}: expected {:?}, found {:?}", m.field, m.expected, m.actual);
    }
    println!("Keywords:    {}", if missing.is_empty() { "all present" } else { "MISSING" });
    for k in &missing {
        println!("  {k}");
    }

    if !fingerprint_ok || !missing.is_empty() {
        bail!("{} is not a recognized M-PESA statement", pdf.display());
    }
    Ok(())
}

/// Required keywords absent from the leading pages; an unreadable page is an error.
fn missing_keywords<D: StatementDocument + ?Sized>(
    extractor: &StatementExtractor,
    doc: &D,
) -> Result<Vec<String>> {
    let recognizer = extractor.recognizer();
    let leading = recognizer.leading_text(doc).context("read leading pages")?;
    Ok(recognizer
        .missing_keywords(&leading)
        .into_iter()
        .map(str::to_string)
        .collect())
}

fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        bail!("PDF not found: {}", path.display());
    }
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
