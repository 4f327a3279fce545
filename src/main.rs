//! Genotype preparation main executable

pub mod cli;
pub mod common;
pub mod dataset;
pub mod err;
pub mod output;
pub mod session;
pub mod tracker;
pub mod transform;
pub mod view;
pub mod worker;

use clap::{Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Genotype review and analysis input preparation",
    long_about = "This tool reviews marker genotypes of samples, tracks manual edits, and \
                  writes the input files of the downstream appearance and ancestry analyses"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Subcommand)]
enum Commands {
    /// List the samples of an input file.
    Samples(cli::inspect::SamplesArgs),
    /// Show the panel genotypes of a sample.
    View(cli::inspect::ViewArgs),
    /// List the markers of a sample within a MAF range.
    MafRange(cli::inspect::MafRangeArgs),
    /// Write the appearance input file of a sample.
    Export(cli::export::Args),
    /// Write the raw panel genotypes of a sample.
    ExportRaw(cli::export::RawArgs),
    /// Write the input data with edited genotypes.
    SaveModified(cli::export::SaveArgs),
    /// Review and edit genotypes interactively.
    Session(cli::interactive::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Samples(args) => cli::inspect::run_samples(&cli.common, args)?,
            Commands::View(args) => cli::inspect::run_view(&cli.common, args)?,
            Commands::MafRange(args) => cli::inspect::run_maf_range(&cli.common, args)?,
            Commands::Export(args) => cli::export::run(&cli.common, args)?,
            Commands::ExportRaw(args) => cli::export::run_raw(&cli.common, args)?,
            Commands::SaveModified(args) => cli::export::run_save(&cli.common, args)?,
            Commands::Session(args) => cli::interactive::run(&cli.common, args)?,
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
