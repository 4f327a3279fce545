//! Implementation of the read-only sub commands `samples`, `view`, and
//! `maf-range`.

use clap::Parser;
use console::Term;

use crate::{session::Session, view::Panel};

use super::InputArgs;

/// Command line arguments for `samples` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "List the samples of an input file", long_about = None)]
pub struct SamplesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Main entry point for `samples` sub command.
pub fn run_samples(args_common: &crate::common::Args, args: &SamplesArgs) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let dataset = args.input.load()?;
    let term = Term::stdout();
    for sample_id in dataset.sample_ids() {
        term.write_line(sample_id)?;
    }

    Ok(())
}

/// Command line arguments for `view` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Show the panel genotypes of a sample", long_about = None)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Name of the sample to show.
    #[arg(long, required = true)]
    pub sample: String,
    /// Marker panel to show.
    #[arg(long, value_enum, default_value_t = Panel::Prepare)]
    pub panel: Panel,
}

/// Main entry point for `view` sub command.
pub fn run_view(args_common: &crate::common::Args, args: &ViewArgs) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let mut session = Session::default();
    session.replace_dataset(args.input.load()?);
    session.set_panel(args.panel)?;
    let notices = session.select_sample(&args.sample)?;

    let term = Term::stdout();
    for entry in session.view() {
        term.write_line(&format!("{}  [{}]", entry, session.info(&entry.marker_id)))?;
    }
    for notice in notices {
        term.write_line(&notice.to_string())?;
    }

    Ok(())
}

/// Command line arguments for `maf-range` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "List the markers of a sample within a MAF range", long_about = None)]
pub struct MafRangeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Name of the sample to show.
    #[arg(long, required = true)]
    pub sample: String,
    /// Exclusive lower MAF bound in percent.
    #[arg(long, default_value_t = 65.0)]
    pub low: f64,
    /// Exclusive upper MAF bound in percent.
    #[arg(long, default_value_t = 85.0)]
    pub high: f64,
}

/// Render the result of a MAF range query for the operator.
pub fn maf_range_lines(session: &Session, low: f64, high: f64) -> Result<Vec<String>, crate::err::Error> {
    let markers = session.markers_by_maf(low, high)?;
    if markers.is_empty() {
        return Ok(vec![format!("No markers with MAF between {low} and {high}.")]);
    }
    let mut lines = vec![format!("Markers with MAF between {low} and {high}:")];
    for obs in markers {
        lines.push(format!(
            "Marker: {}, Genotype: {}, MAF: {:.2}%",
            obs.marker_id,
            obs.genotype,
            obs.maj_allele_freq.unwrap_or_default()
        ));
    }
    Ok(lines)
}

/// Main entry point for `maf-range` sub command.
pub fn run_maf_range(args_common: &crate::common::Args, args: &MafRangeArgs) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let mut session = Session::default();
    session.replace_dataset(args.input.load()?);
    session.select_sample(&args.sample)?;

    let term = Term::stdout();
    for line in maf_range_lines(&session, args.low, args.high)? {
        term.write_line(&line)?;
    }

    Ok(())
}
