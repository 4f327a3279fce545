//! Implementation of the interactive `session` sub command.
//!
//! Commands are read line by line from stdin.  Loading runs in the
//! background and reports its completion when done; every failure is
//! reported to the operator and the session continues.

use std::path::PathBuf;

use clap::Parser;
use console::Term;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    cli::inspect::maf_range_lines,
    dataset::DuplicatePolicy,
    err::Error,
    output::raw_header,
    tracker::EditOutcome,
    view::Panel,
    worker::{join, Worker},
};

use super::SessionArgs;

/// Command line arguments for `session` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Review and edit genotypes interactively", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub session: SessionArgs,
    /// How to handle more than one row for the same sample and marker.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Warn)]
    pub duplicates: DuplicatePolicy,
    /// Input file to load on startup.
    #[arg(long)]
    pub path_input: Option<String>,
}

const HELP: &str = "\
Commands:
  load PATH                 load input CSV file in the background
  samples                   list the samples of the loaded data
  select SAMPLE             select sample and show the panel genotypes
  panel prepare|analysis    switch the marker panel
  edit MARKER GENOTYPE      set the genotype of a panel marker
  analyze                   show the panel genotypes with edits applied
  maf [LOW HIGH]            list markers with LOW < MAF < HIGH (default 65 85)
  info MARKER               show interpretation notes for a marker
  export [PATH]             write the appearance input file
  export-raw PATH [PANEL]   write the raw genotypes of a panel
  save [PATH]               write the input data with edited genotypes
  help                      show this help
  quit                      end the session";

/// One operator command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    Samples,
    Select(String),
    Panel(Panel),
    Edit { marker_id: String, genotype: String },
    Analyze,
    Maf { low: f64, high: f64 },
    Info(String),
    Export(Option<PathBuf>),
    ExportRaw { path: PathBuf, panel: Option<Panel> },
    Save(Option<PathBuf>),
    Help,
    Quit,
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words = line.split_whitespace().collect::<Vec<_>>();
        let parse_f64 = |s: &str| {
            s.parse::<f64>()
                .map_err(|e| format!("invalid number {:?}: {}", s, e))
        };
        let parse_panel = |s: &str| {
            s.parse::<Panel>()
                .map_err(|_| format!("unknown panel {:?}, use prepare or analysis", s))
        };
        Ok(match words.as_slice() {
            ["load", path] => Command::Load(PathBuf::from(path)),
            ["samples"] => Command::Samples,
            ["select", sample_id] => Command::Select(sample_id.to_string()),
            ["panel", panel] => Command::Panel(parse_panel(panel)?),
            ["edit", marker_id, genotype] => Command::Edit {
                marker_id: marker_id.to_string(),
                genotype: genotype.to_string(),
            },
            // clearing a genotype
            ["edit", marker_id] => Command::Edit {
                marker_id: marker_id.to_string(),
                genotype: String::new(),
            },
            ["analyze"] => Command::Analyze,
            ["maf"] => Command::Maf {
                low: 65.0,
                high: 85.0,
            },
            ["maf", low, high] => Command::Maf {
                low: parse_f64(low)?,
                high: parse_f64(high)?,
            },
            ["info", marker_id] => Command::Info(marker_id.to_string()),
            ["export"] => Command::Export(None),
            ["export", path] => Command::Export(Some(PathBuf::from(path))),
            ["export-raw", path] => Command::ExportRaw {
                path: PathBuf::from(path),
                panel: None,
            },
            ["export-raw", path, panel] => Command::ExportRaw {
                path: PathBuf::from(path),
                panel: Some(parse_panel(panel)?),
            },
            ["save"] => Command::Save(None),
            ["save", path] => Command::Save(Some(PathBuf::from(path))),
            ["help"] | ["?"] => Command::Help,
            ["quit"] | ["exit"] => Command::Quit,
            _ => return Err(format!("cannot parse command {:?}, try help", line.trim())),
        })
    }
}

/// Whether to keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

fn display(line: &str) {
    if let Err(e) = Term::stdout().write_line(line) {
        tracing::error!("could not write to terminal: {}", e);
    }
}

/// Execute `command`, returning the lines to show to the operator.
pub async fn execute(worker: &Worker, command: Command) -> Result<(Flow, Vec<String>), Error> {
    let lines = match command {
        Command::Load(path) => {
            let handle = worker.load(path.clone()).await?;
            tokio::spawn(async move {
                match join(handle).await {
                    Ok(summary) => display(&format!(
                        "Data loaded successfully: {} rows, {} samples.",
                        summary.rows, summary.samples
                    )),
                    Err(e) => display(&format!("Error: {}", e)),
                }
            });
            vec![format!("Loading {} ...", path.display())]
        }
        Command::Samples => {
            let session = worker.session();
            let session = session.read().await;
            let dataset = session.dataset().ok_or(Error::NoDataLoaded)?;
            dataset.sample_ids().into_iter().map(String::from).collect()
        }
        Command::Select(sample_id) => {
            let notices = worker.select_sample(&sample_id).await?;
            let session = worker.session();
            let session = session.read().await;
            session
                .view()
                .iter()
                .map(|entry| entry.to_string())
                .chain(notices.iter().map(|notice| notice.to_string()))
                .collect()
        }
        Command::Panel(panel) => {
            let notices = worker.set_panel(panel).await?;
            std::iter::once(format!("Panel set to {}.", panel))
                .chain(notices.iter().map(|notice| notice.to_string()))
                .collect()
        }
        Command::Edit {
            marker_id,
            genotype,
        } => match worker.edit(&marker_id, &genotype).await? {
            EditOutcome::Changed(record) => vec![record.to_string()],
            EditOutcome::Unchanged => vec![format!("Genotype for {} unchanged.", marker_id)],
        },
        Command::Analyze => {
            let entries = join(worker.analyze().await?).await?;
            entries.iter().map(|entry| entry.to_string()).collect()
        }
        Command::Maf { low, high } => {
            let session = worker.session();
            let session = session.read().await;
            maf_range_lines(&session, low, high)?
        }
        Command::Info(marker_id) => {
            let session = worker.session();
            let session = session.read().await;
            vec![format!("{}: {}", marker_id, session.info(&marker_id))]
        }
        Command::Export(path) => {
            let (path, _) = join(worker.export(path).await?).await?;
            vec![format!("Appearance data saved to {}.", path.display())]
        }
        Command::ExportRaw { path, panel } => {
            let panel = match panel {
                Some(panel) => panel,
                None => worker.session().read().await.panel(),
            };
            join(worker.export_raw(path.clone(), raw_header(panel)).await?).await?;
            vec![format!("Raw genotypes saved to {}.", path.display())]
        }
        Command::Save(path) => {
            let (path, replaced) = join(worker.save_modified(path).await?).await?;
            vec![format!(
                "Modified data saved to {} ({} genotypes written).",
                path.display(),
                replaced
            )]
        }
        Command::Help => vec![HELP.to_string()],
        Command::Quit => return Ok((Flow::Stop, Vec::new())),
    };
    Ok((Flow::Continue, lines))
}

/// Read and execute commands from stdin until `quit` or end of input.
#[tokio::main]
async fn main_loop(worker: Worker, path_input: Option<String>) -> Result<(), anyhow::Error> {
    display(&format!(
        "genoprep {} session. Type help for the list of commands.",
        crate::common::VERSION
    ));
    let mut pending = path_input
        .map(|path| format!("load {}", path))
        .into_iter()
        .collect::<Vec<_>>();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match pending.pop() {
            Some(line) => line,
            None => match lines.next_line().await? {
                Some(line) => line,
                None => break,
            },
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(msg) => {
                display(&msg);
                continue;
            }
        };
        tracing::debug!("command = {:?}", &command);
        match execute(&worker, command).await {
            Ok((flow, output)) => {
                for line in output {
                    display(&line);
                }
                if flow == Flow::Stop {
                    break;
                }
            }
            Err(e) => display(&format!("Error: {}", e)),
        }
    }

    Ok(())
}

/// Main entry point for `session` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let session = args.session.build_session()?;
    let worker = Worker::new(session, args.duplicates);
    main_loop(worker, args.path_input.clone())?;

    crate::common::trace_rss_now();
    Ok(())
}
