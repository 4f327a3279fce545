//! Implementation of the file writing sub commands `export`, `export-raw`,
//! and `save-modified`.

use std::path::PathBuf;

use clap::Parser;

use crate::{
    output::raw_header,
    session::Session,
    tracker::EditOutcome,
    view::Panel,
};

use super::{parse_edit, InputArgs, SessionArgs};

/// Selection and edits shared by the writing sub commands.
#[derive(clap::Args, Debug, Clone)]
pub struct EditArgs {
    /// Name of the sample to write.
    #[arg(long, required = true)]
    pub sample: String,
    /// Marker panel that edits refer to.
    #[arg(long, value_enum, default_value_t = Panel::Prepare)]
    pub panel: Panel,
    /// Genotype edit as `MARKER=GENOTYPE`; may be given multiple times.
    #[arg(long = "edit", value_parser = parse_edit)]
    pub edits: Vec<(String, String)>,
}

/// Load the input, select the sample and apply the edits in order.
fn prepare_session(
    input: &InputArgs,
    session_args: &SessionArgs,
    edit_args: &EditArgs,
) -> Result<Session, anyhow::Error> {
    let mut session = session_args.build_session()?;
    session.replace_dataset(input.load()?);
    session.set_panel(edit_args.panel)?;
    for notice in session.select_sample(&edit_args.sample)? {
        tracing::warn!("{}", notice);
    }
    for (marker_id, genotype) in &edit_args.edits {
        match session.edit(marker_id, genotype)? {
            EditOutcome::Changed(record) => tracing::info!("{}", record),
            EditOutcome::Unchanged => {
                tracing::debug!("genotype of {} unchanged", marker_id)
            }
        }
    }
    for (marker_id, genotype) in session.tracker().edited() {
        tracing::info!("using edited genotype {} for {}", genotype, marker_id);
    }
    Ok(session)
}

/// Command line arguments for `export` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Write the appearance input file of a sample", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub session: SessionArgs,
    #[command(flatten)]
    pub edit: EditArgs,
    /// Path to the output file; derived from sample and time if unset.
    #[arg(long)]
    pub path_output: Option<String>,
}

/// Main entry point for `export` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let session = prepare_session(&args.input, &args.session, &args.edit)?;
    let path = match args.path_output.as_ref() {
        Some(path) => PathBuf::from(path),
        None => session.default_export_path()?,
    };
    let record = session.export_to(&path)?;
    tracing::info!(
        "wrote {} columns for sample {} to {}",
        record.len(),
        &args.edit.sample,
        path.display()
    );
    crate::common::trace_rss_now();

    Ok(())
}

/// Command line arguments for `export-raw` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Write the raw panel genotypes of a sample", long_about = None)]
pub struct RawArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Name of the sample to write.
    #[arg(long, required = true)]
    pub sample: String,
    /// Marker panel whose genotypes to write.
    #[arg(long, value_enum, default_value_t = Panel::Prepare)]
    pub panel: Panel,
    /// Path to the output file.
    #[arg(long, required = true)]
    pub path_output: String,
}

/// Main entry point for `export-raw` sub command.
pub fn run_raw(args_common: &crate::common::Args, args: &RawArgs) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let mut session = Session::default();
    session.replace_dataset(args.input.load()?);
    session.set_panel(args.panel)?;
    for notice in session.select_sample(&args.sample)? {
        tracing::warn!("{}", notice);
    }
    session.export_raw_to(&PathBuf::from(&args.path_output), &raw_header(args.panel))?;

    Ok(())
}

/// Command line arguments for `save-modified` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Write the input data with edited genotypes", long_about = None)]
pub struct SaveArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub session: SessionArgs,
    #[command(flatten)]
    pub edit: EditArgs,
    /// Path to the output file; derived from the time if unset.
    #[arg(long)]
    pub path_output: Option<String>,
}

/// Main entry point for `save-modified` sub command.
pub fn run_save(args_common: &crate::common::Args, args: &SaveArgs) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let session = prepare_session(&args.input, &args.session, &args.edit)?;
    let path = args
        .path_output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| session.default_modified_path());
    let replaced = session.save_modified_to(&path)?;
    tracing::info!(
        "replaced {} genotypes in {}",
        thousands::Separable::separate_with_commas(&replaced),
        path.display()
    );

    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{run, run_raw, run_save, Args, EditArgs, RawArgs, SaveArgs};
    use crate::{
        cli::{InputArgs, SessionArgs},
        dataset::DuplicatePolicy,
        view::Panel,
    };

    fn input() -> InputArgs {
        InputArgs {
            path_input: "tests/data/genotypes.csv".into(),
            duplicates: DuplicatePolicy::Warn,
        }
    }

    fn edit_args(edits: &[(&str, &str)]) -> EditArgs {
        EditArgs {
            sample: "S1".into(),
            panel: Panel::Prepare,
            edits: edits
                .iter()
                .map(|(m, g)| (m.to_string(), g.to_string()))
                .collect(),
        }
    }

    #[test]
    fn smoke_test_export() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_output = tmp_dir.join("out.csv");
        let log_dir = tmp_dir.join("logs");
        let args = Args {
            input: input(),
            session: SessionArgs {
                path_transformations: None,
                path_change_log_dir: Some(log_dir.to_str().unwrap().into()),
            },
            edit: edit_args(&[("rs2196051", "A/A")]),
            path_output: Some(path_output.to_str().unwrap().into()),
        };

        run(&Default::default(), &args)?;

        let text = std::fs::read_to_string(&path_output)?;
        let values = text.lines().nth(1).unwrap().split(',').collect::<Vec<_>>();
        assert_eq!("S1", values[0]);
        let log_files = std::fs::read_dir(&log_dir)?.count();
        assert_eq!(1, log_files);

        Ok(())
    }

    #[test]
    fn smoke_test_export_raw() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_output = tmp_dir.join("raw.csv");
        let args = RawArgs {
            input: input(),
            sample: "S2".into(),
            panel: Panel::Prepare,
            path_output: path_output.to_str().unwrap().into(),
        };

        run_raw(&Default::default(), &args)?;

        insta::assert_snapshot!(std::fs::read_to_string(&path_output)?, @r###"
        sampleid,rs312262906,rs2196051,rs1495085,rs2789823,rs7148809,rs310644
        S2,C/C,A/G,NA,NA,NA,T/T
        "###);

        Ok(())
    }

    #[test]
    fn smoke_test_save_modified() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_output = tmp_dir.join("modified.csv");
        let args = SaveArgs {
            input: input(),
            session: SessionArgs::default(),
            edit: edit_args(&[("rs2196051", "A/G")]),
            path_output: Some(path_output.to_str().unwrap().into()),
        };

        run_save(&Default::default(), &args)?;

        let text = std::fs::read_to_string(&path_output)?;
        assert!(text.contains("S1,rs2196051,A/G,"));
        assert!(text.contains("S2,rs2196051,A/G,"));
        assert_eq!(14, text.lines().count());

        Ok(())
    }

    #[test]
    fn edit_outside_panel_fails() {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = Args {
            input: input(),
            session: SessionArgs::default(),
            edit: edit_args(&[("rs12913832", "A/A")]),
            path_output: Some(tmp_dir.join("out.csv").to_str().unwrap().into()),
        };

        assert!(run(&Default::default(), &args).is_err());
    }
}
