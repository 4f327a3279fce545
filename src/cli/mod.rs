//! Sub commands of the command line interface.

pub mod export;
pub mod inspect;
pub mod interactive;

use chrono::Local;

use crate::{
    dataset::{Dataset, DuplicatePolicy},
    err::Error,
    session::Session,
    tracker::ChangeLog,
    transform::TransformationTable,
};

/// Arguments for reading the input file.
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the input CSV file, may be gzip compressed.
    #[arg(long, required = true)]
    pub path_input: String,
    /// How to handle more than one row for the same sample and marker.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Warn)]
    pub duplicates: DuplicatePolicy,
}

impl InputArgs {
    pub fn load(&self) -> Result<Dataset, Error> {
        Dataset::load(&self.path_input, self.duplicates)
    }
}

/// Arguments for setting up a session.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Optional JSON file with transformation tables to use instead of the
    /// builtin ones.
    #[arg(long)]
    pub path_transformations: Option<String>,
    /// Directory to write the genotype change log to; not written if unset.
    #[arg(long)]
    pub path_change_log_dir: Option<String>,
}

impl SessionArgs {
    /// Build a fresh session from the arguments.
    pub fn build_session(&self) -> Result<Session, Error> {
        let started = Local::now();
        let table = match self.path_transformations.as_ref() {
            Some(path) => TransformationTable::from_json_path(path)?,
            None => TransformationTable::builtin(),
        };
        let change_log = match self.path_change_log_dir.as_ref() {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                ChangeLog::in_dir(dir, &started)
            }
            None => ChangeLog::in_memory(),
        };
        if let Some(path) = change_log.path() {
            tracing::info!("logging genotype changes to {}", path.display());
        }
        Ok(Session::new(table, change_log, started))
    }
}

/// Parse a `MARKER=GENOTYPE` pair.
pub fn parse_edit(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((marker_id, genotype)) if !marker_id.is_empty() => {
            Ok((marker_id.to_string(), genotype.to_string()))
        }
        _ => Err(format!("expected MARKER=GENOTYPE, got {:?}", s)),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{parse_edit, SessionArgs};

    #[rstest]
    #[case("rs2196051=A/G", Ok(("rs2196051", "A/G")))]
    #[case("rs310644=", Ok(("rs310644", "")))]
    #[case("rs310644", Err(()))]
    #[case("=A/G", Err(()))]
    fn parse_edit_cases(#[case] s: &str, #[case] expected: Result<(&str, &str), ()>) {
        let actual = parse_edit(s);
        match expected {
            Ok((marker_id, genotype)) => {
                assert_eq!(Ok((marker_id.to_string(), genotype.to_string())), actual)
            }
            Err(()) => assert!(actual.is_err()),
        }
    }

    #[test]
    fn build_session_with_change_log_dir() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let log_dir = tmp_dir.join("logs");
        let args = SessionArgs {
            path_transformations: None,
            path_change_log_dir: Some(log_dir.to_str().unwrap().to_string()),
        };

        let session = args.build_session()?;

        assert!(log_dir.is_dir());
        assert!(session.change_log().path().unwrap().starts_with(&log_dir));

        Ok(())
    }
}
