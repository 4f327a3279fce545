//! Tracking of operator edits against the genotypes loaded from the data.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use indexmap::IndexMap;

use crate::{common::file_timestamp, err::Error};

/// Edit state of one marker of the active sample.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditState {
    /// genotype when the sample was selected
    pub original: Option<String>,
    /// value that the next edit is compared against
    pub last_recorded: Option<String>,
    /// edited value, if any edit happened
    pub current: Option<String>,
}

/// One recorded change of a genotype.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChangeRecord {
    pub marker_id: String,
    pub from: String,
    pub to: String,
    pub timestamp: DateTime<Local>,
}

impl std::fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Genotype for {} changed from {} to {}.",
            self.marker_id, self.from, self.to
        )
    }
}

/// Result of `EditTracker::record_edit()`.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Changed(ChangeRecord),
    Unchanged,
}

/// Per-marker edit states of the active sample.
#[derive(Debug, Clone, Default)]
pub struct EditTracker {
    states: IndexMap<String, EditState>,
}

impl EditTracker {
    /// Set the baseline genotype of `marker_id` unless already set.
    pub fn initialize(&mut self, marker_id: &str, genotype: &str) {
        let state = self.states.entry(marker_id.to_string()).or_default();
        if state.original.is_none() {
            state.original = Some(genotype.to_string());
            state.last_recorded = Some(genotype.to_string());
        }
    }

    /// Record that the operator finished editing `marker_id` with
    /// `new_value`.
    ///
    /// The comparison is against the last recorded value, not the original
    /// one, so reverting an edit is itself a change.  Markers without
    /// baseline have nothing to compare against and are left untouched.
    pub fn record_edit(&mut self, marker_id: &str, new_value: &str) -> EditOutcome {
        let Some(state) = self.states.get_mut(marker_id) else {
            tracing::debug!("ignoring edit of uninitialized marker {}", marker_id);
            return EditOutcome::Unchanged;
        };
        let Some(last_recorded) = state.last_recorded.as_deref() else {
            return EditOutcome::Unchanged;
        };
        if last_recorded == new_value {
            return EditOutcome::Unchanged;
        }

        let record = ChangeRecord {
            marker_id: marker_id.to_string(),
            from: last_recorded.to_string(),
            to: new_value.to_string(),
            timestamp: Local::now(),
        };
        state.current = Some(new_value.to_string());
        state.last_recorded = Some(new_value.to_string());
        EditOutcome::Changed(record)
    }

    /// Forget all state, e.g., when another sample is selected.
    pub fn reset(&mut self) {
        self.states.clear();
    }

    /// The edited value of `marker_id`, if it was edited.
    pub fn current_value(&self, marker_id: &str) -> Option<&str> {
        self.states
            .get(marker_id)
            .and_then(|state| state.current.as_deref())
    }

    /// The baseline genotype of `marker_id`.
    pub fn original(&self, marker_id: &str) -> Option<&str> {
        self.states
            .get(marker_id)
            .and_then(|state| state.original.as_deref())
    }

    /// Edited markers with their current values.
    pub fn edited(&self) -> impl Iterator<Item = (&str, &str)> {
        self.states.iter().filter_map(|(marker_id, state)| {
            state
                .current
                .as_deref()
                .map(|current| (marker_id.as_str(), current))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Append-only log of genotype changes of one session.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    path: Option<PathBuf>,
    lines: Vec<String>,
}

impl ChangeLog {
    /// Log that is only kept in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Log that is also appended to `genotype_changes_log_<ts>.txt` in `dir`.
    pub fn in_dir<P>(dir: P, started: &DateTime<Local>) -> Self
    where
        P: AsRef<Path>,
    {
        let path = dir.as_ref().join(format!(
            "genotype_changes_log_{}.txt",
            file_timestamp(started)
        ));
        Self {
            path: Some(path),
            lines: Vec::new(),
        }
    }

    /// Append the line for `record`.
    pub fn append(&mut self, record: &ChangeRecord) -> Result<(), Error> {
        let line = record.to_string();
        tracing::info!("{}", &line);
        if let Some(path) = self.path.as_ref() {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", &line)?;
        }
        self.lines.push(line);
        Ok(())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
