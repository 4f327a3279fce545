//! State of one operator session.
//!
//! The session owns the loaded dataset, the selected sample with the view of
//! the active panel, and the edit tracker.  All operations check their
//! preconditions before mutating anything.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::{
    common::{file_timestamp, open_write_maybe_gz},
    dataset::{Dataset, MarkerObservation},
    err::Error,
    output::{build_raw_record, build_record, write_record, OutputRecord},
    tracker::{ChangeLog, EditOutcome, EditTracker},
    transform::{TransformationTable, APPEARANCE_HEADER},
    view::{build_view, info_for, Notice, Panel, ViewEntry},
};

#[derive(Debug)]
pub struct Session {
    started: DateTime<Local>,
    dataset: Option<Dataset>,
    sample_id: Option<String>,
    panel: Panel,
    view: Vec<ViewEntry>,
    tracker: EditTracker,
    change_log: ChangeLog,
    table: TransformationTable,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(
            TransformationTable::builtin(),
            ChangeLog::in_memory(),
            Local::now(),
        )
    }
}

impl Session {
    pub fn new(table: TransformationTable, change_log: ChangeLog, started: DateTime<Local>) -> Self {
        Self {
            started,
            dataset: None,
            sample_id: None,
            panel: Panel::default(),
            view: Vec::new(),
            tracker: EditTracker::default(),
            change_log,
            table,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn sample_id(&self) -> Option<&str> {
        self.sample_id.as_deref()
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    /// View of the active panel for the selected sample.
    pub fn view(&self) -> &[ViewEntry] {
        &self.view
    }

    pub fn tracker(&self) -> &EditTracker {
        &self.tracker
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    /// Install a freshly loaded dataset, discarding the sample selection and
    /// all edits.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.sample_id = None;
        self.view.clear();
        self.tracker.reset();
    }

    fn require_dataset(&self) -> Result<&Dataset, Error> {
        self.dataset.as_ref().ok_or(Error::NoDataLoaded)
    }

    fn require_selection(&self) -> Result<(&Dataset, &str), Error> {
        let dataset = self.require_dataset()?;
        let sample_id = self.sample_id.as_deref().ok_or(Error::NoSampleSelected)?;
        Ok((dataset, sample_id))
    }

    /// Select `sample_id`, rebuild the view and start tracking edits from
    /// the genotypes in the dataset.
    pub fn select_sample(&mut self, sample_id: &str) -> Result<Vec<Notice>, Error> {
        let dataset = self.require_dataset()?;
        if sample_id.is_empty() {
            return Err(Error::NoSampleSelected);
        }
        if !dataset.has_sample(sample_id) {
            return Err(Error::UnknownSample(sample_id.to_string()));
        }

        self.tracker.reset();
        self.sample_id = Some(sample_id.to_string());
        self.rebuild_view()
    }

    /// Switch the active panel.  Edits of the selected sample are kept.
    pub fn set_panel(&mut self, panel: Panel) -> Result<Vec<Notice>, Error> {
        self.panel = panel;
        match self.sample_id {
            Some(_) => self.rebuild_view(),
            None => Ok(Vec::new()),
        }
    }

    /// Build the view of the active panel and set the baselines of markers
    /// not tracked yet.
    fn rebuild_view(&mut self) -> Result<Vec<Notice>, Error> {
        let (dataset, sample_id) = self.require_selection()?;
        let (view, notices) = build_view(dataset, sample_id, self.panel.markers());

        for entry in &view {
            // missing markers start out empty so they can be filled in
            self.tracker.initialize(&entry.marker_id, &entry.genotype);
        }
        self.view = view;

        Ok(notices)
    }

    /// Record that the operator set the genotype of `marker_id` to `value`.
    pub fn edit(&mut self, marker_id: &str, value: &str) -> Result<EditOutcome, Error> {
        self.require_selection()?;
        if !self.panel.contains(marker_id) {
            return Err(Error::MarkerNotInPanel(marker_id.to_string()));
        }

        let outcome = self.tracker.record_edit(marker_id, value);
        if let EditOutcome::Changed(record) = &outcome {
            self.change_log.append(record)?;
        }
        Ok(outcome)
    }

    /// The view of the active panel with the edited genotypes applied.
    pub fn analyze(&self) -> Result<Vec<ViewEntry>, Error> {
        self.require_selection()?;
        Ok(self
            .view
            .iter()
            .map(|entry| match self.tracker.current_value(&entry.marker_id) {
                Some(current) => ViewEntry {
                    genotype: current.to_string(),
                    ..entry.clone()
                },
                None => entry.clone(),
            })
            .collect())
    }

    /// Markers of the selected sample with `low < MAF < high`.
    pub fn markers_by_maf(&self, low: f64, high: f64) -> Result<Vec<&MarkerObservation>, Error> {
        let (dataset, sample_id) = self.require_selection()?;
        Ok(dataset.filter_by_maf_range(sample_id, low, high))
    }

    /// Interpretation note for `marker_id`.
    pub fn info(&self, marker_id: &str) -> &'static str {
        info_for(marker_id)
    }

    /// Build the appearance input record of the selected sample.
    pub fn build_export(&self) -> Result<OutputRecord, Error> {
        let (dataset, sample_id) = self.require_selection()?;
        Ok(build_record(
            dataset,
            &self.tracker,
            &self.table,
            sample_id,
            &APPEARANCE_HEADER,
        ))
    }

    /// Build the raw genotype record of the selected sample for `header`.
    pub fn build_raw_export(&self, header: &[&str]) -> Result<OutputRecord, Error> {
        let (dataset, sample_id) = self.require_selection()?;
        Ok(build_raw_record(dataset, sample_id, header))
    }

    /// Default path of the appearance input file.
    pub fn default_export_path(&self) -> Result<PathBuf, Error> {
        let (_, sample_id) = self.require_selection()?;
        Ok(PathBuf::from(format!(
            "{}_appearance_input_file_{}.csv",
            sample_id,
            file_timestamp(&self.started)
        )))
    }

    /// Default path of the modified input file.
    pub fn default_modified_path(&self) -> PathBuf {
        PathBuf::from(format!(
            "modified_input_file_{}.csv",
            file_timestamp(&self.started)
        ))
    }

    /// Write the appearance input file to `path`.
    pub fn export_to(&self, path: &Path) -> Result<OutputRecord, Error> {
        let record = self.build_export()?;
        let mut writer = open_write_maybe_gz(path)?;
        write_record(&mut writer, &record)?;
        writer.finish()?;
        tracing::info!("Appearance data saved to {}.", path.display());
        Ok(record)
    }

    /// Write the raw genotype record for `header` to `path`.
    pub fn export_raw_to(&self, path: &Path, header: &[&str]) -> Result<OutputRecord, Error> {
        let record = self.build_raw_export(header)?;
        let mut writer = open_write_maybe_gz(path)?;
        write_record(&mut writer, &record)?;
        writer.finish()?;
        tracing::info!("Raw genotypes saved to {}.", path.display());
        Ok(record)
    }

    /// Write the input data with the edited genotypes of the selected sample
    /// to `path`; returns the number of modified rows.
    pub fn save_modified_to(&self, path: &Path) -> Result<usize, Error> {
        let (dataset, sample_id) = self.require_selection()?;
        let mut writer = open_write_maybe_gz(path)?;
        let replaced = dataset.write_with_genotypes(&mut writer, sample_id, |marker_id| {
            self.tracker.current_value(marker_id).map(str::to_string)
        })?;
        writer.finish()?;
        tracing::info!("Modified data saved to {}.", path.display());
        Ok(replaced)
    }
}
