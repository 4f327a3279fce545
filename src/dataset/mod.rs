//! The marker genotype table loaded from the input CSV file.

use std::{io::Read, path::Path};

use indexmap::{map::Entry, IndexMap, IndexSet};
use thousands::Separable;

use crate::{common::open_read_maybe_gz, err::Error};

/// Columns that the input file must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["SampleName", "Target ID", "Genotype", "Maj Allele Freq"];

/// One genotype call as read from the input file.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct MarkerObservation {
    /// sample name
    #[serde(rename = "SampleName")]
    pub sample_id: String,
    /// marker identifier, e.g., `rs12913832`
    #[serde(rename = "Target ID")]
    pub marker_id: String,
    /// genotype call, e.g., `A/G`
    #[serde(rename = "Genotype")]
    pub genotype: String,
    /// major allele frequency in percent, `None` if not a number
    #[serde(rename = "Maj Allele Freq", deserialize_with = "csv::invalid_option")]
    pub maj_allele_freq: Option<f64>,
}

/// How to treat more than one row for the same sample and marker.
#[derive(
    clap::ValueEnum,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Debug,
    Default,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Silently use the first row.
    First,
    /// Use the first row and log a warning.
    #[default]
    Warn,
    /// Fail loading.
    Reject,
}

/// Immutable table of marker observations.
///
/// The raw CSV rows are kept next to the parsed observations so that the
/// input can be written back with all of its original columns.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    headers: csv::StringRecord,
    rows: Vec<csv::StringRecord>,
    observations: Vec<MarkerObservation>,
    /// sample -> marker -> index of first observation
    index: IndexMap<String, IndexMap<String, usize>>,
}

impl Dataset {
    /// Load the dataset from the CSV file at `path`; `.gz` files are
    /// decompressed on the fly.
    pub fn load<P>(path: P, policy: DuplicatePolicy) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        tracing::info!("loading data from {:?}", path);
        let before_loading = std::time::Instant::now();
        let reader = open_read_maybe_gz(path)
            .map_err(|e| Error::DataLoad(format!("could not open {}: {}", path.display(), e)))?;
        let dataset = Self::from_reader(reader, policy)?;
        tracing::info!(
            "... loaded {} rows for {} samples in {:?}",
            dataset.len().separate_with_commas(),
            dataset.index.len().separate_with_commas(),
            before_loading.elapsed()
        );
        Ok(dataset)
    }

    /// Parse the dataset from CSV text provided by `reader`.
    pub fn from_reader<R>(reader: R, policy: DuplicatePolicy) -> Result<Self, Error>
    where
        R: Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|e| Error::DataLoad(e.to_string()))?
            .clone();
        let missing = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|header| header == **column))
            .map(|column| column.to_string())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        let mut dataset = Self {
            headers,
            ..Default::default()
        };
        let mut duplicates = 0usize;
        for record in csv_reader.records() {
            let record = record.map_err(|e| Error::DataLoad(e.to_string()))?;
            let observation: MarkerObservation = record
                .deserialize(Some(&dataset.headers))
                .map_err(|e| Error::DataLoad(e.to_string()))?;
            if !dataset.push(observation, record, policy)? {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            tracing::debug!("{} duplicate (sample, marker) rows", duplicates);
        }

        Ok(dataset)
    }

    /// Append a row; returns `false` if the row duplicates an earlier one.
    fn push(
        &mut self,
        observation: MarkerObservation,
        record: csv::StringRecord,
        policy: DuplicatePolicy,
    ) -> Result<bool, Error> {
        let idx = self.observations.len();
        let is_new = match self
            .index
            .entry(observation.sample_id.clone())
            .or_default()
            .entry(observation.marker_id.clone())
        {
            Entry::Vacant(entry) => {
                entry.insert(idx);
                true
            }
            Entry::Occupied(_) => match policy {
                DuplicatePolicy::First => false,
                DuplicatePolicy::Warn => {
                    tracing::warn!(
                        "duplicate rows for sample {} and marker {}, using the first one",
                        &observation.sample_id,
                        &observation.marker_id
                    );
                    false
                }
                DuplicatePolicy::Reject => {
                    return Err(Error::DataLoad(format!(
                        "duplicate rows for sample {} and marker {}",
                        &observation.sample_id, &observation.marker_id
                    )))
                }
            },
        };
        self.observations.push(observation);
        self.rows.push(record);
        Ok(is_new)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All observations in input order.
    pub fn observations(&self) -> &[MarkerObservation] {
        &self.observations
    }

    /// Distinct sample identifiers in order of first appearance.
    pub fn sample_ids(&self) -> IndexSet<&str> {
        self.index.keys().map(String::as_str).collect()
    }

    /// Whether any row has the given sample identifier.
    pub fn has_sample(&self, sample_id: &str) -> bool {
        self.index.contains_key(sample_id)
    }

    /// First observation for the given sample and marker.
    pub fn find(&self, sample_id: &str, marker_id: &str) -> Option<&MarkerObservation> {
        self.index
            .get(sample_id)
            .and_then(|markers| markers.get(marker_id))
            .map(|idx| &self.observations[*idx])
    }

    /// All observations for any of the given markers.
    pub fn filter_by_markers(&self, marker_ids: &[&str]) -> Vec<&MarkerObservation> {
        self.observations
            .iter()
            .filter(|obs| marker_ids.contains(&obs.marker_id.as_str()))
            .collect()
    }

    /// Observations of `sample_id` with `low < MAF < high`.
    pub fn filter_by_maf_range(
        &self,
        sample_id: &str,
        low: f64,
        high: f64,
    ) -> Vec<&MarkerObservation> {
        self.observations
            .iter()
            .filter(|obs| obs.sample_id == sample_id)
            .filter(|obs| {
                obs.maj_allele_freq
                    .map(|maf| low < maf && maf < high)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Write all rows as CSV, replacing the genotype of `sample_id` rows for
    /// which `genotype_of` yields a value.  Returns the number of replaced
    /// rows.
    pub fn write_with_genotypes<W, F>(
        &self,
        writer: W,
        sample_id: &str,
        genotype_of: F,
    ) -> Result<usize, Error>
    where
        W: std::io::Write,
        F: Fn(&str) -> Option<String>,
    {
        let genotype_idx = self
            .headers
            .iter()
            .position(|header| header == "Genotype")
            .ok_or_else(|| Error::MissingColumns(vec!["Genotype".to_string()]))?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        let mut replaced = 0;
        for (obs, row) in self.observations.iter().zip(self.rows.iter()) {
            match (obs.sample_id == sample_id)
                .then(|| genotype_of(&obs.marker_id))
                .flatten()
            {
                Some(genotype) => {
                    replaced += 1;
                    csv_writer.write_record(row.iter().enumerate().map(|(i, field)| {
                        if i == genotype_idx {
                            genotype.as_str()
                        } else {
                            field
                        }
                    }))?;
                }
                None => csv_writer.write_record(row)?,
            }
        }
        csv_writer.flush()?;

        Ok(replaced)
    }
}
