//! Assembly and writing of the single-row analysis input records.

use std::io::Write;

use indexmap::IndexMap;

use crate::{
    dataset::Dataset,
    err::Error,
    tracker::EditTracker,
    transform::{marker_of_column, DosageCode, TransformationTable, SAMPLE_ID_COLUMN},
    view::Panel,
};

/// One output row, keyed by column name in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
#[serde(transparent)]
pub struct OutputRecord {
    columns: IndexMap<String, String>,
}

impl OutputRecord {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Column names in order.
    pub fn header(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(String::as_str)
    }
}

/// Header of the raw export of `panel`: sample id followed by the markers.
pub fn raw_header(panel: Panel) -> Vec<&'static str> {
    std::iter::once(SAMPLE_ID_COLUMN)
        .chain(panel.markers().iter().copied())
        .collect()
}

/// Build the record of `sample_id` for `header`.
///
/// The first column receives the sample id.  For every other column the
/// genotype of its marker is taken from the edits, then from the dataset,
/// and translated with `table`; markers without genotype are coded `NA`.
pub fn build_record(
    dataset: &Dataset,
    tracker: &EditTracker,
    table: &TransformationTable,
    sample_id: &str,
    header: &[&str],
) -> OutputRecord {
    build(sample_id, header, |column| {
        let marker_id = marker_of_column(column);
        let genotype = tracker.current_value(marker_id).or_else(|| {
            dataset
                .find(sample_id, marker_id)
                .map(|obs| obs.genotype.as_str())
        });
        let code = match genotype {
            Some(genotype) => table.transform(column, genotype),
            None => DosageCode::Na,
        };
        code.to_string()
    })
}

/// Build the record of `sample_id` from the raw dataset genotypes, without
/// edits or transformation.
pub fn build_raw_record(dataset: &Dataset, sample_id: &str, header: &[&str]) -> OutputRecord {
    build(sample_id, header, |column| {
        dataset
            .find(sample_id, marker_of_column(column))
            .map(|obs| obs.genotype.clone())
            .unwrap_or_else(|| DosageCode::Na.to_string())
    })
}

fn build<F>(sample_id: &str, header: &[&str], value_of: F) -> OutputRecord
where
    F: Fn(&str) -> String,
{
    let mut columns = IndexMap::with_capacity(header.len());
    if let Some((first, rest)) = header.split_first() {
        columns.insert(first.to_string(), sample_id.to_string());
        for column in rest {
            columns.insert(column.to_string(), value_of(column));
        }
    }
    OutputRecord { columns }
}

/// Write `record` as CSV with header line.
pub fn write_record<W>(writer: W, record: &OutputRecord) -> Result<(), Error>
where
    W: Write,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(record.header())?;
    csv_writer.write_record(record.values())?;
    csv_writer.flush()?;
    Ok(())
}
