//! Mapping of genotype strings to allele dosage codes.
//!
//! The lookup is literal: `"AG"`, `"A/G"`, and `"GA"` are distinct keys and
//! only match if the column's table lists them.  No case or separator
//! normalization takes place.

pub mod data;

use std::path::Path;

use indexmap::IndexMap;

use crate::{common::open_read_maybe_gz, err::Error};

pub use data::{APPEARANCE_HEADER, SAMPLE_ID_COLUMN};

/// Allele dosage code as written to the output file.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Debug,
    Default,
    Hash,
    strum::EnumString,
    strum::Display,
)]
pub enum DosageCode {
    #[serde(rename = "0")]
    #[strum(serialize = "0")]
    Zero,
    #[serde(rename = "1")]
    #[strum(serialize = "1")]
    One,
    #[serde(rename = "2")]
    #[strum(serialize = "2")]
    Two,
    /// Unresolvable genotype.
    #[default]
    #[serde(rename = "NA")]
    #[strum(serialize = "NA")]
    Na,
}

/// Return the marker identifier of an output column, e.g., `rs683` for
/// `rs683_G`.  Columns without allele suffix are returned unchanged.
pub fn marker_of_column(column: &str) -> &str {
    match column.find('_') {
        Some(pos) => &column[..pos],
        None => column,
    }
}

/// Per-column lookup tables from genotype string to dosage code.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct TransformationTable {
    columns: IndexMap<String, IndexMap<String, DosageCode>>,
}

impl TransformationTable {
    /// Build the table shipped with the program.
    pub fn builtin() -> Self {
        let columns = data::COLUMN_ALLELES
            .iter()
            .map(|&(column, zero, two)| (column.to_string(), expand_alleles(zero, two)))
            .collect();
        Self { columns }
    }

    /// Load a table from a JSON file of the form
    /// `{"<column>": {"<genotype>": "<code>", ...}, ...}`.
    pub fn from_json_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        tracing::debug!("loading transformation table from {:?}", path.as_ref());
        let reader = open_read_maybe_gz(path.as_ref())?;
        let table: Self = serde_json::from_reader(reader)?;
        tracing::debug!("... loaded tables for {} columns", table.len());
        Ok(table)
    }

    /// Number of columns with a lookup table.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Translate `genotype` for output column `column`.
    ///
    /// Falls back to the ambiguous genotype set and finally to `NA`.
    pub fn transform(&self, column: &str, genotype: &str) -> DosageCode {
        if let Some(code) = self
            .columns
            .get(column)
            .and_then(|table| table.get(genotype))
        {
            return *code;
        }
        if data::AMBIGUOUS_GENOTYPES.contains(&genotype) {
            tracing::trace!("ambiguous genotype {:?} for {}", genotype, column);
        } else {
            tracing::trace!("no code for genotype {:?} in {}", genotype, column);
        }
        DosageCode::Na
    }
}

/// Expand the two alleles of a column into all accepted genotype spellings.
fn expand_alleles(zero: char, two: char) -> IndexMap<String, DosageCode> {
    let mut result = IndexMap::new();
    for (lhs, rhs, code) in [
        (zero, zero, DosageCode::Zero),
        (two, two, DosageCode::Two),
        (zero, two, DosageCode::One),
        (two, zero, DosageCode::One),
    ] {
        result.insert(format!("{lhs}/{rhs}"), code);
        result.insert(format!("{lhs}{rhs}"), code);
    }
    result
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{DosageCode, TransformationTable, APPEARANCE_HEADER};

    #[rstest]
    #[case("rs683_G", "rs683")]
    #[case("rs12913832_T", "rs12913832")]
    #[case("rs16830500", "rs16830500")]
    #[case("sampleid", "sampleid")]
    fn marker_of_column(#[case] column: &str, #[case] expected: &str) {
        assert_eq!(expected, super::marker_of_column(column));
    }

    #[rstest]
    #[case("rs12913832_T", "G/A", DosageCode::One)]
    #[case("rs12913832_T", "AG", DosageCode::One)]
    #[case("rs12913832_T", "G/G", DosageCode::Zero)]
    #[case("rs12913832_T", "AA", DosageCode::Two)]
    #[case("rs683_G", "C/C", DosageCode::Two)]
    #[case("rs683_G", "A/A", DosageCode::Zero)]
    #[case("rs1042602_T", "A/A", DosageCode::Two)]
    #[case("rs1042602_T", "T/T", DosageCode::Na)]
    // literal matching only
    #[case("rs12913832_T", "g/a", DosageCode::Na)]
    #[case("rs12913832_T", "G|A", DosageCode::Na)]
    #[case("rs12913832_T", "G/ A", DosageCode::Na)]
    // shared ambiguous genotypes
    #[case("rs12913832_T", "./.", DosageCode::Na)]
    #[case("rs12913832_T", "G", DosageCode::Na)]
    #[case("rs12913832_T", "", DosageCode::Na)]
    // unknown column
    #[case("rs1_A", "A/A", DosageCode::Na)]
    fn transform(#[case] column: &str, #[case] genotype: &str, #[case] expected: DosageCode) {
        let table = TransformationTable::builtin();
        assert_eq!(expected, table.transform(column, genotype));
        // pure: same inputs yield the same output
        assert_eq!(expected, table.transform(column, genotype));
    }

    #[test]
    fn builtin_covers_header() {
        let table = TransformationTable::builtin();
        assert_eq!(APPEARANCE_HEADER.len() - 1, table.len());
        for column in &APPEARANCE_HEADER[1..] {
            assert!(
                table.columns.get(*column).map(|t| t.len()) == Some(8),
                "column {column} lacks a complete table"
            );
        }
    }

    #[rstest]
    #[case(DosageCode::Zero, "0")]
    #[case(DosageCode::One, "1")]
    #[case(DosageCode::Two, "2")]
    #[case(DosageCode::Na, "NA")]
    fn dosage_code_display(#[case] code: DosageCode, #[case] expected: &str) {
        assert_eq!(expected, code.to_string());
        assert_eq!(code, expected.parse::<DosageCode>().unwrap());
    }

    #[test]
    fn from_json_path() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("table.json");
        std::fs::write(&path, r#"{"rs1_A": {"A/A": "2", "C/A": "1", "weird": "NA"}}"#)?;

        let table = TransformationTable::from_json_path(&path)?;

        assert_eq!(1, table.len());
        assert_eq!(DosageCode::Two, table.transform("rs1_A", "A/A"));
        assert_eq!(DosageCode::One, table.transform("rs1_A", "C/A"));
        assert_eq!(DosageCode::Na, table.transform("rs1_A", "A/C"));
        assert_eq!(DosageCode::Na, table.transform("rs683_G", "C/C"));

        Ok(())
    }

    #[test]
    fn from_json_path_invalid_code() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("table.json");
        std::fs::write(&path, r#"{"rs1_A": {"A/A": "3"}}"#)?;

        assert!(TransformationTable::from_json_path(&path).is_err());

        Ok(())
    }

    #[test]
    fn builtin_expands_all_spellings() {
        let table = TransformationTable::builtin();
        let column = table
            .columns
            .get("rs312262906_A")
            .unwrap()
            .iter()
            .map(|(gt, code)| format!("{gt}={code}"))
            .collect::<Vec<_>>();
        assert_eq!(
            vec!["C/C=0", "CC=0", "A/A=2", "AA=2", "C/A=1", "CA=1", "A/C=1", "AC=1"],
            column
        );
    }
}
