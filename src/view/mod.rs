//! Per-sample view of the genotypes of a marker panel.

use crate::dataset::Dataset;

/// The fixed marker panels that can be reviewed.
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
pub enum Panel {
    /// Markers reviewed before creating the appearance input file.
    #[default]
    Prepare,
    /// Markers of the ancestry analysis.
    Analysis,
}

impl Panel {
    /// Marker identifiers of the panel in display order.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            Panel::Prepare => &[
                "rs312262906",
                "rs2196051",
                "rs1495085",
                "rs2789823",
                "rs7148809",
                "rs310644",
            ],
            Panel::Analysis => &["rs16830500", "rs10497191", "rs7568054", "rs2302013"],
        }
    }

    /// Whether `marker_id` is part of the panel.
    pub fn contains(&self, marker_id: &str) -> bool {
        self.markers().contains(&marker_id)
    }
}

/// Default text of `info_for()`.
pub const NO_INFO: &str = "No additional information available for this marker.";

/// Interpretation hint for reviewing the genotype of `marker_id`.
pub fn info_for(marker_id: &str) -> &'static str {
    match marker_id {
        "rs312262906" => {
            "This is an indel marker and you need to check the genotype yourself in IGV."
        }
        "rs2196051" => "MAF <40 - GG?, 40< MAF <80 - AG, > 80 AA.",
        "rs1495085" | "rs2789823" | "rs7148809" => "80 < MAF - homozygous.",
        "rs310644" => "C could be lost, don't trust TT.",
        _ => NO_INFO,
    }
}

/// One line of the sample view.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ViewEntry {
    pub marker_id: String,
    /// genotype, empty if the marker was not found
    pub genotype: String,
    /// major allele frequency from the dataset
    pub maf: Option<f64>,
    pub found: bool,
}

impl std::fmt::Display for ViewEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.maf {
            Some(maf) => write!(
                f,
                "Genotype for {}: {} (MAF: {:.2}%)",
                self.marker_id, self.genotype, maf
            ),
            None => write!(
                f,
                "Genotype for {}: {} (MAF: N/A)",
                self.marker_id, self.genotype
            ),
        }
    }
}

/// Non-fatal problems found while building a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MarkerNotFound { sample_id: String, marker_id: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::MarkerNotFound {
                sample_id,
                marker_id,
            } => write!(f, "Marker {marker_id} not found in the data for {sample_id}."),
        }
    }
}

/// Build the view of `markers` for `sample_id`, in panel order.
///
/// Missing markers yield an entry with `found == false` and a notice; they
/// never fail the whole view.
pub fn build_view(
    dataset: &Dataset,
    sample_id: &str,
    markers: &[&str],
) -> (Vec<ViewEntry>, Vec<Notice>) {
    let mut notices = Vec::new();
    let entries = markers
        .iter()
        .map(|&marker_id| match dataset.find(sample_id, marker_id) {
            Some(obs) => ViewEntry {
                marker_id: marker_id.to_string(),
                genotype: obs.genotype.clone(),
                maf: obs.maj_allele_freq,
                found: true,
            },
            None => {
                tracing::warn!("marker {} not found for sample {}", marker_id, sample_id);
                notices.push(Notice::MarkerNotFound {
                    sample_id: sample_id.to_string(),
                    marker_id: marker_id.to_string(),
                });
                ViewEntry {
                    marker_id: marker_id.to_string(),
                    genotype: String::new(),
                    maf: None,
                    found: false,
                }
            }
        })
        .collect();
    (entries, notices)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{build_view, info_for, Notice, Panel, ViewEntry, NO_INFO};
    use crate::dataset::{Dataset, DuplicatePolicy};

    fn dataset() -> Dataset {
        Dataset::load("tests/data/genotypes.csv", DuplicatePolicy::Warn).unwrap()
    }

    #[test]
    fn build_view_prepare_panel() {
        let dataset = dataset();

        let (entries, notices) = build_view(&dataset, "S1", Panel::Prepare.markers());

        assert_eq!(Panel::Prepare.markers().len(), entries.len());
        for entry in &entries {
            match dataset.find("S1", &entry.marker_id) {
                Some(obs) => {
                    assert!(entry.found);
                    assert_eq!(obs.genotype, entry.genotype);
                    assert_eq!(obs.maj_allele_freq, entry.maf);
                }
                None => {
                    assert!(!entry.found);
                    assert_eq!("", entry.genotype);
                    assert_eq!(None, entry.maf);
                }
            }
        }
        assert_eq!(
            vec![Notice::MarkerNotFound {
                sample_id: "S1".into(),
                marker_id: "rs310644".into()
            }],
            notices
        );
    }

    #[test]
    fn build_view_unknown_sample() {
        let dataset = dataset();

        let (entries, notices) = build_view(&dataset, "S9", Panel::Analysis.markers());

        assert!(entries.iter().all(|entry| !entry.found));
        assert_eq!(4, notices.len());
        assert_eq!(
            "Marker rs16830500 not found in the data for S9.",
            notices[0].to_string()
        );
    }

    #[rstest]
    #[case(Some(70.0), "Genotype for rs1: G/A (MAF: 70.00%)")]
    #[case(None, "Genotype for rs1: G/A (MAF: N/A)")]
    fn view_entry_display(#[case] maf: Option<f64>, #[case] expected: &str) {
        let entry = ViewEntry {
            marker_id: "rs1".into(),
            genotype: "G/A".into(),
            maf,
            found: true,
        };
        assert_eq!(expected, entry.to_string());
    }

    #[rstest]
    #[case("rs2196051", "MAF <40 - GG?, 40< MAF <80 - AG, > 80 AA.")]
    #[case("rs7148809", "80 < MAF - homozygous.")]
    #[case("rs310644", "C could be lost, don't trust TT.")]
    #[case("rs16830500", NO_INFO)]
    fn info(#[case] marker_id: &str, #[case] expected: &str) {
        assert_eq!(expected, info_for(marker_id));
    }

    #[test]
    fn prepare_markers_have_info() {
        for marker in Panel::Prepare.markers() {
            assert_ne!(NO_INFO, info_for(marker));
        }
    }

    #[rstest]
    #[case(Panel::Prepare, "prepare", 6)]
    #[case(Panel::Analysis, "analysis", 4)]
    fn panel_names(#[case] panel: Panel, #[case] name: &str, #[case] len: usize) {
        assert_eq!(name, panel.to_string());
        assert_eq!(panel, name.parse::<Panel>().unwrap());
        assert_eq!(len, panel.markers().len());
    }
}
