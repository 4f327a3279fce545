//! Static data for the appearance transformation table.

/// Name of the first output column.
pub const SAMPLE_ID_COLUMN: &str = "sampleid";

/// Header of the appearance input file.
pub const APPEARANCE_HEADER: [&str; 42] = [
    SAMPLE_ID_COLUMN,
    "rs312262906_A",
    "rs11547464_A",
    "rs885479_T",
    "rs1805008_T",
    "rs1805005_T",
    "rs1805006_A",
    "rs1805007_T",
    "rs1805009_C",
    "rs201326893_A",
    "rs2228479_A",
    "rs1110400_C",
    "rs28777_C",
    "rs16891982_C",
    "rs12821256_G",
    "rs4959270_A",
    "rs12203592_T",
    "rs1042602_T",
    "rs1800407_A",
    "rs2402130_G",
    "rs12913832_T",
    "rs2378249_C",
    "rs12896399_T",
    "rs1393350_T",
    "rs683_G",
    "rs3114908_T",
    "rs1800414_C",
    "rs10756819_G",
    "rs2238289_C",
    "rs17128291_C",
    "rs6497292_C",
    "rs1129038_G",
    "rs1667394_C",
    "rs1126809_A",
    "rs1470608_A",
    "rs1426654_G",
    "rs6119471_C",
    "rs1545397_T",
    "rs6059655_T",
    "rs12441727_A",
    "rs3212355_A",
    "rs8051733_C",
];

/// Per-column alleles as `(column, allele coded 0, allele coded 2)`.
///
/// Homozygous calls of the first allele are coded `0`, homozygous calls of
/// the second allele `2`, and heterozygous calls in either order `1`.  These
/// are taken literally from the pipeline's conventions and are not always the
/// allele named in the column suffix.
pub const COLUMN_ALLELES: [(&str, char, char); 41] = [
    ("rs312262906_A", 'C', 'A'),
    ("rs11547464_A", 'G', 'A'),
    ("rs885479_T", 'G', 'A'),
    ("rs1805008_T", 'C', 'T'),
    ("rs1805005_T", 'G', 'T'),
    ("rs1805006_A", 'C', 'A'),
    ("rs1805007_T", 'C', 'T'),
    ("rs1805009_C", 'G', 'C'),
    ("rs201326893_A", 'C', 'A'),
    ("rs2228479_A", 'G', 'A'),
    ("rs1110400_C", 'T', 'C'),
    ("rs28777_C", 'A', 'C'),
    ("rs16891982_C", 'G', 'C'),
    ("rs12821256_G", 'T', 'C'),
    ("rs4959270_A", 'C', 'A'),
    ("rs12203592_T", 'C', 'T'),
    ("rs1042602_T", 'C', 'A'),
    ("rs1800407_A", 'C', 'T'),
    ("rs2402130_G", 'A', 'G'),
    ("rs12913832_T", 'G', 'A'),
    ("rs2378249_C", 'A', 'G'),
    ("rs12896399_T", 'G', 'T'),
    ("rs1393350_T", 'G', 'A'),
    ("rs683_G", 'A', 'C'),
    ("rs3114908_T", 'C', 'T'),
    ("rs1800414_C", 'T', 'C'),
    ("rs10756819_G", 'A', 'G'),
    ("rs2238289_C", 'A', 'G'),
    ("rs17128291_C", 'A', 'G'),
    ("rs6497292_C", 'A', 'G'),
    ("rs1129038_G", 'T', 'C'),
    ("rs1667394_C", 'T', 'C'),
    ("rs1126809_A", 'G', 'A'),
    ("rs1470608_A", 'G', 'T'),
    ("rs1426654_G", 'A', 'G'),
    ("rs6119471_C", 'C', 'G'),
    ("rs1545397_T", 'A', 'T'),
    ("rs6059655_T", 'G', 'A'),
    ("rs12441727_A", 'G', 'A'),
    ("rs3212355_A", 'C', 'T'),
    ("rs8051733_C", 'A', 'G'),
];

/// Genotype strings that are coded `NA` in every column.
pub const AMBIGUOUS_GENOTYPES: [&str; 5] = ["./.", "C", "A", "G", "T"];
