pub const HEADER_MARKER: &str = "##";
pub const FIELD_SEPARATOR: char = '\t';
pub const GZ_SUFFIX: &str = ".gz";
pub const KEY_SEPARATOR: &str = "_";

// Chromosome ranks for the fixed human contig order 1..22, X, Y, MT.
pub const AUTOSOME_COUNT: u32 = 22;
pub const RANK_X: u32 = 23;
pub const RANK_Y: u32 = 24;
pub const RANK_MT: u32 = 25;

pub const DEFAULT_CHROM_COLUMN: &str = "#CHROM";
pub const DEFAULT_POS_COLUMN: &str = "POS";
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
pub const DEFAULT_FILE_MODE: u32 = 0o644;

// Annotation (VEP style) input columns.
pub const ANNOTATION_CHROM: &str = "%CHROM";
pub const ANNOTATION_POS: &str = "%POS";
pub const ANNOTATION_REF: &str = "%REF";
pub const ANNOTATION_ALT: &str = "%ALT";
pub const ANNOTATION_SYMBOL_SOURCE: &str = "%SYMBOL_SOURCE";

// Clinical input columns.
pub const CLINICAL_CHROM: &str = "#CHROM";
pub const CLINICAL_POS: &str = "POS";
pub const CLINICAL_REF: &str = "REF";
pub const CLINICAL_ALT: &str = "ALT";
pub const CLINICAL_CLINSIG: &str = "clinsig";

pub const HGNC_SYMBOL_SOURCE: &str = "HGNC";
pub const LIKELY_PATHOGENIC: &str = "LP";
pub const BINARIZED_LABEL: &str = "binarized_label";

pub const LEFT_COLLISION_SUFFIX: &str = "_x";
pub const RIGHT_COLLISION_SUFFIX: &str = "_y";
