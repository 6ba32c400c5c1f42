use crate::{
    constants::*,
    core::table::{Cell, Column, ColumnType, Row, Schema, VariantTable},
    utils::util::{format_number_with_commas, Result},
};
use std::collections::{HashMap, HashSet};

/// Columns forming the composite `CHROM_POS_REF_ALT` join key, in key order.
#[derive(Debug, Clone, Copy)]
pub struct KeyColumns {
    pub chrom: &'static str,
    pub pos: &'static str,
    pub reference: &'static str,
    pub alternate: &'static str,
}

impl KeyColumns {
    pub const ANNOTATION: KeyColumns = KeyColumns {
        chrom: ANNOTATION_CHROM,
        pos: ANNOTATION_POS,
        reference: ANNOTATION_REF,
        alternate: ANNOTATION_ALT,
    };

    pub const CLINICAL: KeyColumns = KeyColumns {
        chrom: CLINICAL_CHROM,
        pos: CLINICAL_POS,
        reference: CLINICAL_REF,
        alternate: CLINICAL_ALT,
    };

    fn names(&self) -> [&'static str; 4] {
        [self.chrom, self.pos, self.reference, self.alternate]
    }

    fn resolve(&self, schema: &Schema) -> Result<[usize; 4]> {
        let [chrom, pos, reference, alternate] = self.names();
        Ok([
            schema.require(chrom)?,
            schema.require(pos)?,
            schema.require(reference)?,
            schema.require(alternate)?,
        ])
    }
}

pub fn composite_key(row: &Row, positions: &[usize; 4]) -> String {
    positions
        .iter()
        .map(|&idx| row.cells()[idx].to_string())
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

/// Joins an annotation table with a clinical table and derives `binarized_label`.
///
/// Annotation rows are restricted to HGNC symbols and deduplicated, then
/// inner-joined to clinical rows on `CHROM_POS_REF_ALT`. Output rows follow
/// annotation order; each annotation row expands to every matching clinical
/// row in clinical order. Neither input is modified.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationMerger {
    annotation_key: KeyColumns,
    clinical_key: KeyColumns,
}

impl Default for AnnotationMerger {
    fn default() -> Self {
        Self {
            annotation_key: KeyColumns::ANNOTATION,
            clinical_key: KeyColumns::CLINICAL,
        }
    }
}

impl AnnotationMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&self, annotation: &VariantTable, clinical: &VariantTable) -> Result<VariantTable> {
        let annotation_schema = annotation.schema();
        let clinical_schema = clinical.schema();

        let annotation_key = self.annotation_key.resolve(annotation_schema)?;
        let symbol_source_idx = annotation_schema.require(ANNOTATION_SYMBOL_SOURCE)?;
        let clinical_key = self.clinical_key.resolve(clinical_schema)?;
        let clinsig_idx = clinical_schema.require(CLINICAL_CLINSIG)?;

        let retained_clinical: Vec<usize> = (0..clinical_schema.len())
            .filter(|idx| !clinical_key.contains(idx))
            .collect();
        let schema = merged_schema(annotation_schema, clinical_schema, &retained_clinical)?;

        let annotation_rows = filter_annotation_rows(annotation, symbol_source_idx);

        let mut clinical_by_key: HashMap<String, Vec<&Row>> = HashMap::new();
        for row in clinical.iter() {
            clinical_by_key
                .entry(composite_key(row, &clinical_key))
                .or_default()
                .push(row);
        }

        let mut rows = Vec::new();
        for annotation_row in annotation_rows {
            let Some(matches) = clinical_by_key.get(&composite_key(annotation_row, &annotation_key))
            else {
                continue;
            };
            for clinical_row in matches {
                let label = binarize(&clinical_row.cells()[clinsig_idx]);
                let mut cells = Vec::with_capacity(schema.len());
                cells.extend(annotation_row.cells().iter().cloned());
                cells.extend(
                    retained_clinical
                        .iter()
                        .map(|&idx| clinical_row.cells()[idx].clone()),
                );
                cells.push(Cell::Integer(label));
                rows.push(Row::new(cells));
            }
        }

        log::debug!(
            "Merged {} annotation rows with {} clinical rows into {} labeled rows",
            format_number_with_commas(annotation.len()),
            format_number_with_commas(clinical.len()),
            format_number_with_commas(rows.len())
        );
        VariantTable::from_rows(schema, rows)
    }
}

/// HGNC rows only, exact duplicates collapsed to their first occurrence.
fn filter_annotation_rows(annotation: &VariantTable, symbol_source_idx: usize) -> Vec<&Row> {
    let mut seen: HashSet<&Row> = HashSet::new();
    let rows: Vec<&Row> = annotation
        .iter()
        .filter(|row| row.cells()[symbol_source_idx].to_string() == HGNC_SYMBOL_SOURCE)
        .filter(|row| seen.insert(*row))
        .collect();
    log::trace!(
        "Kept {} of {} annotation rows after {} filter and deduplication",
        format_number_with_commas(rows.len()),
        format_number_with_commas(annotation.len()),
        HGNC_SYMBOL_SOURCE
    );
    rows
}

fn binarize(clinsig: &Cell) -> i64 {
    match clinsig {
        Cell::Text(value) if value == LIKELY_PATHOGENIC => 1,
        _ => 0,
    }
}

// Name collisions between the two sides are resolved with _x / _y suffixes.
fn merged_schema(
    annotation: &Schema,
    clinical: &Schema,
    retained_clinical: &[usize],
) -> Result<Schema> {
    let clinical_columns: Vec<&Column> = retained_clinical
        .iter()
        .map(|&idx| &clinical.columns()[idx])
        .collect();
    let clinical_names: HashSet<&str> = clinical_columns.iter().map(|c| c.name.as_str()).collect();

    let mut columns = Vec::with_capacity(annotation.len() + clinical_columns.len() + 1);
    for column in annotation.columns() {
        let name = if clinical_names.contains(column.name.as_str()) {
            format!("{}{}", column.name, LEFT_COLLISION_SUFFIX)
        } else {
            column.name.clone()
        };
        columns.push(Column::new(name, column.column_type));
    }
    for column in clinical_columns {
        let name = if annotation.index_of(&column.name).is_some() {
            format!("{}{}", column.name, RIGHT_COLLISION_SUFFIX)
        } else {
            column.name.clone()
        };
        columns.push(Column::new(name, column.column_type));
    }
    columns.push(Column::new(BINARIZED_LABEL, ColumnType::Integer));
    Schema::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VarlabelError;

    fn annotation_table(rows: &[(&str, i64, &str, &str, &str, &str)]) -> VariantTable {
        let schema = Schema::new(vec![
            Column::text("%CHROM"),
            Column::integer("%POS"),
            Column::text("%REF"),
            Column::text("%ALT"),
            Column::text("%SYMBOL_SOURCE"),
            Column::text("%Consequence"),
        ])
        .unwrap();
        let rows = rows
            .iter()
            .map(|(chrom, pos, r, a, source, consequence)| {
                Row::new(vec![
                    (*chrom).into(),
                    (*pos).into(),
                    (*r).into(),
                    (*a).into(),
                    (*source).into(),
                    (*consequence).into(),
                ])
            })
            .collect();
        VariantTable::from_rows(schema, rows).unwrap()
    }

    fn clinical_table(rows: &[(&str, i64, &str, &str, &str, &str)]) -> VariantTable {
        let schema = Schema::new(vec![
            Column::text("#CHROM"),
            Column::integer("POS"),
            Column::text("REF"),
            Column::text("ALT"),
            Column::text("clinsig"),
            Column::text("review"),
        ])
        .unwrap();
        let rows = rows
            .iter()
            .map(|(chrom, pos, r, a, clinsig, review)| {
                Row::new(vec![
                    (*chrom).into(),
                    (*pos).into(),
                    (*r).into(),
                    (*a).into(),
                    (*clinsig).into(),
                    (*review).into(),
                ])
            })
            .collect();
        VariantTable::from_rows(schema, rows).unwrap()
    }

    fn labels(table: &VariantTable) -> Vec<i64> {
        let idx = table.schema().index_of(BINARIZED_LABEL).unwrap();
        table
            .iter()
            .map(|row| row.cells()[idx].as_integer().unwrap())
            .collect()
    }

    #[test]
    fn merge_single_likely_pathogenic_row() {
        let annotation = annotation_table(&[("1", 100, "A", "T", "HGNC", "missense")]);
        let clinical = clinical_table(&[("1", 100, "A", "T", "LP", "expert")]);

        let merged = AnnotationMerger::new().merge(&annotation, &clinical).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(labels(&merged), vec![1]);
        let names: Vec<&str> = merged.schema().names().collect();
        assert_eq!(
            names,
            vec![
                "%CHROM",
                "%POS",
                "%REF",
                "%ALT",
                "%SYMBOL_SOURCE",
                "%Consequence",
                "clinsig",
                "review",
                "binarized_label"
            ]
        );
        assert_eq!(merged.cell(0, "review"), Some(&Cell::from("expert")));
    }

    #[test]
    fn merge_labels_other_significance_zero() {
        let annotation = annotation_table(&[
            ("1", 100, "A", "T", "HGNC", "missense"),
            ("2", 200, "G", "C", "HGNC", "synonymous"),
        ]);
        let clinical = clinical_table(&[
            ("1", 100, "A", "T", "B", "single"),
            ("2", 200, "G", "C", "VUS", "single"),
        ]);
        let merged = AnnotationMerger::new().merge(&annotation, &clinical).unwrap();
        assert_eq!(labels(&merged), vec![0, 0]);
    }

    #[test]
    fn merge_drops_non_hgnc_rows() {
        let annotation = annotation_table(&[("1", 100, "A", "T", "RefSeq", "missense")]);
        let clinical = clinical_table(&[("1", 100, "A", "T", "LP", "expert")]);
        let merged = AnnotationMerger::new().merge(&annotation, &clinical).unwrap();
        assert!(merged.is_empty());
        assert!(merged.schema().index_of(BINARIZED_LABEL).is_some());
    }

    #[test]
    fn merge_collapses_identical_annotation_rows() {
        let annotation = annotation_table(&[
            ("1", 100, "A", "T", "HGNC", "missense"),
            ("1", 100, "A", "T", "HGNC", "missense"),
            ("1", 100, "A", "T", "HGNC", "splice"),
        ]);
        let clinical = clinical_table(&[("1", 100, "A", "T", "LP", "expert")]);
        let merged = AnnotationMerger::new().merge(&annotation, &clinical).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.cell(0, "%Consequence"), Some(&Cell::from("missense")));
        assert_eq!(merged.cell(1, "%Consequence"), Some(&Cell::from("splice")));
    }

    #[test]
    fn merge_expands_duplicate_keys() {
        let annotation = annotation_table(&[
            ("1", 100, "A", "T", "HGNC", "missense"),
            ("1", 100, "A", "T", "HGNC", "splice"),
        ]);
        let clinical = clinical_table(&[
            ("1", 100, "A", "T", "LP", "first"),
            ("1", 100, "A", "T", "B", "second"),
        ]);
        let merged = AnnotationMerger::new().merge(&annotation, &clinical).unwrap();
        assert_eq!(merged.len(), 4);
        assert_eq!(labels(&merged), vec![1, 0, 1, 0]);
        let reviews: Vec<String> = (0..4)
            .map(|i| merged.cell(i, "review").unwrap().to_string())
            .collect();
        assert_eq!(reviews, vec!["first", "second", "first", "second"]);
    }

    #[test]
    fn merge_requires_all_key_fields_to_match() {
        let annotation = annotation_table(&[
            ("1", 100, "A", "T", "HGNC", "a"),
            ("1", 100, "A", "G", "HGNC", "b"),
            ("1", 101, "A", "T", "HGNC", "c"),
            ("2", 100, "A", "T", "HGNC", "d"),
        ]);
        let clinical = clinical_table(&[("1", 100, "A", "T", "LP", "x")]);
        let merged = AnnotationMerger::new().merge(&annotation, &clinical).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.cell(0, "%Consequence"), Some(&Cell::from("a")));
    }

    #[test]
    fn merge_keys_on_string_rendering_across_types() {
        let annotation = annotation_table(&[("1", 100, "A", "T", "HGNC", "missense")]);
        let schema = Schema::new(vec![
            Column::integer("#CHROM"),
            Column::text("POS"),
            Column::text("REF"),
            Column::text("ALT"),
            Column::text("clinsig"),
        ])
        .unwrap();
        let clinical = VariantTable::from_rows(
            schema,
            vec![Row::new(vec![
                Cell::Integer(1),
                "100".into(),
                "A".into(),
                "T".into(),
                "LP".into(),
            ])],
        )
        .unwrap();
        let merged = AnnotationMerger::new().merge(&annotation, &clinical).unwrap();
        assert_eq!(labels(&merged), vec![1]);
    }

    #[test]
    fn merge_leaves_inputs_untouched() {
        let annotation = annotation_table(&[
            ("1", 100, "A", "T", "HGNC", "missense"),
            ("1", 100, "A", "T", "HGNC", "missense"),
            ("1", 100, "A", "T", "RefSeq", "missense"),
        ]);
        let clinical = clinical_table(&[("1", 100, "A", "T", "LP", "expert")]);
        let annotation_before = annotation.clone();
        let clinical_before = clinical.clone();
        AnnotationMerger::new().merge(&annotation, &clinical).unwrap();
        assert_eq!(annotation, annotation_before);
        assert_eq!(clinical, clinical_before);
    }

    #[test]
    fn merge_suffixes_colliding_columns() {
        let annotation_schema = Schema::new(vec![
            Column::text("%CHROM"),
            Column::integer("%POS"),
            Column::text("%REF"),
            Column::text("%ALT"),
            Column::text("%SYMBOL_SOURCE"),
            Column::text("stars"),
        ])
        .unwrap();
        let annotation = VariantTable::from_rows(
            annotation_schema,
            vec![Row::new(vec![
                "1".into(),
                Cell::Integer(100),
                "A".into(),
                "T".into(),
                "HGNC".into(),
                "vep".into(),
            ])],
        )
        .unwrap();
        let clinical_schema = Schema::new(vec![
            Column::text("#CHROM"),
            Column::integer("POS"),
            Column::text("REF"),
            Column::text("ALT"),
            Column::text("clinsig"),
            Column::text("stars"),
        ])
        .unwrap();
        let clinical = VariantTable::from_rows(
            clinical_schema,
            vec![Row::new(vec![
                "1".into(),
                Cell::Integer(100),
                "A".into(),
                "T".into(),
                "LP".into(),
                "3".into(),
            ])],
        )
        .unwrap();
        let merged = AnnotationMerger::new().merge(&annotation, &clinical).unwrap();
        assert_eq!(merged.cell(0, "stars_x"), Some(&Cell::from("vep")));
        assert_eq!(merged.cell(0, "stars_y"), Some(&Cell::from("3")));
        assert!(merged.schema().index_of("stars").is_none());
    }

    #[test]
    fn merge_fails_on_missing_required_columns() {
        let annotation = annotation_table(&[("1", 100, "A", "T", "HGNC", "missense")]);
        let schema = Schema::new(vec![
            Column::text("#CHROM"),
            Column::integer("POS"),
            Column::text("REF"),
            Column::text("ALT"),
        ])
        .unwrap();
        let clinical = VariantTable::new(schema);
        let result = AnnotationMerger::new().merge(&annotation, &clinical);
        assert!(matches!(result, Err(VarlabelError::Schema { .. })));

        let schema = Schema::new(vec![Column::text("%CHROM"), Column::integer("%POS")]).unwrap();
        let annotation = VariantTable::new(schema);
        let clinical = clinical_table(&[]);
        let result = AnnotationMerger::new().merge(&annotation, &clinical);
        assert!(matches!(result, Err(VarlabelError::Schema { .. })));
    }

    #[test]
    fn composite_key_joins_with_underscore() {
        let table = clinical_table(&[("X", 1234, "AC", "A", "B", "r")]);
        let row = table.row(0).unwrap();
        let positions = KeyColumns::CLINICAL.resolve(table.schema()).unwrap();
        assert_eq!(composite_key(row, &positions), "X_1234_AC_A");
    }
}
