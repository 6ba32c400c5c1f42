use crate::{
    constants::{FIELD_SEPARATOR, HEADER_MARKER},
    core::{
        document::{HeaderLine, VcfDocument, VcfHeader},
        table::{Cell, Row, Schema, VariantTable},
    },
    error::VarlabelError,
    io::readers::open_gz_reader,
    utils::util::{expand_home, format_number_with_commas, Result},
};
use std::{io::BufRead, path::Path};

fn trim_line_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

fn split_fields(line: &str) -> Vec<String> {
    trim_line_terminator(line)
        .split(FIELD_SEPARATOR)
        .map(str::to_string)
        .collect()
}

/// Reads a gzip-compressed, tab-separated variant file into a [`VcfDocument`].
///
/// Leading `##` lines become the header verbatim; the first other line names
/// the columns and every later line is a row. Blank lines are skipped unless
/// the table has a single column, where they hold an empty value.
pub struct VcfReader;

impl VcfReader {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<VcfDocument> {
        let path = expand_home(path);
        log::trace!("Start loading {:?}", &path);
        let reader = open_gz_reader(&path)?;
        let document = Self::from_reader(reader)
            .map_err(|e| annotate_with_path(e, &path))?;
        log::debug!(
            "Loaded {}: {} header lines, {} columns, {} rows",
            path.display(),
            document.header().len(),
            document.table().schema().len(),
            format_number_with_commas(document.table().len())
        );
        Ok(document)
    }

    /// Parses an already decompressed stream.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<VcfDocument> {
        let mut header = VcfHeader::new();
        let mut line = String::new();
        let mut line_number = 0usize;

        let column_names = loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(VarlabelError::parse(
                    "Missing column header row after metadata lines",
                ));
            }
            line_number += 1;
            if line.starts_with(HEADER_MARKER) {
                header.push(HeaderLine::new(line.as_str())?);
            } else {
                break split_fields(&line);
            }
        };

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_number += 1;
            if trim_line_terminator(&line).is_empty() && column_names.len() != 1 {
                continue;
            }
            let fields = split_fields(&line);
            if fields.len() != column_names.len() {
                return Err(VarlabelError::parse(format!(
                    "Expected {} fields at line {}, found {}",
                    column_names.len(),
                    line_number,
                    fields.len()
                )));
            }
            raw_rows.push(fields);
        }

        let schema = Schema::infer(&column_names, &raw_rows)?;
        let rows = raw_rows
            .into_iter()
            .map(|fields| to_row(&schema, fields))
            .collect::<Result<Vec<Row>>>()?;
        let table = VariantTable::from_rows(schema, rows)?;
        Ok(VcfDocument::from_parts(header, table))
    }
}

fn to_row(schema: &Schema, fields: Vec<String>) -> Result<Row> {
    fields
        .into_iter()
        .zip(schema.columns())
        .map(|(raw, column)| {
            Cell::parse(&raw, column.column_type).ok_or_else(|| {
                VarlabelError::parse(format!(
                    "Value '{raw}' does not fit {} column '{}'",
                    column.column_type, column.name
                ))
            })
        })
        .collect::<Result<Vec<Cell>>>()
        .map(Row::new)
}

fn annotate_with_path(error: VarlabelError, path: &Path) -> VarlabelError {
    match error {
        VarlabelError::Parse { message } => VarlabelError::parse(format!(
            "{}: {message}",
            path.display()
        )),
        VarlabelError::Schema { message } => VarlabelError::schema(format!(
            "{}: {message}",
            path.display()
        )),
        other => other,
    }
}
