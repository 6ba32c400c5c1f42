use crate::{
    constants::{
        DEFAULT_COMPRESSION_LEVEL, DEFAULT_FILE_MODE, FIELD_SEPARATOR, GZ_SUFFIX, HEADER_MARKER,
    },
    core::{
        document::VcfDocument,
        table::{Cell, VariantTable},
    },
    error::VarlabelError,
    utils::util::{expand_home, format_number_with_commas, with_suffix, Result},
};
use flate2::{write::GzEncoder, Compression};
use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Writes a [`VcfDocument`] as a gzip-compressed, tab-separated file.
///
/// Output goes to a temporary file next to the target that is renamed into
/// place only once the gzip stream is complete.
#[derive(Debug, Clone, Copy)]
pub struct VcfWriter {
    compression: Compression,
}

impl Default for VcfWriter {
    fn default() -> Self {
        Self {
            compression: Compression::new(DEFAULT_COMPRESSION_LEVEL),
        }
    }
}

impl VcfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = Compression::new(level);
        self
    }

    /// Writes `document` to `path` (with `.gz` appended if missing) and returns the final path.
    pub fn write<P: AsRef<Path>>(&self, document: &VcfDocument, path: P) -> Result<PathBuf> {
        Self::check_preconditions(document)?;

        let path = with_suffix(&expand_home(path), GZ_SUFFIX);
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.exists() {
            log::debug!("Writer: Creating output directory {}", parent.display());
            fs::create_dir_all(&parent)?;
        }

        let temp = NamedTempFile::new_in(&parent)?;
        set_output_permissions(&temp, &path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(temp), self.compression);
        for line in document.header().iter() {
            encoder.write_all(line.as_bytes())?;
        }
        write_table(&mut encoder, document.table())?;
        let temp = encoder
            .finish()?
            .into_inner()
            .map_err(|e| VarlabelError::Io(e.into_error()))?;
        temp.persist(&path)?;

        log::debug!(
            "Writer: Wrote {} header lines and {} rows to {}",
            document.header().len(),
            format_number_with_commas(document.table().len()),
            path.display()
        );
        Ok(path)
    }

    fn check_preconditions(document: &VcfDocument) -> Result<()> {
        if document.header().is_empty() {
            return Err(VarlabelError::precondition(
                "Refusing to write a document without header lines",
            ));
        }
        if document.table().is_empty() {
            return Err(VarlabelError::precondition(
                "Refusing to write a document without table rows",
            ));
        }
        check_fields(document.table())
    }
}

fn has_field_break(value: &str) -> bool {
    value.contains([FIELD_SEPARATOR, '\n', '\r'])
}

// Every name and value must come back as the same single field on reread.
fn check_fields(table: &VariantTable) -> Result<()> {
    let schema = table.schema();
    for name in schema.names() {
        if has_field_break(name) {
            return Err(VarlabelError::schema(format!(
                "Column name {name:?} contains a tab or line break"
            )));
        }
    }
    if let Some(first) = schema.names().next() {
        if first.starts_with(HEADER_MARKER) {
            return Err(VarlabelError::schema(format!(
                "First column name {first:?} would be read back as a header line"
            )));
        }
    }
    for (index, row) in table.iter().enumerate() {
        for (cell, name) in row.cells().iter().zip(schema.names()) {
            if let Cell::Text(value) = cell {
                if has_field_break(value) {
                    return Err(VarlabelError::schema(format!(
                        "Value {value:?} in column '{name}' of row {index} contains a tab or line break"
                    )));
                }
            }
        }
    }
    Ok(())
}

// A fresh temp file is private to the owner; give the output the mode an
// existing target already has, or the usual mode for new files.
#[cfg(unix)]
fn set_output_permissions(temp: &NamedTempFile, target: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let permissions = match fs::metadata(target) {
        Ok(metadata) => metadata.permissions(),
        Err(_) => fs::Permissions::from_mode(DEFAULT_FILE_MODE),
    };
    temp.as_file().set_permissions(permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_output_permissions(_temp: &NamedTempFile, _target: &Path) -> Result<()> {
    Ok(())
}

fn write_table<W: Write>(out: &mut W, table: &VariantTable) -> Result<()> {
    let separator = FIELD_SEPARATOR.to_string();
    let names: Vec<&str> = table.schema().names().collect();
    writeln!(out, "{}", names.join(&separator))?;
    for row in table.iter() {
        let fields: Vec<String> = row.cells().iter().map(ToString::to_string).collect();
        writeln!(out, "{}", fields.join(&separator))?;
    }
    Ok(())
}
