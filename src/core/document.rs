use crate::{
    constants::HEADER_MARKER, core::table::VariantTable, error::VarlabelError, utils::util::Result,
};
use std::fmt;

/// A `##` metadata line kept verbatim, terminator included.
///
/// The content is opaque: it is only ever stored and replayed, never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine(String);

impl HeaderLine {
    /// Accepts a single physical line: a trailing `\n` or `\r\n` is kept,
    /// any other line break is rejected.
    pub fn new(line: impl Into<String>) -> Result<Self> {
        let mut line = line.into();
        if !line.starts_with(HEADER_MARKER) {
            return Err(VarlabelError::schema(format!(
                "Header lines must start with '{HEADER_MARKER}': {:?}",
                line
            )));
        }
        let body = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(&line);
        if body.contains(['\n', '\r']) {
            return Err(VarlabelError::schema(format!(
                "Header line spans more than one line: {:?}",
                line
            )));
        }
        if !line.ends_with('\n') {
            line.push('\n');
        }
        Ok(Self(line))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for HeaderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcfHeader {
    lines: Vec<HeaderLine>,
}

impl VcfHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: HeaderLine) {
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[HeaderLine] {
        &self.lines
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderLine> {
        self.lines.iter()
    }
}

impl FromIterator<HeaderLine> for VcfHeader {
    fn from_iter<I: IntoIterator<Item = HeaderLine>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

/// The unit of read/write round-tripping: an opaque header plus one table.
///
/// Transforms work through [`VcfDocument::table_mut`] or
/// [`VcfDocument::set_table`]; the header is only ever appended to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VcfDocument {
    header: VcfHeader,
    table: VariantTable,
}

impl VcfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(header: VcfHeader, table: VariantTable) -> Self {
        Self { header, table }
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    pub fn push_header_line(&mut self, line: impl Into<String>) -> Result<()> {
        self.header.push(HeaderLine::new(line)?);
        Ok(())
    }

    pub fn table(&self) -> &VariantTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut VariantTable {
        &mut self.table
    }

    pub fn set_table(&mut self, table: VariantTable) {
        self.table = table;
    }

    pub fn into_parts(self) -> (VcfHeader, VariantTable) {
        (self.header, self.table)
    }
}
