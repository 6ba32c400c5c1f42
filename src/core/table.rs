use crate::utils::util::Result;
use std::{collections::HashMap, fmt, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    Integer(i64),
    Text(String),
}

impl Cell {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Cell::Integer(_) => ColumnType::Integer,
            Cell::Text(_) => ColumnType::Text,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(value) => Some(*value),
            Cell::Text(_) => None,
        }
    }

    /// Parses raw text into a cell of the requested column type.
    pub fn parse(raw: &str, column_type: ColumnType) -> Option<Cell> {
        match column_type {
            ColumnType::Integer => parse_canonical_integer(raw).map(Cell::Integer),
            ColumnType::Text => Some(Cell::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

// Only text whose i64 rendering reproduces it exactly counts as an integer,
// so values like "007" or "+5" keep their original spelling on write.
fn parse_canonical_integer(raw: &str) -> Option<i64> {
    let value = raw.parse::<i64>().ok()?;
    (value.to_string() == raw).then_some(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Integer)
    }
}

/// Ordered, uniquely named column set shared by every row of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if index.insert(column.name.clone(), position).is_some() {
                return Err(crate::error::VarlabelError::schema(format!(
                    "Duplicate column name: '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns, index })
    }

    /// Infers column types from raw text rows: a column is `Integer` only when
    /// it has at least one row and every value is a canonical integer.
    pub fn infer(names: &[String], rows: &[Vec<String>]) -> Result<Self> {
        let columns = names
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let all_integer = !rows.is_empty()
                    && rows.iter().all(|row| {
                        row.get(position)
                            .is_some_and(|raw| parse_canonical_integer(raw).is_some())
                    });
                let column_type = if all_integer {
                    ColumnType::Integer
                } else {
                    ColumnType::Text
                };
                Column::new(name.clone(), column_type)
            })
            .collect();
        Self::new(columns)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| {
            crate::error::VarlabelError::schema(format!("Missing required column: '{name}'"))
        })
    }

    fn validate(&self, row: &Row) -> Result<()> {
        if row.len() != self.len() {
            return Err(crate::error::VarlabelError::schema(format!(
                "Row has {} cells but the schema has {} columns",
                row.len(),
                self.len()
            )));
        }
        for (cell, column) in row.cells().iter().zip(&self.columns) {
            if cell.column_type() != column.column_type {
                return Err(crate::error::VarlabelError::schema(format!(
                    "Column '{}' expects {} values, got {} value '{}'",
                    column.name,
                    column.column_type,
                    cell.column_type(),
                    cell
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, position: usize) -> Option<&Cell> {
        self.cells.get(position)
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Self::new(cells)
    }
}

/// Rows of typed cells in stored order, all validated against one schema.
///
/// The schema is fixed at construction; [`VariantTable::push`] and
/// [`VariantTable::replace_rows`] re-validate every incoming row against it.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantTable {
    schema: Arc<Schema>,
    rows: Vec<Row>,
}

impl VariantTable {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(schema: Schema, rows: Vec<Row>) -> Result<Self> {
        let mut table = Self::new(schema);
        table.replace_rows(rows)?;
        Ok(table)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn cell(&self, index: usize, column: &str) -> Option<&Cell> {
        let position = self.schema.index_of(column)?;
        self.rows.get(index)?.get(position)
    }

    pub fn push(&mut self, row: Row) -> Result<()> {
        self.schema.validate(&row)?;
        self.rows.push(row);
        Ok(())
    }

    /// Replaces all rows; nothing changes unless every row matches the schema.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        for row in &rows {
            self.schema.validate(row)?;
        }
        self.rows = rows;
        Ok(())
    }

    // Callers must only reorder; the schema is not re-checked.
    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }
}

impl Default for VariantTable {
    fn default() -> Self {
        Self {
            schema: Arc::new(Schema {
                columns: Vec::new(),
                index: HashMap::new(),
            }),
            rows: Vec::new(),
        }
    }
}
