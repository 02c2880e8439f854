use std::fmt;

use crate::error::ArchiverError;

pub const HEADER_ROW: usize = 1;
pub const FIRST_CHECK_ROW: usize = 2;
pub const CHECK_COLUMN: usize = 0;
pub const FIRST_MONTH_COLUMN: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Rows,
    Columns,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Rows => "ROWS",
            Dimension::Columns => "COLUMNS",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabProperties {
    pub id: i64,
    pub title: String,
    pub row_count: usize,
    pub column_count: usize,
}

impl TabProperties {
    pub fn size(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Rows => self.row_count,
            Dimension::Columns => self.column_count,
        }
    }

    pub fn grow(&mut self, dimension: Dimension, count: usize) {
        match dimension {
            Dimension::Rows => self.row_count += count,
            Dimension::Columns => self.column_count += count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub column: usize,
}

impl CellRef {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRef {
    pub start: CellRef,
    pub end_row: Option<usize>,
    pub end_column: Option<usize>,
}

impl RangeRef {
    pub fn column_from(start: CellRef) -> Self {
        Self {
            start,
            end_row: None,
            end_column: Some(start.column),
        }
    }

    pub fn row_from(start: CellRef) -> Self {
        Self {
            start,
            end_row: Some(start.row),
            end_column: None,
        }
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.start.row
            && cell.column >= self.start.column
            && self.end_row.is_none_or(|end| cell.row <= end)
            && self.end_column.is_none_or(|end| cell.column <= end)
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.start)?;
        match (self.end_row, self.end_column) {
            (Some(row), Some(column)) => write!(f, "{}", CellRef::new(row, column)),
            (None, Some(column)) => write!(f, "{}", column_letters(column)),
            (Some(row), None) => write!(f, "{}", row + 1),
            (None, None) => write!(f, "{}", self.start.row + 1),
        }
    }
}

pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = index + 1;
    while remaining > 0 {
        let rem = (remaining - 1) % 26;
        letters.push(b'A' + rem as u8);
        remaining = (remaining - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

pub fn qualified(title: &str, a1: impl fmt::Display) -> String {
    format!("'{}'!{a1}", title.replace('\'', "''"))
}

pub trait SheetsClient: Send + Sync {
    fn find_tab(&self, title: &str) -> Result<Option<TabProperties>, ArchiverError>;
    fn create_tab(&self, title: &str) -> Result<(), ArchiverError>;
    /// Values in `range`, row-major. Trailing blank cells and rows are
    /// omitted, as the Sheets values API does.
    fn read_range(&self, tab: &str, range: RangeRef) -> Result<Vec<Vec<String>>, ArchiverError>;
    fn write_cell(&self, tab: &str, cell: CellRef, value: &str) -> Result<(), ArchiverError>;
    /// Insert one row or column at `index`, shifting later ones.
    fn insert_dimension(
        &self,
        tab_id: i64,
        dimension: Dimension,
        index: usize,
    ) -> Result<(), ArchiverError>;
    fn append_dimension(
        &self,
        tab_id: i64,
        dimension: Dimension,
        count: usize,
    ) -> Result<(), ArchiverError>;
}
