//! Tabular input: turns spreadsheet bytes into positional rows of raw cells.
//! The modern zipped-XML reader is tried first, then the legacy BIFF reader.

use std::fmt;
use std::io::Cursor;

use calamine::{Data, Range, Reader, Xls, Xlsx};
use tracing::debug;

use crate::error::ImportError;

/// One raw spreadsheet value, decoupled from the spreadsheet library.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Formula error value such as `#N/A`.
    Error(String),
}

impl Cell {
    /// Empty text, zero, false and blank cells carry no value.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            Self::Int(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::Bool(b) => !b,
            Self::Error(_) => false,
        }
    }

    /// Textual form before normalization. Whole floats render with a ".0" suffix.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.fract() == 0.0 && f.abs() < 1e16 => format!("{f:.1}"),
            Self::Float(f) => f.to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Error(e) => e.clone(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Self::Empty,
            Data::String(s) => Self::Text(s.clone()),
            Data::Int(i) => Self::Int(*i),
            Data::Float(f) => Self::Float(*f),
            Data::Bool(b) => Self::Bool(*b),
            Data::Error(e) => Self::Error(e.to_string()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

pub type RawRow = Vec<Cell>;

/// Rows of one worksheet. `first_row` is the zero-based sheet row of `rows[0]`;
/// every row is padded so index 0 is column A.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRows {
    pub first_row: usize,
    pub rows: Vec<RawRow>,
}

impl SheetRows {
    fn from_range(range: &Range<Data>) -> Self {
        let Some((row0, col0)) = range.start() else {
            return Self::default();
        };
        let rows = range
            .rows()
            .map(|row| {
                let mut cells = vec![Cell::Empty; col0 as usize];
                cells.extend(row.iter().map(Cell::from));
                cells
            })
            .collect();
        Self {
            first_row: row0 as usize,
            rows,
        }
    }

    /// Rows at or after the 1-based `start_row`. `first_row` moves with the cut.
    pub fn starting_at(self, start_row: usize) -> Self {
        let skip = start_row
            .saturating_sub(1)
            .saturating_sub(self.first_row)
            .min(self.rows.len());
        Self {
            first_row: self.first_row + skip,
            rows: self.rows.into_iter().skip(skip).collect(),
        }
    }

    /// 1-based sheet row number of `rows[0]`.
    pub fn first_row_number(&self) -> usize {
        self.first_row + 1
    }
}

/// A spreadsheet container format.
pub trait WorkbookFormat {
    fn label(&self) -> &'static str;

    fn sheet_names(&self, bytes: &[u8]) -> Result<Vec<String>, String>;

    fn load_sheet(&self, bytes: &[u8], sheet_index: usize) -> Result<SheetRows, String>;
}

/// Office Open XML (.xlsx).
#[derive(Debug, Clone, Copy, Default)]
pub struct ModernXlsx;

/// BIFF8 (.xls).
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyXls;

fn sheet_at<'a, R>(bytes: &'a [u8], sheet_index: usize) -> Result<SheetRows, String>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: fmt::Display,
{
    let mut workbook = R::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(sheet_index)
        .ok_or_else(|| format!("workbook has no sheet at index {sheet_index}"))?
        .map_err(|e| e.to_string())?;
    Ok(SheetRows::from_range(&range))
}

fn names_of<'a, R>(bytes: &'a [u8]) -> Result<Vec<String>, String>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: fmt::Display,
{
    let workbook = R::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    Ok(workbook.sheet_names())
}

impl WorkbookFormat for ModernXlsx {
    fn label(&self) -> &'static str {
        "xlsx"
    }

    fn sheet_names(&self, bytes: &[u8]) -> Result<Vec<String>, String> {
        names_of::<Xlsx<Cursor<&[u8]>>>(bytes)
    }

    fn load_sheet(&self, bytes: &[u8], sheet_index: usize) -> Result<SheetRows, String> {
        sheet_at::<Xlsx<Cursor<&[u8]>>>(bytes, sheet_index)
    }
}

impl WorkbookFormat for LegacyXls {
    fn label(&self) -> &'static str {
        "xls"
    }

    fn sheet_names(&self, bytes: &[u8]) -> Result<Vec<String>, String> {
        names_of::<Xls<Cursor<&[u8]>>>(bytes)
    }

    fn load_sheet(&self, bytes: &[u8], sheet_index: usize) -> Result<SheetRows, String> {
        sheet_at::<Xls<Cursor<&[u8]>>>(bytes, sheet_index)
    }
}

/// Runs `op` against the modern format and falls back to the legacy one on any failure.
fn with_fallback<T>(
    op: impl Fn(&dyn WorkbookFormat) -> Result<T, String>,
) -> Result<(T, &'static str), ImportError> {
    let modern = match op(&ModernXlsx) {
        Ok(out) => return Ok((out, ModernXlsx.label())),
        Err(err) => err,
    };
    debug!(error = %modern, "xlsx reader failed, trying xls");
    match op(&LegacyXls) {
        Ok(out) => Ok((out, LegacyXls.label())),
        Err(legacy) => Err(ImportError::UnreadableFile { modern, legacy }),
    }
}

/// Reads the data rows of sheet `sheet_index` (0-based) starting at `start_row` (1-based).
/// When the sheet's used range begins below `start_row`, the rows start there instead.
pub fn read_rows(
    bytes: &[u8],
    sheet_index: usize,
    start_row: usize,
) -> Result<SheetRows, ImportError> {
    if start_row == 0 {
        return Err(ImportError::InvalidOptions(
            "start row is 1-based and must be at least 1".to_string(),
        ));
    }
    let (sheet, format) = with_fallback(|fmt| fmt.load_sheet(bytes, sheet_index))?;
    let rows = sheet.starting_at(start_row);
    debug!(
        format,
        sheet_index,
        first_row = rows.first_row_number(),
        rows = rows.rows.len(),
        "read sheet"
    );
    if rows.rows.is_empty() {
        return Err(ImportError::EmptySheet {
            sheet_index,
            start_row,
        });
    }
    Ok(rows)
}

/// Sheet names, for inspection tooling.
pub fn sheet_names(bytes: &[u8]) -> Result<Vec<String>, ImportError> {
    with_fallback(|fmt| fmt.sheet_names(bytes)).map(|(names, _)| names)
}

/// Every row of a sheet from the top, without the empty-sheet check.
pub fn read_all_rows(bytes: &[u8], sheet_index: usize) -> Result<Vec<RawRow>, ImportError> {
    with_fallback(|fmt| fmt.load_sheet(bytes, sheet_index)).map(|(sheet, _)| sheet.rows)
}
