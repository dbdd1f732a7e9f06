//! Cell canonicalization shared by the row mapper and by key comparison against stored rows.
//! Both sides must go through the same functions or duplicate detection breaks.

use super::reader::Cell;
use crate::store::FieldValue;

/// Canonical text of a cell: falsy values become "", the rest is trimmed with
/// any trailing ".0" (numeric formatting residue) removed.
pub fn normalize(cell: &Cell) -> String {
    if cell.is_falsy() {
        return String::new();
    }
    normalize_str(&cell.to_text())
}

/// Same rules applied to text that did not come from a spreadsheet cell.
/// Runs to a fixpoint so `normalize_str(normalize_str(x)) == normalize_str(x)`.
pub fn normalize_str(raw: &str) -> String {
    let mut s = raw.trim();
    while let Some(stripped) = s.strip_suffix(".0") {
        s = stripped.trim();
    }
    s.to_string()
}

/// Stored values read back for key comparison. Integer zero is falsy, as for cells.
pub fn normalize_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Int(0) => String::new(),
        FieldValue::Int(i) => i.to_string(),
        FieldValue::Text(s) => normalize_str(s),
    }
}

/// Hazardous-material flag: "0", "1" or "0,1". Affirmatives map to "1", anything else to "0".
pub fn normalize_hazard(cell: &Cell) -> String {
    let s = normalize(cell);
    match s.as_str() {
        "0" | "1" | "0,1" => s,
        _ if matches!(s.to_lowercase().as_str(), "si" | "sí" | "yes") => "1".to_string(),
        _ => "0".to_string(),
    }
}

/// Whole-number fields. Thousands separators are dropped, fractions truncated,
/// and anything unparseable reads as 0.
pub fn parse_integer(cell: &Cell) -> i64 {
    if cell.is_falsy() {
        return 0;
    }
    match cell {
        Cell::Int(i) => *i,
        Cell::Float(f) if f.is_finite() => f.trunc() as i64,
        other => other
            .to_text()
            .replace(',', "")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
            .unwrap_or(0),
    }
}
