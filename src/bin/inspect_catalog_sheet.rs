//! Inspect a SAT catalog workbook (.xlsx or .xls): print sheet names, size and the first rows
//! exactly as the importer's reader sees them.
//! Usage: cargo run --bin inspect_catalog_sheet -- path/to/c_CP.xls [sheet-index]

use std::path::Path;

use sat_catalogs::catalog::reader::{read_all_rows, sheet_names};

const PREVIEW_ROWS: usize = 25;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: inspect_catalog_sheet <path-to.xlsx|xls> [sheet-index]")?;
    let sheet_index = match std::env::args().nth(2) {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| format!("invalid sheet index '{raw}'"))?,
        None => 0,
    };
    let path = Path::new(&path);
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let bytes = std::fs::read(path)?;
    let names = sheet_names(&bytes)?;
    println!("Sheets ({}): {}", names.len(), names.join(", "));
    let sheet_name = names
        .get(sheet_index)
        .ok_or_else(|| format!("sheet index {sheet_index} out of range"))?;
    println!("\nUsing sheet {sheet_index}: {sheet_name}");

    let rows = read_all_rows(&bytes, sheet_index)?;
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    println!(
        "Size: {} rows x {} cols\nFirst {PREVIEW_ROWS} rows:",
        rows.len(),
        width
    );
    for (i, row) in rows.iter().take(PREVIEW_ROWS).enumerate() {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("  {}: {}", i, cells.join(" | "));
    }
    Ok(())
}
