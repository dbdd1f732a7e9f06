use std::fs;
use std::path::Path;

use tracing::warn;

use crate::catalog::export_csv::export_catalog_csv;
use crate::catalog::lookup::{colonias_by_zip, display_name, list_catalogs, name_search};
use crate::catalog::{clear_catalog, find_catalog, import_catalog, CatalogDefinition, ImportOptions};
use crate::config::Config;
use crate::data::registry::update_registry_file;
use crate::store::{CatalogStore, JsonFileStore};

const USAGE: &str = "usage: sat-catalogs <import|clear|catalogs|search|colonias|export>";
const VALUE_FLAGS: &[&str] = &["--sheet", "--start-row", "--limit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Import,
    Clear,
    Catalogs,
    Search,
    Colonias,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("import") => Some(Command::Import),
        Some("clear") => Some(Command::Clear),
        Some("catalogs") => Some(Command::Catalogs),
        Some("search") => Some(Command::Search),
        Some("colonias") => Some(Command::Colonias),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 1;
        }
    };
    match command {
        Command::Import => handle_import(args, &config),
        Command::Clear => handle_clear(args, &config),
        Command::Catalogs => handle_catalogs(),
        Command::Search => handle_search(args, &config),
        Command::Colonias => handle_colonias(args, &config),
        Command::Export => handle_export(args, &config),
    }
}

fn handle_import(args: &[String], config: &Config) -> i32 {
    let positional = positionals(args);
    let (Some(catalog_id), Some(path)) = (positional.first(), positional.get(1)) else {
        eprintln!(
            "usage: sat-catalogs import <catalog> <file.xlsx|file.xls> [--sheet N] [--start-row N] [--json]"
        );
        return 2;
    };
    let options = match import_options(args, config.import) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("{msg}");
            return 2;
        }
    };
    let as_json = args.iter().any(|arg| arg == "--json");

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to read '{path}': {err}");
            return 1;
        }
    };
    let Some(mut store) = open_store(config) else {
        return 1;
    };

    let result = match import_catalog(&mut store, catalog_id, &bytes, options) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("import failed: {err}");
            return 1;
        }
    };

    if let Some(def) = find_catalog(catalog_id) {
        refresh_registry(&store, config, def, &source_name(path));
    }

    if as_json {
        match serde_json::to_string_pretty(&result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize import result: {err}");
                return 1;
            }
        }
    } else {
        println!(
            "import complete: processed={}, created={}, existing={}",
            result.processed, result.created, result.existing
        );
    }
    0
}

fn handle_clear(args: &[String], config: &Config) -> i32 {
    let Some(catalog_id) = positionals(args).first().copied() else {
        eprintln!("usage: sat-catalogs clear <catalog>");
        return 2;
    };
    let Some(mut store) = open_store(config) else {
        return 1;
    };
    match clear_catalog(&mut store, catalog_id) {
        Ok(removed) => {
            if let Some(def) = find_catalog(catalog_id) {
                refresh_registry(&store, config, def, "");
                println!("cleared {removed} record(s) from {}", def.storage_target);
            }
            0
        }
        Err(err) => {
            eprintln!("clear failed: {err}");
            1
        }
    }
}

fn handle_catalogs() -> i32 {
    for (catalog_id, label, target) in list_catalogs() {
        println!("{catalog_id}\t{target}\t{label}");
    }
    0
}

fn handle_search(args: &[String], config: &Config) -> i32 {
    let positional = positionals(args);
    let Some(catalog_id) = positional.first() else {
        eprintln!("usage: sat-catalogs search <catalog> <term> [--limit N]");
        return 2;
    };
    let term = positional.get(1).copied().unwrap_or("");
    let limit = match flag_value(args, "--limit") {
        Ok(limit) => limit,
        Err(msg) => {
            eprintln!("{msg}");
            return 2;
        }
    };
    let Some(def) = known_catalog(catalog_id) else {
        return 1;
    };
    let Some(store) = open_store(config) else {
        return 1;
    };
    match name_search(&store, def, term, limit) {
        Ok(hits) => {
            for (_, name) in hits {
                println!("{name}");
            }
            0
        }
        Err(err) => {
            eprintln!("search failed: {err}");
            1
        }
    }
}

fn handle_colonias(args: &[String], config: &Config) -> i32 {
    let Some(zip_code) = positionals(args).first().copied() else {
        eprintln!("usage: sat-catalogs colonias <zip>");
        return 2;
    };
    let (Some(def), Some(store)) = (known_catalog("colonia"), open_store(config)) else {
        return 1;
    };
    match colonias_by_zip(&store, zip_code) {
        Ok(records) => {
            for record in &records {
                println!("{}", display_name(def, record));
            }
            0
        }
        Err(err) => {
            eprintln!("lookup failed: {err}");
            1
        }
    }
}

fn handle_export(args: &[String], config: &Config) -> i32 {
    let positional = positionals(args);
    let (Some(catalog_id), Some(out_path)) = (positional.first(), positional.get(1)) else {
        eprintln!("usage: sat-catalogs export <catalog> <out.csv>");
        return 2;
    };
    let Some(def) = known_catalog(catalog_id) else {
        return 1;
    };
    let Some(store) = open_store(config) else {
        return 1;
    };
    let file = match fs::File::create(out_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("failed to create '{out_path}': {err}");
            return 1;
        }
    };
    match export_catalog_csv(&store, def, file) {
        Ok(rows) => {
            println!("exported {rows} record(s) to {out_path}");
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn open_store(config: &Config) -> Option<JsonFileStore> {
    match JsonFileStore::open(&config.data_dir) {
        Ok(store) => Some(store),
        Err(err) => {
            eprintln!(
                "failed to open catalog store at {}: {err}",
                config.data_dir.display()
            );
            None
        }
    }
}

fn known_catalog(catalog_id: &str) -> Option<&'static CatalogDefinition> {
    let def = find_catalog(catalog_id);
    if def.is_none() {
        eprintln!("unknown catalog '{catalog_id}' (see `sat-catalogs catalogs`)");
    }
    def
}

/// Provenance is advisory; a failed update is logged and the command still succeeds.
fn refresh_registry(store: &JsonFileStore, config: &Config, def: &CatalogDefinition, source: &str) {
    let count = match store.count(def.storage_target) {
        Ok(count) => count,
        Err(err) => {
            warn!(catalog = def.catalog_id, "could not count records for registry: {err}");
            return;
        }
    };
    if let Err(err) =
        update_registry_file(&config.data_dir, def.catalog_id, def.storage_target, source, count)
    {
        warn!(catalog = def.catalog_id, "registry not updated: {err}");
    }
}

fn source_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Arguments after the command word that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn flag_value(args: &[String], flag: &str) -> Result<Option<usize>, String> {
    let Some(pos) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    let raw = args
        .get(pos + 1)
        .ok_or_else(|| format!("{flag} needs a value"))?;
    raw.parse::<usize>()
        .map(Some)
        .map_err(|_| format!("invalid {flag} '{raw}', expected a non-negative integer"))
}

fn import_options(args: &[String], defaults: ImportOptions) -> Result<ImportOptions, String> {
    let mut options = defaults;
    if let Some(sheet) = flag_value(args, "--sheet")? {
        options.sheet_index = sheet;
    }
    if let Some(start_row) = flag_value(args, "--start-row")? {
        if start_row == 0 {
            return Err("--start-row is 1-based and must be at least 1".to_string());
        }
        options.start_row = start_row;
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["sat", "import"])), Some(Command::Import));
        assert_eq!(parse_command(&args(&["sat", "colonias"])), Some(Command::Colonias));
        assert_eq!(parse_command(&args(&["sat", "serve"])), None);
        assert_eq!(parse_command(&args(&["sat"])), None);
    }

    #[test]
    fn positionals_skip_flags_and_their_values() {
        let argv = args(&["sat", "import", "--sheet", "1", "uom", "--json", "c.xlsx"]);
        assert_eq!(positionals(&argv), vec!["uom", "c.xlsx"]);
    }

    #[test]
    fn import_flags_override_defaults() {
        let argv = args(&["sat", "import", "uom", "c.xlsx", "--start-row", "8"]);
        let options = import_options(&argv, ImportOptions::default()).unwrap();
        assert_eq!(options.start_row, 8);
        assert_eq!(options.sheet_index, 0);

        let zero = args(&["sat", "import", "uom", "c.xlsx", "--start-row", "0"]);
        assert!(import_options(&zero, ImportOptions::default()).is_err());
        let junk = args(&["sat", "import", "uom", "c.xlsx", "--sheet", "two"]);
        assert!(import_options(&junk, ImportOptions::default()).is_err());
    }
}
