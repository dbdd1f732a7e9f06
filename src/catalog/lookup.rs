//! Read-side helpers over stored catalogs: display names, text search, listings.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::normalize::normalize_str;
use super::schema::{find_catalog, CatalogDefinition, DisplayStyle, CATALOGS};
use crate::error::StoreError;
use crate::store::{CatalogStore, RecordId, StoredRecord};

const PRODUCT_NAME_MAX_CHARS: usize = 100;

pub fn display_name(def: &CatalogDefinition, record: &StoredRecord) -> String {
    let code = record.text("code");
    let name = record.text("name");
    match def.display {
        DisplayStyle::CodeShortName => {
            let short: String = name.chars().take(PRODUCT_NAME_MAX_CHARS).collect();
            format!("{code} - {short}")
        }
        DisplayStyle::CodeName => format!("{code} - {name}"),
        DisplayStyle::CodeNameClass => match record.text("clase") {
            clase if clase.is_empty() => format!("{code} - {name}"),
            clase => format!("{code} - {name} (Clase {clase})"),
        },
        DisplayStyle::PostalCode => format!(
            "{code} - {} ({})",
            record.text("municipio"),
            record.text("estado")
        ),
        DisplayStyle::Neighborhood => {
            format!("[{code}] {name} (CP {})", record.text("zip_code"))
        }
        DisplayStyle::CodeNameState => format!("[{code}] {name} ({})", record.text("estado")),
    }
}

fn compare_by(order_by: &[&str], a: &StoredRecord, b: &StoredRecord) -> Ordering {
    order_by
        .iter()
        .map(|field| a.text(field).cmp(&b.text(field)))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
        .then(a.id.cmp(&b.id))
}

/// All records of a catalog in its default order.
pub fn list_records<S: CatalogStore + ?Sized>(
    store: &S,
    def: &CatalogDefinition,
) -> Result<Vec<StoredRecord>, StoreError> {
    let mut records = store.search_all(def.storage_target)?;
    records.sort_by(|a, b| compare_by(def.order_by, a, b));
    Ok(records)
}

/// Case-insensitive substring search over the catalog's search fields.
/// An empty term matches everything. Returns `(id, display name)` pairs.
pub fn name_search<S: CatalogStore + ?Sized>(
    store: &S,
    def: &CatalogDefinition,
    term: &str,
    limit: Option<usize>,
) -> Result<Vec<(RecordId, String)>, StoreError> {
    let needle = term.trim().to_lowercase();
    let hits = list_records(store, def)?
        .into_iter()
        .filter(|rec| {
            needle.is_empty()
                || def
                    .search_fields
                    .iter()
                    .any(|field| rec.text(field).to_lowercase().contains(&needle))
        })
        .take(limit.unwrap_or(usize::MAX))
        .map(|rec| (rec.id, display_name(def, &rec)))
        .collect();
    Ok(hits)
}

/// `(catalog_id, label, storage_target)` for every registered catalog.
pub fn list_catalogs() -> Vec<(&'static str, &'static str, &'static str)> {
    CATALOGS
        .iter()
        .map(|def| (def.catalog_id, def.label, def.storage_target))
        .collect()
}

/// Neighborhoods registered under a postal code, ordered by name.
pub fn colonias_by_zip<S: CatalogStore + ?Sized>(
    store: &S,
    zip_code: &str,
) -> Result<Vec<StoredRecord>, StoreError> {
    let def = find_catalog("colonia").ok_or_else(|| StoreError::UnknownTarget("colonia".into()))?;
    let wanted = BTreeSet::from([normalize_str(zip_code)]);
    let mut records = store.search_in(def.storage_target, "zip_code", &wanted)?;
    records.sort_by(|a, b| compare_by(&["name"], a, b));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FieldValue, MemoryStore, RecordValues};

    fn values(pairs: &[(&str, &str)]) -> RecordValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect()
    }

    fn stored(pairs: &[(&str, &str)]) -> StoredRecord {
        StoredRecord {
            id: 1,
            values: values(pairs),
        }
    }

    #[test]
    fn display_names_per_style() {
        let zip = find_catalog("zip").unwrap();
        let rec = stored(&[("code", "64000"), ("estado", "NLE"), ("municipio", "Monterrey")]);
        assert_eq!(display_name(zip, &rec), "64000 - Monterrey (NLE)");

        let colonia = find_catalog("colonia").unwrap();
        let rec = stored(&[("code", "0001"), ("name", "Centro"), ("zip_code", "64000")]);
        assert_eq!(display_name(colonia, &rec), "[0001] Centro (CP 64000)");

        let material = find_catalog("material").unwrap();
        let rec = stored(&[("code", "1203"), ("name", "Gasolina"), ("clase", "3")]);
        assert_eq!(display_name(material, &rec), "1203 - Gasolina (Clase 3)");
        let rec = stored(&[("code", "1203"), ("name", "Gasolina"), ("clase", "")]);
        assert_eq!(display_name(material, &rec), "1203 - Gasolina");

        let municipio = find_catalog("municipio").unwrap();
        let rec = stored(&[("code", "001"), ("name", "Aguascalientes"), ("estado", "AGU")]);
        assert_eq!(display_name(municipio, &rec), "[001] Aguascalientes (AGU)");
    }

    #[test]
    fn product_names_are_truncated() {
        let prod = find_catalog("prod").unwrap();
        let long = "x".repeat(150);
        let rec = stored(&[("code", "01010101"), ("name", &long)]);
        assert_eq!(display_name(prod, &rec), format!("01010101 - {}", "x".repeat(100)));
    }

    #[test]
    fn search_matches_any_search_field_case_insensitively() {
        let def = find_catalog("uom").unwrap();
        let mut store = MemoryStore::for_catalogs();
        store
            .create_many(
                def.storage_target,
                vec![
                    values(&[("code", "KGM"), ("name", "Kilogramo")]),
                    values(&[("code", "H87"), ("name", "Pieza")]),
                    values(&[("code", "GRM"), ("name", "Gramo")]),
                ],
            )
            .unwrap();

        let hits = name_search(&store, def, "gramo", None).unwrap();
        let names: Vec<_> = hits.into_iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["GRM - Gramo", "KGM - Kilogramo"]);

        assert_eq!(name_search(&store, def, "h87", None).unwrap().len(), 1);
        assert_eq!(name_search(&store, def, "", Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn catalog_listing_covers_every_definition() {
        let listed = list_catalogs();
        assert_eq!(listed.len(), CATALOGS.len());
        assert!(listed.contains(&("uom", "Unidades de Medida (c_ClaveUnidad)", "tms.sat.clave.unidad")));
    }

    #[test]
    fn colonias_are_listed_by_name_for_a_zip() {
        let def = find_catalog("colonia").unwrap();
        let mut store = MemoryStore::for_catalogs();
        store
            .create_many(
                def.storage_target,
                vec![
                    values(&[("code", "0002"), ("zip_code", "64000"), ("name", "Obispado")]),
                    values(&[("code", "0001"), ("zip_code", "64000"), ("name", "Centro")]),
                    values(&[("code", "0003"), ("zip_code", "64010"), ("name", "Mitras")]),
                ],
            )
            .unwrap();
        let found = colonias_by_zip(&store, " 64000 ").unwrap();
        let names: Vec<_> = found.iter().map(|r| r.text("name")).collect();
        assert_eq!(names, vec!["Centro", "Obispado"]);
    }
}
