use std::collections::HashSet;

use super::mapper::CandidateRecord;
use super::schema::CatalogDefinition;

/// Drops records whose key signature already appeared earlier in the batch. Order is kept.
pub fn dedupe(records: Vec<CandidateRecord>, def: &CatalogDefinition) -> Vec<CandidateRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.key_signature(def)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::find_catalog;
    use crate::store::{FieldValue, RecordValues};

    fn record(pairs: &[(&str, &str)]) -> CandidateRecord {
        let values: RecordValues = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect();
        CandidateRecord { values }
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let def = find_catalog("uom").unwrap();
        let out = dedupe(
            vec![
                record(&[("code", "KGM"), ("name", "first")]),
                record(&[("code", "H87"), ("name", "pieza")]),
                record(&[("code", "KGM"), ("name", "second")]),
            ],
            def,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text("name"), "first");
        assert_eq!(out[1].text("code"), "H87");
    }

    #[test]
    fn composite_keys_differing_in_secondary_field_survive() {
        let def = find_catalog("municipio").unwrap();
        let out = dedupe(
            vec![
                record(&[("code", "001"), ("estado", "AGU")]),
                record(&[("code", "001"), ("estado", "BCN")]),
            ],
            def,
        );
        assert_eq!(out.len(), 2);
    }
}
