//! Static registry of the SAT catalogs the importer understands.
//! Column positions and unique keys follow the official c_*.xls layouts.

/// How a column is normalized on import and what it defaults to when the row is short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Hazardous-material flag: "0", "1" or "0,1".
    Hazard,
    /// Whole-number count (e.g. trailer axles); malformed input reads as 0.
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Zero-based source column.
    pub column: usize,
    pub kind: FieldKind,
}

const fn text(name: &'static str, column: usize) -> FieldSpec {
    FieldSpec {
        name,
        column,
        kind: FieldKind::Text,
    }
}

/// Child field whose value must exist as the lookup key of another catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub catalog_id: &'static str,
    pub field: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStyle {
    /// "code - name"
    CodeName,
    /// "code - name" with the name cut to 100 characters.
    CodeShortName,
    /// "code - name (Clase X)" when a class is present.
    CodeNameClass,
    /// "code - municipio (estado)"
    PostalCode,
    /// "[code] name (CP zip)"
    Neighborhood,
    /// "[code] name (estado)"
    CodeNameState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogDefinition {
    pub catalog_id: &'static str,
    pub label: &'static str,
    pub storage_target: &'static str,
    /// Field specs in source column order.
    pub fields: &'static [FieldSpec],
    /// Unique key; the first entry is the lookup field used to prefetch existing rows.
    pub key_fields: &'static [&'static str],
    pub parent: Option<ParentRef>,
    pub search_fields: &'static [&'static str],
    pub order_by: &'static [&'static str],
    pub display: DisplayStyle,
}

impl CatalogDefinition {
    pub fn lookup_field(&self) -> &'static str {
        self.key_fields[0]
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }
}

pub static CATALOGS: &[CatalogDefinition] = &[
    CatalogDefinition {
        catalog_id: "zip",
        label: "Códigos Postales (c_CP)",
        storage_target: "tms.sat.codigo.postal",
        fields: &[
            text("code", 0),
            text("estado", 1),
            text("municipio", 2),
            text("localidad", 3),
        ],
        key_fields: &["code", "estado", "municipio"],
        parent: None,
        search_fields: &["code"],
        order_by: &["code", "estado"],
        display: DisplayStyle::PostalCode,
    },
    CatalogDefinition {
        catalog_id: "localidad",
        label: "Localidades (c_Localidad)",
        storage_target: "tms.sat.localidad",
        fields: &[text("code", 0), text("estado", 1), text("name", 2)],
        key_fields: &["code", "estado"],
        parent: None,
        search_fields: &["name"],
        order_by: &["estado", "name"],
        display: DisplayStyle::CodeNameState,
    },
    CatalogDefinition {
        catalog_id: "municipio",
        label: "Municipios (c_Municipio)",
        storage_target: "tms.sat.municipio",
        fields: &[text("code", 0), text("estado", 1), text("name", 2)],
        key_fields: &["code", "estado"],
        parent: None,
        search_fields: &["name"],
        order_by: &["estado", "name"],
        display: DisplayStyle::CodeNameState,
    },
    CatalogDefinition {
        catalog_id: "colonia",
        label: "Colonias (c_Colonia)",
        storage_target: "tms.sat.colonia",
        fields: &[text("code", 0), text("zip_code", 1), text("name", 2)],
        key_fields: &["code", "zip_code"],
        parent: Some(ParentRef {
            catalog_id: "zip",
            field: "zip_code",
        }),
        search_fields: &["name"],
        order_by: &["zip_code", "name"],
        display: DisplayStyle::Neighborhood,
    },
    CatalogDefinition {
        catalog_id: "prod",
        label: "Productos y Servicios (c_ClaveProdServCP)",
        storage_target: "tms.sat.clave.prod",
        fields: &[
            text("code", 0),
            text("name", 1),
            FieldSpec {
                name: "material_peligroso",
                column: 3,
                kind: FieldKind::Hazard,
            },
        ],
        key_fields: &["code"],
        parent: None,
        search_fields: &["code", "name"],
        order_by: &["code"],
        display: DisplayStyle::CodeShortName,
    },
    CatalogDefinition {
        catalog_id: "uom",
        label: "Unidades de Medida (c_ClaveUnidad)",
        storage_target: "tms.sat.clave.unidad",
        fields: &[text("code", 0), text("name", 1)],
        key_fields: &["code"],
        parent: None,
        search_fields: &["code", "name"],
        order_by: &["code"],
        display: DisplayStyle::CodeName,
    },
    CatalogDefinition {
        catalog_id: "config_auto",
        label: "Config. Autotransporte (c_ConfigAutotransporte)",
        storage_target: "tms.sat.config.autotransporte",
        fields: &[
            text("code", 0),
            text("name", 1),
            FieldSpec {
                name: "numero_ejes_remolque",
                column: 4,
                kind: FieldKind::Integer,
            },
        ],
        key_fields: &["code"],
        parent: None,
        search_fields: &["code"],
        order_by: &["code"],
        display: DisplayStyle::CodeName,
    },
    CatalogDefinition {
        catalog_id: "permiso",
        label: "Tipos Permiso SCT (c_TipoPermiso)",
        storage_target: "tms.sat.tipo.permiso",
        fields: &[
            text("code", 0),
            text("name", 1),
            text("clave_transporte", 2),
        ],
        key_fields: &["code"],
        parent: None,
        search_fields: &["code"],
        order_by: &["code"],
        display: DisplayStyle::CodeName,
    },
    CatalogDefinition {
        catalog_id: "packaging",
        label: "Tipos Embalaje (c_TipoEmbalaje)",
        storage_target: "tms.sat.embalaje",
        fields: &[text("code", 0), text("name", 1)],
        key_fields: &["code"],
        parent: None,
        search_fields: &["code", "name"],
        order_by: &["code"],
        display: DisplayStyle::CodeName,
    },
    CatalogDefinition {
        catalog_id: "material",
        label: "Materiales Peligrosos (c_MaterialPeligroso)",
        storage_target: "tms.sat.material.peligroso",
        fields: &[text("code", 0), text("name", 1), text("clase", 2)],
        key_fields: &["code"],
        parent: None,
        search_fields: &["code", "name", "clase"],
        order_by: &["code"],
        display: DisplayStyle::CodeNameClass,
    },
    CatalogDefinition {
        catalog_id: "figura",
        label: "Figuras Transporte (c_FiguraTransporte)",
        storage_target: "tms.sat.figura.transporte",
        fields: &[text("code", 0), text("name", 1)],
        key_fields: &["code"],
        parent: None,
        search_fields: &["code"],
        order_by: &["code"],
        display: DisplayStyle::CodeName,
    },
];

pub fn find_catalog(catalog_id: &str) -> Option<&'static CatalogDefinition> {
    CATALOGS.iter().find(|def| def.catalog_id == catalog_id)
}
