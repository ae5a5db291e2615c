//! Static table catalog for the construction database and its resolution against settings.

use crate::config::{
    ColumnInfo, ColumnKind, DatabaseSettings, DependentReference, ListFilter, Operation,
    ResolvedEntity, ResolvedModel,
};

struct ColumnDef {
    name: &'static str,
    kind: ColumnKind,
    required: bool,
}

enum FilterDef {
    Contains(&'static str, &'static str),
    Equals(&'static str, &'static str),
}

struct TableDef {
    path_segment: &'static str,
    table: &'static str,
    pk: &'static str,
    columns: &'static [ColumnDef],
    operations: &'static [Operation],
    filter: Option<FilterDef>,
    /// (table, column) pairs nulled out before delete.
    dependents: &'static [(&'static str, &'static str)],
    not_found: &'static str,
}

const fn col(name: &'static str, kind: ColumnKind) -> ColumnDef {
    ColumnDef {
        name,
        kind,
        required: false,
    }
}

const fn required(name: &'static str, kind: ColumnKind) -> ColumnDef {
    ColumnDef {
        name,
        kind,
        required: true,
    }
}

const TABLES: &[TableDef] = &[
    TableDef {
        path_segment: "obras",
        table: "obras",
        pk: "id_obra",
        columns: &[
            required("nombre_obra", ColumnKind::Text),
            col("tipo_obra", ColumnKind::Text),
            col("estado_obra", ColumnKind::Text),
            col("ubicacion_obra", ColumnKind::Text),
        ],
        operations: Operation::ALL,
        filter: Some(FilterDef::Contains("q", "nombre_obra")),
        dependents: &[],
        not_found: "Obra no encontrada",
    },
    TableDef {
        path_segment: "empleados",
        table: "empleados",
        pk: "id_empleado",
        columns: &[
            required("nombre_empleado", ColumnKind::Text),
            col("tipo_empleado", ColumnKind::Text),
            col("salario_fijo_empleado", ColumnKind::Float),
        ],
        operations: Operation::ALL,
        filter: Some(FilterDef::Contains("q", "nombre_empleado")),
        dependents: &[("incidentes", "id_empleado_responsable")],
        not_found: "Empleado no encontrado",
    },
    TableDef {
        path_segment: "materiales",
        table: "materiales",
        pk: "id_material",
        columns: &[
            required("nombre_material", ColumnKind::Text),
            col("unidad_material", ColumnKind::Text),
            col("precio_unitario_material", ColumnKind::Float),
        ],
        operations: Operation::ALL,
        filter: Some(FilterDef::Contains("q", "nombre_material")),
        dependents: &[],
        not_found: "Material no encontrado",
    },
    TableDef {
        path_segment: "proyectos",
        table: "proyectos",
        pk: "id_proyecto",
        columns: &[
            required("id_obra", ColumnKind::Int),
            required("nombre_proyecto", ColumnKind::Text),
            col("fecha_inicio_proyecto", ColumnKind::Date),
            col("fecha_fin_proyecto", ColumnKind::Date),
            col("estado_proyecto", ColumnKind::Text),
        ],
        operations: Operation::ALL,
        filter: Some(FilterDef::Equals("obra_id", "id_obra")),
        dependents: &[],
        not_found: "Proyecto no encontrado",
    },
    TableDef {
        path_segment: "proveedores",
        table: "proveedores",
        pk: "id_proveedor",
        columns: &[
            required("nombre_proveedor", ColumnKind::Text),
            col("contacto_proveedor", ColumnKind::Text),
        ],
        operations: Operation::READ_ONLY,
        filter: Some(FilterDef::Contains("q", "nombre_proveedor")),
        dependents: &[],
        not_found: "Proveedor no encontrado",
    },
];

/// Build the runtime model, qualifying every table with the configured schema.
pub fn resolve(settings: &DatabaseSettings) -> ResolvedModel {
    let schema = settings.schema.as_str();
    let entities = TABLES
        .iter()
        .map(|t| ResolvedEntity {
            schema_name: schema.to_string(),
            table_name: t.table.to_string(),
            path_segment: t.path_segment.to_string(),
            pk_column: t.pk.to_string(),
            columns: t
                .columns
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.to_string(),
                    kind: c.kind,
                    required: c.required,
                })
                .collect(),
            operations: t.operations.to_vec(),
            filter: t.filter.as_ref().map(|f| match *f {
                FilterDef::Contains(param, column) => ListFilter::Contains {
                    param: param.into(),
                    column: column.into(),
                },
                FilterDef::Equals(param, column) => ListFilter::Equals {
                    param: param.into(),
                    column: column.into(),
                },
            }),
            dependents: t
                .dependents
                .iter()
                .map(|(table, column)| DependentReference {
                    schema_name: schema.to_string(),
                    table_name: (*table).to_string(),
                    column: (*column).to_string(),
                })
                .collect(),
            not_found_message: t.not_found.to_string(),
        })
        .collect();
    ResolvedModel::new(entities)
}
