//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a resolved entity.

use crate::config::{ColumnKind, DependentReference, ResolvedEntity};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from the catalog).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

fn entity_table(entity: &ResolvedEntity) -> String {
    qualified_table(&entity.schema_name, &entity.table_name)
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Push a value and return its placeholder cast to `kind`.
    fn push_typed(&mut self, v: Value, kind: ColumnKind) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, kind.pg_type())
    }
}

/// Value of a list filter after query-string parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Contains(String),
    Equals(i64),
}

/// SELECT list: mutable columns in wire order, then the primary key. Numeric columns come back as float8.
fn select_column_list(entity: &ResolvedEntity) -> String {
    let mut cols: Vec<String> = entity
        .columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            match c.kind {
                ColumnKind::Float => format!("{}::float8 AS {}", q, q),
                _ => q,
            }
        })
        .collect();
    cols.push(quoted(&entity.pk_column));
    cols.join(", ")
}

/// Escape LIKE metacharacters and wrap for a "contains" match.
pub fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// SELECT list with optional filter, newest first.
pub fn select_list(entity: &ResolvedEntity, filter: Option<&FilterValue>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = match (filter, entity.filter.as_ref()) {
        (Some(FilterValue::Contains(needle)), Some(def)) => {
            let n = q.push_param(Value::String(contains_pattern(needle)));
            format!(" WHERE {} ILIKE ${}", quoted(def.column()), n)
        }
        (Some(FilterValue::Equals(id)), Some(def)) => {
            let ph = q.push_typed(Value::Number((*id).into()), ColumnKind::Int);
            format!(" WHERE {} = {}", quoted(def.column()), ph)
        }
        _ => String::new(),
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} DESC",
        select_column_list(entity),
        entity_table(entity),
        where_clause,
        quoted(&entity.pk_column)
    );
    q
}

/// SELECT by primary key.
pub fn select_by_id(entity: &ResolvedEntity, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_typed(Value::Number(id.into()), ColumnKind::Int);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(entity),
        entity_table(entity),
        quoted(&entity.pk_column),
        ph
    );
    q
}

/// INSERT every mutable column; the database assigns the primary key.
pub fn insert(entity: &ResolvedEntity, record: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(entity.columns.len());
    let mut placeholders = Vec::with_capacity(entity.columns.len());
    for c in &entity.columns {
        let val = record.get(&c.name).cloned().unwrap_or(Value::Null);
        placeholders.push(q.push_typed(val, c.kind));
        cols.push(quoted(&c.name));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        entity_table(entity),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(entity)
    );
    q
}

/// UPDATE by id: full replace, every mutable column is overwritten (absent means NULL).
pub fn update(entity: &ResolvedEntity, id: i64, record: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(entity.columns.len());
    for c in &entity.columns {
        let val = record.get(&c.name).cloned().unwrap_or(Value::Null);
        let ph = q.push_typed(val, c.kind);
        sets.push(format!("{} = {}", quoted(&c.name), ph));
    }
    let id_ph = q.push_typed(Value::Number(id.into()), ColumnKind::Int);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        entity_table(entity),
        sets.join(", "),
        quoted(&entity.pk_column),
        id_ph,
        select_column_list(entity)
    );
    q
}

/// DELETE by id.
pub fn delete(entity: &ResolvedEntity, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_typed(Value::Number(id.into()), ColumnKind::Int);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        entity_table(entity),
        quoted(&entity.pk_column),
        ph,
        quoted(&entity.pk_column)
    );
    q
}

/// Null out a dependent reference to `id` ahead of a delete.
pub fn clear_reference(dep: &DependentReference, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_typed(Value::Number(id.into()), ColumnKind::Int);
    let col = quoted(&dep.column);
    q.sql = format!(
        "UPDATE {} SET {} = NULL WHERE {} = {}",
        qualified_table(&dep.schema_name, &dep.table_name),
        col,
        col,
        ph
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, Config, ResolvedModel};
    use serde_json::json;

    fn model() -> ResolvedModel {
        let mut cfg = Config::from_lookup(|_| None).unwrap();
        cfg.database.schema = "constructora".into();
        resolve(&cfg.database)
    }

    fn record(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn list_without_filter_orders_newest_first() {
        let m = model();
        let q = select_list(m.entity_by_path("obras").unwrap(), None);
        assert_eq!(
            q.sql,
            "SELECT \"nombre_obra\", \"tipo_obra\", \"estado_obra\", \"ubicacion_obra\", \"id_obra\" \
             FROM \"constructora\".\"obras\" ORDER BY \"id_obra\" DESC"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn list_with_name_filter_uses_ilike() {
        let m = model();
        let filter = FilterValue::Contains("Torre".into());
        let q = select_list(m.entity_by_path("obras").unwrap(), Some(&filter));
        assert!(q.sql.contains("WHERE \"nombre_obra\" ILIKE $1 ORDER BY"));
        assert_eq!(q.params, vec![json!("%Torre%")]);
    }

    #[test]
    fn list_with_parent_filter_is_exact() {
        let m = model();
        let q = select_list(m.entity_by_path("proyectos").unwrap(), Some(&FilterValue::Equals(3)));
        assert!(q.sql.contains("WHERE \"id_obra\" = $1::integer ORDER BY \"id_proyecto\" DESC"));
        assert_eq!(q.params, vec![json!(3)]);
    }

    #[test]
    fn float_columns_read_back_as_float8() {
        let m = model();
        let q = select_list(m.entity_by_path("empleados").unwrap(), None);
        assert!(q
            .sql
            .contains("\"salario_fijo_empleado\"::float8 AS \"salario_fijo_empleado\""));
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn insert_binds_every_column_in_order() {
        let m = model();
        let entity = m.entity_by_path("proyectos").unwrap();
        let q = insert(
            entity,
            &record(json!({"id_obra": 1, "nombre_proyecto": "Cimientos", "fecha_inicio_proyecto": "2024-01-15"})),
        );
        assert_eq!(
            q.sql,
            "INSERT INTO \"constructora\".\"proyectos\" (\"id_obra\", \"nombre_proyecto\", \"fecha_inicio_proyecto\", \
             \"fecha_fin_proyecto\", \"estado_proyecto\") VALUES ($1::integer, $2::text, $3::date, $4::date, $5::text) \
             RETURNING \"id_obra\", \"nombre_proyecto\", \"fecha_inicio_proyecto\", \"fecha_fin_proyecto\", \
             \"estado_proyecto\", \"id_proyecto\""
        );
        assert_eq!(
            q.params,
            vec![json!(1), json!("Cimientos"), json!("2024-01-15"), Value::Null, Value::Null]
        );
    }

    #[test]
    fn update_replaces_all_columns_and_binds_id_last() {
        let m = model();
        let entity = m.entity_by_path("materiales").unwrap();
        let q = update(entity, 9, &record(json!({"nombre_material": "Cemento"})));
        assert_eq!(
            q.sql,
            "UPDATE \"constructora\".\"materiales\" SET \"nombre_material\" = $1::text, \"unidad_material\" = $2::text, \
             \"precio_unitario_material\" = $3::numeric WHERE \"id_material\" = $4::integer RETURNING \"nombre_material\", \
             \"unidad_material\", \"precio_unitario_material\"::float8 AS \"precio_unitario_material\", \"id_material\""
        );
        assert_eq!(q.params, vec![json!("Cemento"), Value::Null, Value::Null, json!(9)]);
    }

    #[test]
    fn delete_and_clear_reference() {
        let m = model();
        let entity = m.entity_by_path("empleados").unwrap();
        let q = delete(entity, 4);
        assert_eq!(
            q.sql,
            "DELETE FROM \"constructora\".\"empleados\" WHERE \"id_empleado\" = $1::integer RETURNING \"id_empleado\""
        );
        let c = clear_reference(&entity.dependents[0], 4);
        assert_eq!(
            c.sql,
            "UPDATE \"constructora\".\"incidentes\" SET \"id_empleado_responsable\" = NULL \
             WHERE \"id_empleado_responsable\" = $1::integer"
        );
        assert_eq!(c.params, vec![json!(4)]);
    }
}
