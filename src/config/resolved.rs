//! Resolved resource model: catalog tables qualified with the configured schema, ready for runtime use.

use std::collections::HashMap;

/// Storage kind of a column; drives request validation, bind casts and read-back conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Text,
    Float,
    Date,
}

impl ColumnKind {
    /// PostgreSQL type used for placeholder casts.
    pub fn pg_type(self) -> &'static str {
        match self {
            ColumnKind::Int => "integer",
            ColumnKind::Text => "text",
            ColumnKind::Float => "numeric",
            ColumnKind::Date => "date",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: &'static [Operation] = &[
        Operation::Read,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];
    pub const READ_ONLY: &'static [Operation] = &[Operation::Read];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Query-string filter accepted by a resource's list operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListFilter {
    /// Case-insensitive substring match of `param` against `column`.
    Contains { param: String, column: String },
    /// Exact integer match of `param` against a parent key `column`.
    Equals { param: String, column: String },
}

impl ListFilter {
    pub fn param(&self) -> &str {
        match self {
            ListFilter::Contains { param, .. } | ListFilter::Equals { param, .. } => param,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            ListFilter::Contains { column, .. } | ListFilter::Equals { column, .. } => column,
        }
    }
}

/// A nullable reference in another table that is cleared before a row is deleted.
#[derive(Clone, Debug)]
pub struct DependentReference {
    pub schema_name: String,
    pub table_name: String,
    pub column: String,
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub required: bool,
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub schema_name: String,
    pub table_name: String,
    pub path_segment: String,
    pub pk_column: String,
    /// Mutable columns in wire order; the primary key is not included.
    pub columns: Vec<ColumnInfo>,
    pub operations: Vec<Operation>,
    pub filter: Option<ListFilter>,
    pub dependents: Vec<DependentReference>,
    pub not_found_message: String,
}

impl ResolvedEntity {
    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub entities: Vec<ResolvedEntity>,
    pub entity_by_path: HashMap<String, usize>,
}

impl ResolvedModel {
    pub fn new(entities: Vec<ResolvedEntity>) -> Self {
        let entity_by_path = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.path_segment.clone(), i))
            .collect();
        ResolvedModel {
            entities,
            entity_by_path,
        }
    }

    pub fn entity_by_path(&self, path: &str) -> Option<&ResolvedEntity> {
        self.entity_by_path.get(path).map(|&i| &self.entities[i])
    }
}
