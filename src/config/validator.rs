//! Settings and model validation: identifier safety and catalog consistency.

use crate::config::{Config, ListFilter, ResolvedModel};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("static identifier pattern"))
}

/// Plain (unquoted) SQL identifier, at most 63 bytes as PostgreSQL allows.
pub fn is_identifier(s: &str) -> bool {
    identifier_re().is_match(s)
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if !is_identifier(&config.database.schema) {
        return Err(ConfigError::InvalidSetting {
            key: "DB_SCHEMA",
            reason: format!("'{}' is not a plain SQL identifier", config.database.schema),
        });
    }
    if config.database.max_connections == 0 {
        return Err(ConfigError::InvalidSetting {
            key: "DB_MAX_CONNECTIONS",
            reason: "must be at least 1".into(),
        });
    }
    if config.server.body_limit == 0 {
        return Err(ConfigError::InvalidSetting {
            key: "REQUEST_BODY_LIMIT",
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

pub fn validate_model(model: &ResolvedModel) -> Result<(), ConfigError> {
    let mut paths = HashSet::new();
    for entity in &model.entities {
        if !paths.insert(entity.path_segment.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate path segment: {}",
                entity.path_segment
            )));
        }
        for ident in [&entity.schema_name, &entity.table_name, &entity.pk_column] {
            if !is_identifier(ident) {
                return Err(ConfigError::Validation(format!(
                    "{}: '{}' is not a plain SQL identifier",
                    entity.path_segment, ident
                )));
            }
        }
        if entity.columns.iter().any(|c| c.name == entity.pk_column) {
            return Err(ConfigError::Validation(format!(
                "{}: primary key listed as mutable column",
                entity.path_segment
            )));
        }
        if let Some(filter) = &entity.filter {
            let column = filter.column();
            let exists = column == entity.pk_column || entity.column(column).is_some();
            if !exists {
                return Err(ConfigError::MissingReference {
                    kind: "filter column",
                    id: format!("{}.{}", entity.table_name, column),
                });
            }
            if let ListFilter::Equals { .. } = filter {
                let is_int = entity
                    .column(column)
                    .map(|c| c.kind == crate::config::ColumnKind::Int)
                    .unwrap_or(true);
                if !is_int {
                    return Err(ConfigError::Validation(format!(
                        "{}: exact filter on non-integer column {}",
                        entity.path_segment, column
                    )));
                }
            }
        }
        for dep in &entity.dependents {
            if !is_identifier(&dep.table_name) || !is_identifier(&dep.column) {
                return Err(ConfigError::MissingReference {
                    kind: "dependent reference",
                    id: format!("{}.{}", dep.table_name, dep.column),
                });
            }
        }
    }
    Ok(())
}
