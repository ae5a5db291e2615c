//! Request validation against the entity's column rules.

use crate::config::{ColumnInfo, ColumnKind, ResolvedEntity};
use crate::error::AppError;
use chrono::NaiveDate;
use serde_json::{Map, Number, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create/replace body and return the full record in column order.
    /// Missing optional columns become null; unknown keys and the primary key are dropped.
    pub fn normalize(body: &Map<String, Value>, entity: &ResolvedEntity) -> Result<Map<String, Value>, AppError> {
        let mut record = Map::with_capacity(entity.columns.len());
        for col in &entity.columns {
            let raw = body.get(&col.name).unwrap_or(&Value::Null);
            let value = normalize_field(col, raw)?;
            record.insert(col.name.clone(), value);
        }
        Ok(record)
    }
}

fn normalize_field(col: &ColumnInfo, v: &Value) -> Result<Value, AppError> {
    if v.is_null() {
        if col.required {
            return Err(AppError::Validation(format!("{} is required", col.name)));
        }
        return Ok(Value::Null);
    }
    match col.kind {
        ColumnKind::Text => {
            let s = v
                .as_str()
                .ok_or_else(|| AppError::Validation(format!("{} must be a string", col.name)))?;
            if col.required && s.trim().is_empty() {
                return Err(AppError::Validation(format!("{} must not be empty", col.name)));
            }
            Ok(Value::String(s.to_string()))
        }
        ColumnKind::Int => {
            let n = match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            let n = n
                .filter(|n| i32::try_from(*n).is_ok())
                .ok_or_else(|| AppError::Validation(format!("{} must be an integer", col.name)))?;
            Ok(Value::Number(n.into()))
        }
        ColumnKind::Float => {
            let f = match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            let n = f
                .and_then(Number::from_f64)
                .ok_or_else(|| AppError::Validation(format!("{} must be a number", col.name)))?;
            Ok(Value::Number(n))
        }
        ColumnKind::Date => {
            let d = v
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
                .ok_or_else(|| AppError::Validation(format!("{} must be a date (YYYY-MM-DD)", col.name)))?;
            Ok(Value::String(d.format("%Y-%m-%d").to_string()))
        }
    }
}
