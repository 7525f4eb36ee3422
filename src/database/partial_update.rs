use serde_json::{Map, Value};
use sqlx::{postgres::PgArguments, FromRow};

use crate::database::manager::{DatabaseError, DatabaseManager};

/// Compiled SET clause for a parameterized `UPDATE`.
///
/// `values[i]` belongs to placeholder `$i+1`; trailing fixed parameters (the
/// row key) start at [`PartialUpdate::next_placeholder`].
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub set_clause: String,
    pub values: Vec<Value>,
}

impl PartialUpdate {
    /// Index of the first placeholder after the SET values.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    /// Bind the SET values, in placeholder order, onto a query.
    pub fn bind_to<'q, O>(
        &'q self,
        mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
    {
        for value in &self.values {
            query = bind_value(query, value);
        }
        query
    }
}

/// Turn a sparse field map into `"col"=$1, "col2"=$2` plus the ordered values.
///
/// Keys are looked up in `aliases` (logical name -> column) and fall back to
/// the key itself. Placeholders follow the map's insertion order.
pub fn compile_update(
    fields: &Map<String, Value>,
    aliases: &[(&str, &str)],
) -> Result<PartialUpdate, DatabaseError> {
    if fields.is_empty() {
        return Err(DatabaseError::InvalidUpdate("No data".to_string()));
    }

    let mut columns = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());

    for (idx, (key, value)) in fields.iter().enumerate() {
        let column = aliases
            .iter()
            .find(|(logical, _)| *logical == key.as_str())
            .map(|(_, column)| *column)
            .unwrap_or(key.as_str());

        columns.push(format!("{}=${}", DatabaseManager::quote_identifier(column), idx + 1));
        values.push(value.clone());
    }

    Ok(PartialUpdate {
        set_clause: columns.join(", "),
        values,
    })
}

fn bind_value<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()), // JSONB
    }
}
