use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ErrorCode};

use crate::error::StoreError;

/// A dynamically-typed SQL parameter or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }
}

impl rusqlite::types::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Blob(b) => ToSqlOutput::from(b.as_slice()),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

/// A row returned from a query: column name to value, in select order.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }
}

/// SQL execution interface over an embedded database.
pub trait SQLStore: Send + Sync {
    /// Run a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, StoreError>;

    /// Run an INSERT/UPDATE/DELETE and return the affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, StoreError>;

    /// Run several parameterless statements (schema setup).
    fn exec_batch(&self, sql: &str) -> Result<(), StoreError>;
}

/// SQLStore backed by a single rusqlite connection (bundled SQLite).
///
/// Statements are serialized through the connection mutex, so a single
/// conditional UPDATE is atomic with respect to every other statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(classify)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(classify)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(classify)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").map_err(classify)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Sql(format!("connection lock poisoned: {}", e)))
    }
}

impl SQLStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(classify)?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut rows = stmt.query(params_from_iter(params.iter())).map_err(classify)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(classify)? {
            let mut columns = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let value = row.get_ref(i).map_err(classify)?;
                columns.push((name.clone(), Value::from(value)));
            }
            out.push(Row { columns });
        }
        Ok(out)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        let affected = conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(classify)?;
        Ok(affected as u64)
    }

    fn exec_batch(&self, sql: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(classify)
    }
}

fn classify(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation => {
            StoreError::Constraint(e.to_string())
        }
        _ => StoreError::Sql(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let s = SqliteStore::open_in_memory().unwrap();
        s.exec_batch(
            "CREATE TABLE t (id TEXT PRIMARY KEY, n INTEGER, r REAL, b BLOB, note TEXT);",
        )
        .unwrap();
        s
    }

    #[test]
    fn test_roundtrip_types() {
        let s = store();
        let n = s
            .exec(
                "INSERT INTO t (id, n, r, b, note) VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::text("a"),
                    Value::Integer(7),
                    Value::Real(1200.0),
                    Value::Blob(vec![1, 2]),
                    Value::Null,
                ],
            )
            .unwrap();
        assert_eq!(n, 1);

        let rows = s.query("SELECT * FROM t WHERE id = ?1", &[Value::text("a")]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64("n"), Some(7));
        assert_eq!(rows[0].get("r"), Some(&Value::Real(1200.0)));
        assert_eq!(rows[0].get("b"), Some(&Value::Blob(vec![1, 2])));
        assert_eq!(rows[0].get("note"), Some(&Value::Null));
        assert_eq!(rows[0].get_str("id"), Some("a"));
    }

    #[test]
    fn test_unique_violation_is_constraint() {
        let s = store();
        s.exec("INSERT INTO t (id) VALUES (?1)", &[Value::text("a")]).unwrap();
        let err = s
            .exec("INSERT INTO t (id) VALUES (?1)", &[Value::text("a")])
            .unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_conditional_update_reports_zero_rows() {
        let s = store();
        s.exec("INSERT INTO t (id, note) VALUES ('a', 'PENDING')", &[]).unwrap();
        let first = s
            .exec("UPDATE t SET note = 'ACTIVE' WHERE id = 'a' AND note = 'PENDING'", &[])
            .unwrap();
        let second = s
            .exec("UPDATE t SET note = 'ACTIVE' WHERE id = 'a' AND note = 'PENDING'", &[])
            .unwrap();
        assert_eq!((first, second), (1, 0));
    }
}
