//! JSON-document tables on top of [`SQLStore`].
//!
//! Every record table has the shape
//! `(id TEXT PRIMARY KEY, data TEXT NOT NULL, created_at TEXT NOT NULL, ...)`:
//! the full record lives as JSON in `data`, and the extra columns are
//! copies of the fields that queries filter on.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::sql::{Row, SQLStore, Value};

/// Handle to one JSON record table.
#[derive(Clone)]
pub struct JsonTable {
    sql: Arc<dyn SQLStore>,
    name: &'static str,
}

impl JsonTable {
    pub fn new(sql: Arc<dyn SQLStore>, name: &'static str) -> Self {
        Self { sql, name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Insert a new record. A duplicate id or unique column yields
    /// [`StoreError::Constraint`].
    pub fn insert<T: Serialize>(
        &self,
        id: &str,
        record: &T,
        columns: &[(&str, Value)],
    ) -> Result<(), StoreError> {
        let mut cols = vec!["id", "data"];
        let mut params = vec![Value::text(id), Value::Text(encode(record)?)];
        for (col, val) in columns {
            cols.push(*col);
            params.push(val.clone());
        }
        let placeholders: Vec<String> = (1..=params.len()).map(|i| format!("?{}", i)).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            cols.join(", "),
            placeholders.join(", "),
        );
        self.sql.exec(&sql, &params)?;
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", self.name);
        let rows = self.sql.query(&sql, &[Value::text(id)])?;
        rows.first().map(decode_row::<T>).transpose()
    }

    /// Overwrite a record. Returns `false` if no row has this id.
    pub fn update<T: Serialize>(
        &self,
        id: &str,
        record: &T,
        columns: &[(&str, Value)],
    ) -> Result<bool, StoreError> {
        let mut sets = vec!["data = ?1".to_string()];
        let mut params = vec![Value::Text(encode(record)?)];
        for (col, val) in columns {
            params.push(val.clone());
            sets.push(format!("{} = ?{}", col, params.len()));
        }
        params.push(Value::text(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            self.name,
            sets.join(", "),
            params.len()
        );
        Ok(self.sql.exec(&sql, &params)? > 0)
    }

    /// Set individual top-level JSON fields in place (plus side columns)
    /// while `guard_column` still holds `guard_value`. Fields not named are
    /// left as stored, so concurrent patches of disjoint fields both land.
    ///
    /// Returns the record as written by this statement, or `None` if the
    /// row is missing or the guard did not hold.
    pub fn patch_if<T: DeserializeOwned>(
        &self,
        id: &str,
        fields: &[(&str, Value)],
        columns: &[(&str, Value)],
        guard_column: &str,
        guard_value: Value,
    ) -> Result<Option<T>, StoreError> {
        if fields.is_empty() && columns.is_empty() {
            return Err(StoreError::InvalidKey("empty patch".into()));
        }

        let mut params = Vec::new();
        let mut sets = Vec::new();
        if !fields.is_empty() {
            let mut args = Vec::new();
            for (field, val) in fields {
                params.push(val.clone());
                args.push(format!("'$.{}', ?{}", field, params.len()));
            }
            sets.push(format!("data = json_set(data, {})", args.join(", ")));
        }
        for (col, val) in columns {
            params.push(val.clone());
            sets.push(format!("{} = ?{}", col, params.len()));
        }

        params.push(Value::text(id));
        let id_idx = params.len();
        params.push(guard_value);
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{} AND {} = ?{} RETURNING data",
            self.name,
            sets.join(", "),
            id_idx,
            guard_column,
            params.len()
        );
        let rows = self.sql.query(&sql, &params)?;
        rows.first().map(decode_row::<T>).transpose()
    }

    /// Returns `false` if no row had this id.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.name);
        Ok(self.sql.exec(&sql, &[Value::text(id)])? > 0)
    }

    /// Records matching all `column = value` filters, oldest first.
    pub fn find<T: DeserializeOwned>(&self, filters: &[(&str, Value)]) -> Result<Vec<T>, StoreError> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        for (col, val) in filters {
            params.push(val.clone());
            clauses.push(format!("{} = ?{}", col, params.len()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT data FROM {}{} ORDER BY created_at ASC, id ASC",
            self.name, where_sql
        );
        self.query(&sql, &params)
    }

    /// The oldest record matching the filters.
    pub fn find_first<T: DeserializeOwned>(
        &self,
        filters: &[(&str, Value)],
    ) -> Result<Option<T>, StoreError> {
        Ok(self.find(filters)?.into_iter().next())
    }

    pub fn count(&self, filters: &[(&str, Value)]) -> Result<u64, StoreError> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        for (col, val) in filters {
            params.push(val.clone());
            clauses.push(format!("{} = ?{}", col, params.len()));
        }
        let mut sql = format!("SELECT COUNT(*) AS cnt FROM {}", self.name);
        if !clauses.is_empty() {
            sql.push_str(&format!(" WHERE {}", clauses.join(" AND ")));
        }
        let rows = self.sql.query(&sql, &params)?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as u64)
    }

    /// Run an arbitrary query whose result set has a `data` column.
    pub fn query<T: DeserializeOwned>(&self, sql: &str, params: &[Value]) -> Result<Vec<T>, StoreError> {
        self.sql.query(sql, params)?.iter().map(decode_row::<T>).collect()
    }
}

fn encode<T: Serialize>(record: &T) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(|e| StoreError::Codec(e.to_string()))
}

fn decode_row<T: DeserializeOwned>(row: &Row) -> Result<T, StoreError> {
    let data = row
        .get_str("data")
        .ok_or_else(|| StoreError::Codec("missing data column".into()))?;
    serde_json::from_str(data).map_err(|e| StoreError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SqliteStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        state: String,
        created_at: String,
    }

    fn table() -> JsonTable {
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        sql.exec_batch(
            "CREATE TABLE items (
                id TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL
            );",
        )
        .unwrap();
        JsonTable::new(sql, "items")
    }

    fn item(id: &str, state: &str, at: &str) -> Item {
        Item {
            id: id.into(),
            state: state.into(),
            created_at: at.into(),
        }
    }

    fn put(t: &JsonTable, it: &Item) {
        t.insert(
            &it.id,
            it,
            &[
                ("state", Value::text(&it.state)),
                ("created_at", Value::text(&it.created_at)),
            ],
        )
        .unwrap();
    }

    #[test]
    fn test_insert_get_delete() {
        let t = table();
        let a = item("a", "PENDING", "2025-01-01T00:00:00Z");
        put(&t, &a);

        assert_eq!(t.get::<Item>("a").unwrap(), Some(a.clone()));
        assert!(t.get::<Item>("missing").unwrap().is_none());

        let dup = t.insert("a", &a, &[
            ("state", Value::text("PENDING")),
            ("created_at", Value::text("x")),
        ]);
        assert!(dup.unwrap_err().is_constraint());

        assert!(t.delete("a").unwrap());
        assert!(!t.delete("a").unwrap());
    }

    #[test]
    fn test_update_overwrites_record() {
        let t = table();
        put(&t, &item("a", "PENDING", "2025-01-01T00:00:00Z"));

        let active = item("a", "ACTIVE", "2025-01-01T00:00:00Z");
        let cols = [("state", Value::text("ACTIVE"))];
        assert!(t.update("a", &active, &cols).unwrap());
        assert!(!t.update("zz", &active, &cols).unwrap());
        assert_eq!(t.get::<Item>("a").unwrap().unwrap().state, "ACTIVE");
    }

    #[test]
    fn test_patch_if_touches_only_named_fields() {
        let t = table();
        put(&t, &item("a", "PENDING", "2025-01-01T00:00:00Z"));

        let patched: Item = t
            .patch_if(
                "a",
                &[("state", Value::text("ACTIVE"))],
                &[("state", Value::text("ACTIVE"))],
                "state",
                Value::text("PENDING"),
            )
            .unwrap()
            .unwrap();
        assert_eq!(patched.state, "ACTIVE");
        assert_eq!(patched.created_at, "2025-01-01T00:00:00Z");
        assert_eq!(t.get::<Item>("a").unwrap().unwrap(), patched);

        let again: Option<Item> = t
            .patch_if(
                "a",
                &[("state", Value::text("REJECTED"))],
                &[("state", Value::text("REJECTED"))],
                "state",
                Value::text("PENDING"),
            )
            .unwrap();
        assert!(again.is_none());
        assert_eq!(t.get::<Item>("a").unwrap().unwrap().state, "ACTIVE");

        let missing: Option<Item> = t
            .patch_if("zz", &[("state", Value::text("ACTIVE"))], &[], "state", Value::text("PENDING"))
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_find_orders_oldest_first() {
        let t = table();
        put(&t, &item("b", "PENDING", "2025-01-02T00:00:00Z"));
        put(&t, &item("a", "PENDING", "2025-01-01T00:00:00Z"));
        put(&t, &item("c", "ACTIVE", "2025-01-03T00:00:00Z"));

        let pending: Vec<Item> = t.find(&[("state", Value::text("PENDING"))]).unwrap();
        let ids: Vec<&str> = pending.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert_eq!(t.count(&[]).unwrap(), 3);
        assert_eq!(t.find_first::<Item>(&[]).unwrap().unwrap().id, "a");
    }
}
