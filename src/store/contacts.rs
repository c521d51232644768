//! Contact CRUD and the create-or-update path.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use uuid::Uuid;

use crate::error::CrmError;
use crate::util::{title_case, valid_name};

use super::fields::MappedFields;
use super::{now_ms, Contact, ContactDB, ContactRecord, UpsertOutcome};

const COLS: &str = "id, name, company, one_liner, role, location, email, phone, \
    tags, notes, met_how, met_date, introduced_by, linkedin, category, \
    created_at, updated_at";

fn row_to_contact(row: &Row) -> rusqlite::Result<Contact> {
    let tags_json: String = row.get(8)?;
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        company: row.get(2)?,
        one_liner: row.get(3)?,
        role: row.get(4)?,
        location: row.get(5)?,
        email: row.get(6)?,
        phone: row.get(7)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        notes: row.get(9)?,
        met_how: row.get(10)?,
        met_date: row.get(11)?,
        introduced_by: row.get(12)?,
        linkedin: row.get(13)?,
        category: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

impl ContactDB {
    pub fn get(&self, id: &str) -> Result<Option<Contact>, CrmError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {COLS} FROM contacts WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], row_to_contact)?;
        Ok(rows.next().transpose()?)
    }

    /// All contacts whose stored (normalized) name equals `name` exactly,
    /// oldest first. Several hits only happen after force-created collisions.
    pub fn find_by_name(&self, name: &str) -> Result<Vec<Contact>, CrmError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLS} FROM contacts WHERE name = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map(params![name], row_to_contact)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Full scan in insertion order. The fuzzy pass needs every name; the
    /// store is bounded by how many contacts one human can accumulate.
    pub fn list_all(&self) -> Result<Vec<Contact>, CrmError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {COLS} FROM contacts ORDER BY rowid"))?;
        let rows = stmt.query_map([], row_to_contact)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count(&self) -> Result<i64, CrmError> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM contacts", [], |r| r.get(0))?)
    }

    /// Create-or-update a candidate record.
    ///
    /// Invalid names (missing, or fewer than two tokens) are rejected before
    /// any query. Unless `force_create`, an exact hit on the normalized name
    /// is updated in place with only the fields the candidate actually
    /// carries. `force_create` always inserts, name collision or not.
    pub fn upsert(
        &self,
        record: &ContactRecord,
        force_create: bool,
    ) -> Result<UpsertOutcome, CrmError> {
        let Some(raw_name) = record
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return Ok(UpsertOutcome::Skipped {
                reason: "record has no name".into(),
            });
        };
        if !valid_name(raw_name) {
            return Ok(UpsertOutcome::Skipped {
                reason: format!("'{raw_name}' needs both first and last name"),
            });
        }

        let name = title_case(raw_name);
        let mapped = MappedFields::from_record(record);

        if !force_create {
            if let Some(existing) = self.find_by_name(&name)?.into_iter().next() {
                self.update_row(&existing.id, &mapped)?;
                return Ok(UpsertOutcome::Updated { name });
            }
        }

        self.insert_row(&name, &mapped)?;
        Ok(UpsertOutcome::Created { name })
    }

    fn insert_row(&self, name: &str, mapped: &MappedFields) -> Result<(), CrmError> {
        let conn = self.conn()?;
        let now = now_ms();
        let id = Uuid::new_v4().to_string();

        let mut cols = vec!["id", "name", "created_at", "updated_at"];
        let mut vals: Vec<Value> = vec![
            Value::Text(id),
            Value::Text(name.to_string()),
            Value::Integer(now),
            Value::Integer(now),
        ];
        for (col, val) in mapped.column_values() {
            if let Some(v) = val {
                cols.push(col);
                vals.push(Value::Text(v));
            }
        }
        let placeholders = (1..=vals.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO contacts ({}) VALUES ({placeholders})",
            cols.join(", ")
        );
        conn.execute(&sql, params_from_iter(vals))?;
        Ok(())
    }

    /// Partial update: only provided fields are touched, existing data is
    /// never nulled out.
    fn update_row(&self, id: &str, mapped: &MappedFields) -> Result<(), CrmError> {
        let conn = self.conn()?;
        let mut sql = String::from("UPDATE contacts SET updated_at = ?1");
        let mut vals: Vec<Value> = vec![Value::Integer(now_ms())];
        for (col, val) in mapped.column_values() {
            if let Some(v) = val {
                vals.push(Value::Text(v));
                sql.push_str(&format!(", {col} = ?{}", vals.len()));
            }
        }
        vals.push(Value::Text(id.to_string()));
        sql.push_str(&format!(" WHERE id = ?{}", vals.len()));
        conn.execute(&sql, params_from_iter(vals))?;
        Ok(())
    }
}
