//! SQLite-backed contact store.

mod contacts;
mod fields;

pub use fields::MappedFields;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CrmError;

/// Set busy_timeout on every connection handed out by the pool.
/// Prevents SQLITE_BUSY when several conversations write at once.
#[derive(Debug)]
struct BusyTimeoutCustomizer;
impl r2d2::CustomizeConnection<rusqlite::Connection, rusqlite::Error> for BusyTimeoutCustomizer {
    fn on_acquire(&self, conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(())
    }
}

type PooledConn = r2d2::PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS contacts (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    company       TEXT,
    one_liner     TEXT,
    role          TEXT,
    location      TEXT,
    email         TEXT,
    phone         TEXT,
    tags          TEXT NOT NULL DEFAULT '[]',
    notes         TEXT,
    met_how       TEXT,
    met_date      TEXT,
    introduced_by TEXT,
    linkedin      TEXT,
    category      TEXT,
    created_at    INTEGER NOT NULL,
    updated_at    INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_contacts_name ON contacts(name);
";

/// A candidate record as the extractor produces it: every field optional,
/// serde names matching the human-facing column names the prompt uses.
/// Nothing here is normalized; normalization happens on the way into the
/// store (`fields.rs`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Company/Org", default)]
    pub company: Option<String>,
    #[serde(rename = "One-liner", default)]
    pub one_liner: Option<String>,
    #[serde(rename = "Role/Title", default)]
    pub role: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "Phone", default)]
    pub phone: Option<String>,
    #[serde(rename = "Tags", default, deserialize_with = "one_or_many")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
    #[serde(rename = "Met How/Where", default)]
    pub met_how: Option<String>,
    #[serde(rename = "Met Date", default)]
    pub met_date: Option<String>,
    #[serde(rename = "Introduced By", default)]
    pub introduced_by: Option<String>,
    #[serde(rename = "LinkedIn", default)]
    pub linkedin: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
}

impl ContactRecord {
    /// Fallback record for unparseable extractor output: everything null,
    /// raw text preserved in Notes so the operator sees what came back.
    pub fn fallback(raw: &str) -> Self {
        Self {
            notes: Some(raw.to_string()),
            ..Self::default()
        }
    }
}

/// Models either `"Tags": "VC"` or `"Tags": ["VC", "Deal"]`.
fn one_or_many<'de, D>(de: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(de)? {
        None => None,
        Some(OneOrMany::One(s)) => Some(vec![s]),
        Some(OneOrMany::Many(v)) => Some(v),
    })
}

/// A persisted contact. `name` is always stored in normalized title form.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub one_liner: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub met_how: Option<String>,
    pub met_date: Option<String>,
    pub introduced_by: Option<String>,
    pub linkedin: Option<String>,
    pub category: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Outcome of a single create-or-update attempt, rendered back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created { name: String },
    Updated { name: String },
    Skipped { reason: String },
}

impl UpsertOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Created { name } => format!("Created new entry for {name}."),
            Self::Updated { name } => format!(
                "Found existing entry for {name} in CRM. Updated their record with new information."
            ),
            Self::Skipped { reason } => format!("Skipped: {reason}."),
        }
    }
}

pub struct ContactDB {
    pool: Pool<SqliteConnectionManager>,
}

impl ContactDB {
    pub fn open(path: &str) -> Result<Self, CrmError> {
        let pool_size = if path == ":memory:" { 2 } else { 8 };
        let manager = if path == ":memory:" {
            // Shared cache so all pool connections see the same in-memory DB.
            // Each test gets a unique name to avoid cross-test pollution.
            let name = uuid::Uuid::new_v4().to_string();
            SqliteConnectionManager::file(format!("file:{name}?mode=memory&cache=shared"))
        } else {
            SqliteConnectionManager::file(path)
        };
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_customizer(Box::new(BusyTimeoutCustomizer))
            .build(manager)
            .map_err(|e| CrmError::Internal(format!("pool: {e}")))?;

        let conn = pool.get().map_err(|e| CrmError::Internal(e.to_string()))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConn, CrmError> {
        self.pool.get().map_err(|e| CrmError::Internal(e.to_string()))
    }
}

pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
