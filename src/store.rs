//! SQLite-backed profile store.
//!
//! One table, `profiles`, whose option columns are exactly the
//! [`ProfileField`] columns. Statements are assembled only from
//! [`ProfileField::column`] names; every value is bound as a parameter.

use crate::error::Result;
use crate::profile::{normalize_updates, ClickOptions, FieldUpdate, FieldValue, Profile, ProfileField};
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS profiles (
        id INTEGER PRIMARY KEY,
        title TEXT,
        mouseButtonInput TEXT,
        delayCheckbox INTEGER,
        delayAmount INTEGER,
        typeInput TEXT,
        repeatSetTimesInput INTEGER,
        repeatTimes INTEGER,
        alwaysOnTopCheckbox INTEGER,
        loopInput INTEGER,
        hoursInput INTEGER,
        minutesInput INTEGER,
        secondsInput INTEGER,
        millisecondsInput INTEGER
    );
";

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FieldValue::Bool(b) => b.to_sql(),
            FieldValue::Integer(n) => n.to_sql(),
            FieldValue::Text(s) => s.to_sql(),
        }
    }
}

pub struct ProfileStore {
    conn: Connection,
}

impl ProfileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// All profiles in rowid order.
    pub fn list(&self) -> Result<Vec<Profile>> {
        let columns: Vec<&str> = ProfileField::ALL.iter().map(|f| f.column()).collect();
        let sql = format!("SELECT id, title, {} FROM profiles ORDER BY id", columns.join(", "));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], profile_from_row)?;
        let profiles = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(profiles)
    }

    /// Inserts a profile and returns its new id.
    pub fn insert(&self, title: &str, fields: &[FieldUpdate]) -> Result<i64> {
        let fields = normalize_updates(fields)?;

        let mut columns = vec!["title"];
        columns.extend(fields.iter().map(|(f, _)| f.column()));
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO profiles ({}) VALUES ({})",
            columns.join(", "),
            placeholders
        );

        let title = FieldValue::Text(title.to_string());
        let values = std::iter::once(&title).chain(fields.iter().map(|(_, v)| v));
        self.conn.execute(&sql, params_from_iter(values))?;

        let id = self.conn.last_insert_rowid();
        debug!(id, "Profile added");
        Ok(id)
    }

    /// Replaces the title and the named fields of a profile.
    ///
    /// Returns whether a row with `id` existed.
    pub fn update(&self, id: i64, title: &str, fields: &[FieldUpdate]) -> Result<bool> {
        let fields = normalize_updates(fields)?;

        let mut assignments: Vec<String> =
            fields.iter().map(|(f, _)| format!("{} = ?", f.column())).collect();
        assignments.push("title = ?".to_string());
        let sql = format!("UPDATE profiles SET {} WHERE id = ?", assignments.join(", "));

        let title = FieldValue::Text(title.to_string());
        let id_value = FieldValue::Integer(id);
        let values = fields
            .iter()
            .map(|(_, v)| v)
            .chain([&title, &id_value]);
        let changed = self.conn.execute(&sql, params_from_iter(values))?;

        debug!(id, changed, "Profile updated");
        Ok(changed > 0)
    }

    /// Deletes a profile. Returns `true` iff a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM profiles WHERE id = ?", [id])?;
        Ok(changed > 0)
    }
}

/// Maps a row; NULL or unparseable columns fall back to the defaults.
fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let mut options = ClickOptions::default();

    for (i, field) in ProfileField::ALL.iter().enumerate() {
        let value = match row.get_ref(i + 2)? {
            ValueRef::Integer(n) => FieldValue::Integer(n),
            ValueRef::Real(f) => FieldValue::Integer(f as i64),
            ValueRef::Text(t) => FieldValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Null | ValueRef::Blob(_) => continue,
        };
        if let Err(e) = options.set_raw(*field, &value) {
            debug!("Ignoring stored {} value: {}", field, e);
        }
    }

    Ok(Profile {
        id: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        options,
    })
}
