//! SQLite output: a single connection, a single reusable prepared statement,
//! writing the `amikodb` table column-for-column per the documented layout.

use std::path::Path;

use rusqlite::Connection;

use crate::error::PipelineError;

const SOURCE: &str = "writer";

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS amikodb (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    auth TEXT,
    atc TEXT,
    substance TEXT,
    regnrs TEXT,
    reserved6 TEXT,
    tindex TEXT,
    application TEXT,
    reserved9 TEXT,
    reserved10 TEXT,
    packInfo TEXT,
    reserved12 TEXT,
    reserved13 TEXT,
    reserved14 TEXT,
    content TEXT,
    reserved16 TEXT,
    packages TEXT
)";

const INSERT_ROW: &str = "
INSERT INTO amikodb (
    title, auth, atc, substance, regnrs,
    reserved6, tindex, application, reserved9, reserved10,
    packInfo, reserved12, reserved13, reserved14,
    content, reserved16, packages
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";

/// One medicine row, already assembled by the pipeline driver.
pub struct MedicineRow<'a> {
    pub title: &'a str,
    pub auth: &'a str,
    pub atc: &'a str,
    pub substance: &'a str,
    pub regnrs: &'a str,
    pub tindex: &'a str,
    pub application: &'a str,
    pub pack_info: &'a str,
    pub content: &'a str,
    pub packages: &'a str,
}

/// Owns the single output connection and its reused prepared statement.
/// The statement is finalised and the connection closed on drop, including
/// on an early error return from the pipeline driver.
pub struct Writer {
    conn: Connection,
}

impl Writer {
    pub fn create(path: &Path) -> Result<Self, PipelineError> {
        let conn = Connection::open(path)
            .map_err(|e| PipelineError::input_missing(path, std::io::Error::other(e.to_string())))?;
        conn.execute_batch(CREATE_TABLE)
            .map_err(|e| PipelineError::parse_fatal(SOURCE, e.to_string()))?;
        Ok(Self { conn })
    }

    /// Writes one row through the connection's cached `INSERT_ROW` statement.
    /// `prepare_cached` compiles the statement once and reuses it for every
    /// subsequent call with the same SQL text, giving the single
    /// prepared-statement discipline without a self-referential borrow.
    pub fn write_row(&self, row: &MedicineRow) -> Result<(), PipelineError> {
        let mut statement = self
            .conn
            .prepare_cached(INSERT_ROW)
            .map_err(|e| PipelineError::parse_fatal(SOURCE, e.to_string()))?;

        statement
            .execute(rusqlite::params![
                row.title,
                row.auth,
                row.atc,
                row.substance,
                row.regnrs,
                "",
                row.tindex,
                row.application,
                "",
                "",
                row.pack_info,
                "",
                "",
                "",
                row.content,
                "",
                row.packages,
            ])
            .map_err(|e| PipelineError::parse_element(SOURCE, e.to_string()))?;

        Ok(())
    }

    /// Writes every row in `rows`, each through the same cached statement.
    pub fn write_all<'a>(&self, rows: impl Iterator<Item = MedicineRow<'a>>) -> Result<usize, PipelineError> {
        let mut written = 0usize;
        for row in rows {
            self.write_row(&row)?;
            written += 1;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_table_and_writes_rows() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = Writer::create(file.path()).unwrap();

        let rows = vec![MedicineRow {
            title: "Dafalgan",
            auth: "ACME AG",
            atc: "N02BE01",
            substance: "Paracetamol",
            regnrs: "12345",
            tindex: "01.01",
            application: "Analgesic (Swissmedic);Analgesic (BAG)",
            pack_info: "Dafalgan 500mg",
            content: "<html></html>",
            packages: "|||CHF 0.00|CHF 0.00||||,,,|||255|0",
        }];

        let written = writer.write_all(rows.into_iter()).unwrap();
        assert_eq!(written, 1);

        let count: i64 = writer
            .conn
            .query_row("SELECT COUNT(*) FROM amikodb", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn reopening_an_existing_db_does_not_fail_on_create_table() {
        let file = tempfile::NamedTempFile::new().unwrap();
        Writer::create(file.path()).unwrap();
        Writer::create(file.path()).unwrap();
    }
}
