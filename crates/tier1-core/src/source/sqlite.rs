use crate::error::Tier1Error;
use crate::model::{GuidelineRecord, Sample, SampleResult, DEFAULT_UNITS};
use crate::parsing::parse_numeric;
use crate::source::{
    require_columns, TableSource, Tables, GUIDELINES_TABLE, GUIDELINE_COLUMNS, RESULTS_TABLE,
    RESULT_COLUMNS, SAMPLES_TABLE, SAMPLE_COLUMNS,
};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use std::path::PathBuf;

/// Reads the three input tables from a SQLite database file.
///
/// The database is opened read-only for the duration of one [`load`](TableSource::load)
/// call and released before it returns, whether the reads succeed or not.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteSource { path: path.into() }
    }
}

impl TableSource for SqliteSource {
    fn load(&self) -> Result<Tables, Tier1Error> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        // On error the connection is dropped (and closed) with this frame.
        let tables = read_tables(&conn)?;
        conn.close().map_err(|(_, e)| e)?;

        log::info!(
            "read {} result(s), {} sample(s), {} guideline(s) from {}",
            tables.results.len(),
            tables.samples.len(),
            tables.guidelines.len(),
            self.path.display()
        );
        Ok(tables)
    }

    fn describe(&self) -> String {
        format!("sqlite database {}", self.path.display())
    }
}

/// Run the three `SELECT *` reads on an open connection.
pub fn read_tables(conn: &Connection) -> Result<Tables, Tier1Error> {
    let results = select_all(conn, RESULTS_TABLE, RESULT_COLUMNS, &[], |row, col, _| {
        Ok(SampleResult::new(
            text(row, col[0])?.unwrap_or_default(),
            text(row, col[1])?.unwrap_or_default(),
            text(row, col[3])?.unwrap_or_default(),
            number(row, col[2])?,
        ))
    })?;

    let samples = select_all(conn, SAMPLES_TABLE, SAMPLE_COLUMNS, &[], |row, col, _| {
        Ok(Sample::new(
            text(row, col[0])?.unwrap_or_default(),
            text(row, col[1])?,
            text(row, col[2])?,
        ))
    })?;

    let guidelines = select_all(
        conn,
        GUIDELINES_TABLE,
        GUIDELINE_COLUMNS,
        &["units", "notes"],
        |row, col, opt| {
            Ok(GuidelineRecord::new(
                text(row, col[0])?.unwrap_or_default(),
                text(row, col[1])?.unwrap_or_default(),
                text(row, col[2])?.unwrap_or_default(),
                text(row, col[3])?.unwrap_or_default(),
                optional_text(row, opt[0])?.unwrap_or_else(|| DEFAULT_UNITS.to_string()),
                optional_text(row, opt[1])?.unwrap_or_default(),
            ))
        },
    )?;

    Ok(Tables {
        results,
        samples,
        guidelines,
    })
}

/// `SELECT *` from `table` and map each row.
///
/// The mapper receives the positions of the `required` columns and of the
/// `optional` ones (`None` when the table lacks them), in the order given.
fn select_all<T, F>(
    conn: &Connection,
    table: &str,
    required: &[&str],
    optional: &[&str],
    mut map: F,
) -> Result<Vec<T>, Tier1Error>
where
    F: FnMut(&Row<'_>, &[usize], &[Option<usize>]) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(&format!("SELECT * FROM {table}"))?;
    require_columns(table, &stmt.column_names(), required)?;

    let col = required
        .iter()
        .map(|name| stmt.column_index(name))
        .collect::<Result<Vec<_>, _>>()?;
    let opt: Vec<Option<usize>> = optional
        .iter()
        .map(|name| stmt.column_index(name).ok())
        .collect();

    let rows = stmt
        .query_map([], |row| map(row, &col, &opt))?
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("{table}: {} row(s)", rows.len());
    Ok(rows)
}

/// Read a column as text; numeric storage is formatted, NULL is `None`.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    })
}

fn optional_text(row: &Row<'_>, idx: Option<usize>) -> rusqlite::Result<Option<String>> {
    match idx {
        Some(idx) => text(row, idx),
        None => Ok(None),
    }
}

/// Read a column as a number; NULL and non-numeric text become NaN.
fn number(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => i as f64,
        ValueRef::Real(f) => f,
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(parse_numeric)
            .unwrap_or(f64::NAN),
        ValueRef::Null | ValueRef::Blob(_) => f64::NAN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn create_db(path: &Path, sql: &str) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(sql).unwrap();
    }

    const FIXTURE: &str = "
        CREATE TABLE results (sample_id INTEGER, parameter TEXT, concentration_value REAL, soil_type TEXT);
        CREATE TABLE samples (sample_id TEXT, sample_name TEXT, land_use TEXT);
        CREATE TABLE guidelines (parameter TEXT, soil_type TEXT, land_use TEXT, guideline_value TEXT, units TEXT, notes TEXT);
        INSERT INTO results VALUES (1, 'Arsenic', 20.0, 'Fine');
        INSERT INTO results VALUES (2, 'Lead', NULL, 'Coarse');
        INSERT INTO samples VALUES ('1', 'BH-01', 'Industrial');
        INSERT INTO samples VALUES ('2', NULL, NULL);
        INSERT INTO guidelines VALUES ('Arsenic', 'Fine', 'Industrial', '12', 'mg/kg', NULL);
    ";

    #[test]
    fn test_load_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soil.sqlite");
        create_db(&path, FIXTURE);

        let tables = SqliteSource::new(&path).load().unwrap();
        assert_eq!(tables.results.len(), 2);
        assert_eq!(tables.results[0].sample_id, "1");
        assert_eq!(tables.results[0].concentration_value, 20.0);
        assert!(tables.results[1].concentration_value.is_nan());
        assert_eq!(tables.samples[0].sample_id, "1");
        assert!(tables.samples[1].sample_name.is_none());
        assert!(tables.samples[1].land_use().is_none());
        assert_eq!(tables.guidelines[0].guideline_value, "12");
        assert_eq!(tables.guidelines[0].notes, "");
    }

    #[test]
    fn test_numeric_guideline_and_missing_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soil.sqlite");
        create_db(
            &path,
            "
            CREATE TABLE results (sample_id TEXT, parameter TEXT, concentration_value TEXT, soil_type TEXT);
            CREATE TABLE samples (sample_id TEXT, sample_name TEXT, land_use TEXT);
            CREATE TABLE guidelines (parameter TEXT, soil_type TEXT, land_use TEXT, guideline_value REAL);
            INSERT INTO results VALUES ('A', 'Zinc', 'n.d.', 'Fine');
            INSERT INTO guidelines VALUES ('Zinc', 'Fine', 'Industrial', 410.0);
            ",
        );

        let tables = SqliteSource::new(&path).load().unwrap();
        assert!(tables.results[0].concentration_value.is_nan());
        assert_eq!(tables.guidelines[0].guideline_value, "410");
        assert_eq!(tables.guidelines[0].units, "mg/kg");
    }

    #[test]
    fn test_missing_table_is_database_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soil.sqlite");
        create_db(&path, "CREATE TABLE results (sample_id TEXT);");

        let result = SqliteSource::new(&path).load();
        assert!(matches!(result, Err(Tier1Error::MissingColumn { .. })));

        create_db(
            &path,
            "DROP TABLE results;
             CREATE TABLE results (sample_id TEXT, parameter TEXT, concentration_value REAL, soil_type TEXT);",
        );
        let result = SqliteSource::new(&path).load();
        assert!(matches!(result, Err(Tier1Error::Database(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqliteSource::new(dir.path().join("absent.sqlite")).load();
        assert!(matches!(result, Err(Tier1Error::Database(_))));
    }
}
