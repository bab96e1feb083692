//! SQLite-based forecast cache.
//!
//! Every operation opens its own connection and closes it before returning, so
//! no handle is held between calls.

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::forecast::extract_items;
use crate::types::{ForecastItem, ForecastRun, WeatherError};

const FETCHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Local cache of forecast runs per area.
#[derive(Debug, Clone)]
pub struct ForecastStore {
    path: PathBuf,
}

impl ForecastStore {
    /// Create a store backed by the database file at `path`.
    ///
    /// Nothing is opened until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, WeatherError> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Create the tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Store` if the database cannot be opened or written.
    pub fn initialize(&self) -> Result<(), WeatherError> {
        let conn = self.open()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS areas (
                area_code TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS forecast_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                area_code TEXT NOT NULL,
                fetched_at TEXT NOT NULL,
                raw_json TEXT,
                FOREIGN KEY (area_code) REFERENCES areas(area_code)
            );

            CREATE TABLE IF NOT EXISTS forecast_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                weather_text TEXT NOT NULL,
                UNIQUE(run_id, date),
                FOREIGN KEY (run_id) REFERENCES forecast_runs(id)
            );

            CREATE INDEX IF NOT EXISTS idx_forecast_runs_area ON forecast_runs(area_code, fetched_at);
            "#,
        )?;
        tracing::debug!(path = %self.path.display(), "Forecast store initialized");
        Ok(())
    }

    /// Record a fetched forecast document and its per-day items.
    ///
    /// The area row is inserted with the code as its name when the code has not
    /// been seen before. Items are extracted before anything is written, and the
    /// area, run and items are committed in one transaction, so a malformed
    /// document leaves no run behind. Returns the new run id.
    ///
    /// # Errors
    ///
    /// `Format` when the document lacks the expected keys, `Store` on database failure.
    pub fn save_forecast(&self, code: &str, payload: &Value) -> Result<i64, WeatherError> {
        let items = extract_items(payload)?;
        let raw_json = serde_json::to_string(payload)?;
        let fetched_at = Local::now().format(FETCHED_AT_FORMAT).to_string();

        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO areas (area_code, name) VALUES (?1, ?2)",
            params![code, code],
        )?;

        tx.execute(
            "INSERT INTO forecast_runs (area_code, fetched_at, raw_json) VALUES (?1, ?2, ?3)",
            params![code, fetched_at, raw_json],
        )?;
        let run_id = tx.last_insert_rowid();

        for item in &items {
            tx.execute(
                "INSERT OR IGNORE INTO forecast_items (run_id, date, weather_text) VALUES (?1, ?2, ?3)",
                params![run_id, item.date, item.weather_text],
            )?;
        }

        tx.commit()?;

        tracing::info!(code, run_id, items = items.len(), %fetched_at, "Saved forecast run");
        Ok(run_id)
    }

    /// Items of the most recent run for `code`, ordered by date.
    ///
    /// Returns an empty list when the area has never been fetched.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Store` on database failure.
    pub fn load_latest_forecast(&self, code: &str) -> Result<Vec<ForecastItem>, WeatherError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT date, weather_text
            FROM forecast_items
            WHERE run_id = (
                SELECT id
                FROM forecast_runs
                WHERE area_code = ?1
                ORDER BY fetched_at DESC, id DESC
                LIMIT 1
            )
            ORDER BY date
            "#,
        )?;

        let rows = stmt.query_map(params![code], |row| {
            Ok(ForecastItem {
                date: row.get(0)?,
                weather_text: row.get(1)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The most recent run recorded for `code`, if any.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Store` on database failure.
    pub fn latest_run(&self, code: &str) -> Result<Option<ForecastRun>, WeatherError> {
        let conn = self.open()?;
        let run = conn
            .query_row(
                r#"
                SELECT id, area_code, fetched_at, raw_json
                FROM forecast_runs
                WHERE area_code = ?1
                ORDER BY fetched_at DESC, id DESC
                LIMIT 1
                "#,
                params![code],
                |row| {
                    Ok(ForecastRun {
                        id: row.get(0)?,
                        area_code: row.get(1)?,
                        fetched_at: row.get(2)?,
                        raw_json: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    })
                },
            )
            .optional()?;
        Ok(run)
    }

    /// Number of runs recorded for `code`.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Store` on database failure.
    pub fn run_count(&self, code: &str) -> Result<usize, WeatherError> {
        let conn = self.open()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM forecast_runs WHERE area_code = ?1",
            params![code],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Re-read the stored document of a run.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Format` if the stored text is not valid JSON.
    pub fn run_payload(run: &ForecastRun) -> Result<Value, WeatherError> {
        Ok(serde_json::from_str(&run.raw_json)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, ForecastStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ForecastStore::new(dir.path().join("weather.db"));
        store.initialize().unwrap();
        (dir, store)
    }

    fn payload(time_defines: &[&str], weathers: &[&str]) -> Value {
        json!([{
            "publishingOffice": "気象庁",
            "timeSeries": [{
                "timeDefines": time_defines,
                "areas": [{ "area": { "name": "東部", "code": "130010" }, "weathers": weathers }]
            }]
        }])
    }

    fn three_days() -> Value {
        payload(
            &[
                "2024-05-01T17:00:00+09:00",
                "2024-05-02T00:00:00+09:00",
                "2024-05-03T00:00:00+09:00",
                "2024-05-04T00:00:00+09:00",
            ],
            &["晴れ", "くもり　時々　雨", "雨", "雪"],
        )
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, store) = test_store();
        store.initialize().unwrap();
        store.initialize().unwrap();
        assert_eq!(store.run_count("130000").unwrap(), 0);
    }

    #[test]
    fn test_save_and_load_three_days() {
        let (_dir, store) = test_store();
        store.save_forecast("130000", &three_days()).unwrap();

        let items = store.load_latest_forecast("130000").unwrap();
        assert_eq!(
            items,
            vec![
                ForecastItem::new("2024-05-01", "晴れ"),
                ForecastItem::new("2024-05-02", "くもり　時々　雨"),
                ForecastItem::new("2024-05-03", "雨"),
            ]
        );
    }

    #[test]
    fn test_two_day_scenario() {
        let (_dir, store) = test_store();
        let doc = payload(
            &["2024-05-01T00:00:00+09:00", "2024-05-02T00:00:00+09:00"],
            &["晴れ", "曇り"],
        );
        store.save_forecast("130000", &doc).unwrap();

        let items = store.load_latest_forecast("130000").unwrap();
        assert_eq!(
            items,
            vec![
                ForecastItem::new("2024-05-01", "晴れ"),
                ForecastItem::new("2024-05-02", "曇り"),
            ]
        );
    }

    #[test]
    fn test_single_pair_persists_one_item() {
        let (_dir, store) = test_store();
        let doc = payload(&["2024-05-01T00:00:00+09:00"], &["晴れ"]);
        store.save_forecast("130000", &doc).unwrap();

        assert_eq!(store.load_latest_forecast("130000").unwrap().len(), 1);
    }

    #[test]
    fn test_latest_run_wins() {
        let (_dir, store) = test_store();
        let first = store.save_forecast("130000", &three_days()).unwrap();
        let second_doc = payload(&["2024-05-02T00:00:00+09:00"], &["快晴"]);
        let second = store.save_forecast("130000", &second_doc).unwrap();

        assert!(second > first);
        assert_eq!(store.run_count("130000").unwrap(), 2);
        assert_eq!(
            store.load_latest_forecast("130000").unwrap(),
            vec![ForecastItem::new("2024-05-02", "快晴")]
        );
    }

    #[test]
    fn test_later_fetched_at_wins_over_insert_order() {
        let (_dir, store) = test_store();
        store.save_forecast("130000", &three_days()).unwrap();
        let second = store
            .save_forecast("130000", &payload(&["2024-06-01T00:00:00+09:00"], &["雨"]))
            .unwrap();

        // Backdate the newer insert so the first run has the later timestamp
        let conn = Connection::open(store.path()).unwrap();
        conn.execute(
            "UPDATE forecast_runs SET fetched_at = '2000-01-01T00:00:00' WHERE id = ?1",
            params![second],
        )
        .unwrap();

        let items = store.load_latest_forecast("130000").unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].date, "2024-05-01");
    }

    #[test]
    fn test_unknown_area_is_empty() {
        let (_dir, store) = test_store();
        store.save_forecast("130000", &three_days()).unwrap();
        assert!(store.load_latest_forecast("270000").unwrap().is_empty());
        assert!(store.latest_run("270000").unwrap().is_none());
    }

    #[test]
    fn test_areas_are_separate() {
        let (_dir, store) = test_store();
        store.save_forecast("130000", &three_days()).unwrap();
        store
            .save_forecast("270000", &payload(&["2024-05-01T00:00:00+09:00"], &["曇り"]))
            .unwrap();

        assert_eq!(store.load_latest_forecast("130000").unwrap().len(), 3);
        assert_eq!(
            store.load_latest_forecast("270000").unwrap(),
            vec![ForecastItem::new("2024-05-01", "曇り")]
        );
    }

    #[test]
    fn test_placeholder_area_row() {
        let (_dir, store) = test_store();
        store.save_forecast("130000", &three_days()).unwrap();
        store.save_forecast("130000", &three_days()).unwrap();

        let conn = Connection::open(store.path()).unwrap();
        let (count, name): (i64, String) = conn
            .query_row(
                "SELECT COUNT(*), MAX(name) FROM areas WHERE area_code = '130000'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(name, "130000");
    }

    #[test]
    fn test_raw_payload_round_trips() {
        let (_dir, store) = test_store();
        let doc = three_days();
        let run_id = store.save_forecast("130000", &doc).unwrap();

        let run = store.latest_run("130000").unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.area_code, "130000");
        assert_eq!(run.fetched_at.len(), 19);
        assert!(run.raw_json.contains("気象庁"));
        assert_eq!(ForecastStore::run_payload(&run).unwrap(), doc);
    }

    #[test]
    fn test_malformed_payload_writes_nothing() {
        let (_dir, store) = test_store();
        let err = store
            .save_forecast("130000", &json!([{ "timeSeries": [] }]))
            .unwrap_err();

        assert!(matches!(err, WeatherError::Format(_)));
        assert_eq!(store.run_count("130000").unwrap(), 0);
        assert!(store.load_latest_forecast("130000").unwrap().is_empty());
    }

    #[test]
    fn test_item_requires_existing_run() {
        let (_dir, store) = test_store();
        let conn = store.open().unwrap();
        let result = conn.execute(
            "INSERT INTO forecast_items (run_id, date, weather_text) VALUES (999, '2024-05-01', '晴れ')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unwritable_path_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ForecastStore::new(dir.path().join("missing").join("weather.db"));
        let err = store.initialize().unwrap_err();
        assert!(matches!(err, WeatherError::Store(_)));
    }
}
