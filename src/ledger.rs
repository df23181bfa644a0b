//! 実行履歴 (SQLite)
//!
//! 1回の実行につき1行、都市名と成否を `scrap_result` テーブルに記録する。

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{named_params, Connection};
use tracing::debug;

use crate::error::ScraperError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS scrap_result (
    id      INTEGER PRIMARY KEY,
    city    TEXT NOT NULL,
    dt      TEXT NOT NULL,
    result  INTEGER NOT NULL
);
"#;

/// 記録済みの実行結果
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: i64,
    pub city: String,
    pub dt: DateTime<Utc>,
    pub result: bool,
}

#[derive(Debug)]
pub struct RunLedger {
    conn: Connection,
}

impl RunLedger {
    /// データベースを開く（スキーマがなければ作成）
    pub fn open(path: &Path) -> Result<Self, ScraperError> {
        debug!("Opening run ledger {:?}", path);
        Self::init(Connection::open(path)?)
    }

    /// メモリ上のデータベースを開く
    pub fn open_in_memory() -> Result<Self, ScraperError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, ScraperError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// 実行結果を追記（`city` は入力どおりの都市名、`dt` 省略時は現在時刻）
    pub fn record(
        &self,
        city: &str,
        result: bool,
        dt: Option<DateTime<Utc>>,
    ) -> Result<i64, ScraperError> {
        const SQL: &str = "INSERT INTO scrap_result (city, dt, result) VALUES (:city, :dt, :result)";
        let dt = dt.unwrap_or_else(Utc::now);
        self.conn.execute(
            SQL,
            named_params! {
                ":city": city,
                ":dt": dt,
                ":result": result,
            },
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Recorded run {}: city={}, result={}", id, city, result);
        Ok(id)
    }

    /// 記録をすべて古い順に返す
    pub fn records(&self) -> Result<Vec<RunRecord>, ScraperError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, city, dt, result FROM scrap_result ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(RunRecord {
                id: row.get(0)?,
                city: row.get(1)?,
                dt: row.get(2)?,
                result: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_and_list() {
        let ledger = RunLedger::open_in_memory().unwrap();
        let dt = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();

        ledger.record("Москва", true, Some(dt)).unwrap();
        ledger.record("Атлантида", false, None).unwrap();

        let records = ledger.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].city, "Москва");
        assert_eq!(records[0].dt, dt);
        assert!(records[0].result);
        assert_eq!(records[1].city, "Атлантида");
        assert!(!records[1].result);
    }

    #[test]
    fn test_open_file_twice_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yaws.db");

        RunLedger::open(&path).unwrap().record("Казань", true, None).unwrap();
        let ledger = RunLedger::open(&path).unwrap();
        ledger.record("Казань", true, None).unwrap();

        assert_eq!(ledger.records().unwrap().len(), 2);
    }
}
