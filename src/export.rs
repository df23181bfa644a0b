//! レポートの書き出し
//!
//! - 実行ごとのダンプ（日 × 時間帯のCSVと生JSON）
//! - 実行履歴スプレッドシート（成功した実行ごとに1行追記）

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, NaiveDate};
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::city::CityData;
use crate::error::ScraperError;
use crate::weather::{DayPart, WeatherReport};

pub const FALLBACK_VALUE: &str = "Unknown";
pub const HISTORY_FILE: &str = "yaws-history.csv";

const DUMP_COLUMNS: [&str; 9] = [
    "Date",
    "Part",
    "Temperature",
    "Pressure",
    "Humidity",
    "Description",
    "Magnetic Field",
    "Average Temperature",
    "Warnings",
];

/// 1回の実行で書き出したダンプファイル
#[derive(Debug, Clone)]
pub struct DumpFiles {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// 履歴スプレッドシートの1行（今日の天気 + 実行時刻）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub timestamp: String,
    pub city: String,
    pub region: String,
    pub date: NaiveDate,
    pub avg_temp: Option<i32>,
    pub min_pressure: Option<i32>,
    pub max_pressure: Option<i32>,
    pub uv_index: Option<i32>,
    pub magnetic_field: Option<String>,
    pub warning: Option<String>,
}

impl OutputRow {
    pub fn new(report: &WeatherReport, city: &CityData, now: DateTime<Local>) -> Self {
        let today = report.today();
        Self {
            timestamp: now.to_rfc3339(),
            city: city.name.clone(),
            region: city.region.clone(),
            date: now.date_naive(),
            avg_temp: today.and_then(|b| b.avg_temp()),
            min_pressure: today.and_then(|b| b.min_pressure()),
            max_pressure: today.and_then(|b| b.max_pressure()),
            uv_index: today.and_then(|b| b.uv_index),
            magnetic_field: today.and_then(|b| b.magnetic_field.clone()),
            warning: today.and_then(|b| b.warning()).map(str::to_string),
        }
    }

    fn to_frame(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new("Timestamp".into(), [self.timestamp.as_str()]),
            Column::new("City".into(), [self.city.as_str()]),
            Column::new("Region".into(), [self.region.as_str()]),
            Column::new("Date".into(), [self.date.to_string()]),
            Column::new("Average Temperature".into(), [or_unknown(self.avg_temp)]),
            Column::new("Min Pressure".into(), [or_unknown(self.min_pressure)]),
            Column::new("Max Pressure".into(), [or_unknown(self.max_pressure)]),
            Column::new("UV Index".into(), [or_unknown(self.uv_index)]),
            Column::new("Magnetic Field".into(), [or_unknown(self.magnetic_field.as_deref())]),
            Column::new("Warnings".into(), [self.warning.as_deref().unwrap_or_default()]),
        ])
    }
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| FALLBACK_VALUE.to_string())
}

/// 日 × 時間帯のデータフレームを構築
pub fn report_frame(report: &WeatherReport, today: NaiveDate) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Vec<String>> = vec![Vec::new(); DUMP_COLUMNS.len()];

    for (k, block) in report.days.iter().enumerate() {
        let Some(block) = block else { continue };
        let date = today + Duration::days(k as i64);

        for part in DayPart::ALL {
            let row = block.row(part);
            let values = [
                date.to_string(),
                part.label().to_string(),
                or_unknown(row.and_then(|r| r.avg_temp())),
                or_unknown(row.and_then(|r| r.pressure)),
                or_unknown(row.and_then(|r| r.humidity)),
                or_unknown(row.and_then(|r| r.description.clone())),
                or_unknown(block.magnetic_field.clone()),
                or_unknown(block.avg_temp()),
                block.warning().unwrap_or_default().to_string(),
            ];
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(value);
            }
        }
    }

    let columns = DUMP_COLUMNS
        .iter()
        .zip(columns)
        .map(|(name, values)| Column::new((*name).into(), values))
        .collect();
    DataFrame::new(columns)
}

fn render_csv(df: &mut DataFrame, include_header: bool) -> PolarsResult<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(include_header)
        .finish(df)?;
    Ok(buf)
}

/// 未使用のダンプファイル名を確保する
///
/// 同じ時刻のダンプが既にあれば `-1`, `-2`, ... を付ける。
fn claim_dump_files(output_dir: &Path, base: &str) -> Result<(DumpFiles, File), ScraperError> {
    let mut n = 0u32;
    loop {
        let stem = match n {
            0 => base.to_string(),
            _ => format!("{base}-{n}"),
        };
        let csv = output_dir.join(format!("{stem}.csv"));
        match OpenOptions::new().write(true).create_new(true).open(&csv) {
            Ok(file) => {
                let json = output_dir.join(format!("{stem}.json"));
                return Ok((DumpFiles { csv, json }, file));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// ダンプ（CSV + JSON）を書き出す
pub fn write_dump(
    report: &WeatherReport,
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<DumpFiles, ScraperError> {
    std::fs::create_dir_all(output_dir)?;
    let base = format!("weather-dump-{}", now.timestamp_millis());

    let mut df = report_frame(report, now.date_naive())?;
    let bytes = render_csv(&mut df, true)?;

    let (files, mut csv_file) = claim_dump_files(output_dir, &base)?;
    csv_file.write_all(&bytes)?;
    std::fs::write(&files.json, serde_json::to_string_pretty(report)?)?;

    info!("Saved weather dump to {:?}", files.csv);
    Ok(files)
}

/// 履歴スプレッドシートに1行追記する（なければヘッダー付きで作成）
///
/// 行全体をメモリ上で組み立ててから1回で書き込む。
pub fn append_history(row: &OutputRow, output_dir: &Path) -> Result<PathBuf, ScraperError> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(HISTORY_FILE);
    let is_new = !path.exists();

    let mut df = row.to_frame()?;
    let bytes = render_csv(&mut df, is_new)?;

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;

    info!("Appended weather row for {} to {:?}", row.city, path);
    Ok(path)
}
