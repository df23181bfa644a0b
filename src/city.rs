//! 都市データベース
//!
//! `name;region;district;lat;lon` 形式のCSV（1行目はヘッダー）から
//! 都市名 → 座標の対応表を作る。同名の都市は複数登録されうる。

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ScraperError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityData {
    pub name: String,
    pub region: String,
    pub district: String,
    /// (緯度, 経度)
    pub coords: (f64, f64),
}

impl fmt::Display for CityData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} ({})", self.name, self.region, self.district)
    }
}

#[derive(Debug, Default)]
pub struct CityDirectory {
    cities: HashMap<String, Vec<CityData>>,
}

impl CityDirectory {
    /// CSVファイルから読み込む
    pub fn load(path: &Path) -> Result<Self, ScraperError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .from_path(path)
            .map_err(|source| ScraperError::CityDb {
                path: path.to_path_buf(),
                source,
            })?;

        let directory = Self::from_csv(reader).map_err(|e| match e {
            ScraperError::CityDb { source, .. } => ScraperError::CityDb {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        info!("Loaded {} city names from {:?}", directory.cities.len(), path);
        Ok(directory)
    }

    /// 任意のリーダーから読み込む
    pub fn from_reader(reader: impl Read) -> Result<Self, ScraperError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, ScraperError> {
        let mut directory = Self::default();

        for record in reader.records() {
            let record = record.map_err(|source| ScraperError::CityDb {
                path: Default::default(),
                source,
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            if record.len() != 5 {
                return Err(ScraperError::CityRecord {
                    line,
                    reason: format!("5 fields expected, got {}", record.len()),
                });
            }

            let coord = |idx: usize| {
                parse_coord(&record[idx]).ok_or_else(|| ScraperError::CityRecord {
                    line,
                    reason: format!("bad coordinate '{}'", &record[idx]),
                })
            };
            let coords = (coord(3)?, coord(4)?);

            directory.register(CityData {
                name: record[0].to_string(),
                region: record[1].to_string(),
                district: record[2].to_string(),
                coords,
            });
        }

        Ok(directory)
    }

    pub fn register(&mut self, city: CityData) {
        debug!("Registering city {}", city);
        self.cities.entry(normalize(&city.name)).or_default().push(city);
    }

    /// 同名の都市をすべて返す
    pub fn lookup(&self, name: &str) -> &[CityData] {
        self.cities
            .get(&normalize(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// 空白を除いて小文字化した検索キー
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_coord(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITY_DB: &str = "\
name;region;district;lat;lon
Москва;Москва;Центральный;55,7522;37,6156
Нижний Новгород;Нижегородская область;Приволжский;56.3287;44.002
Кировск;Мурманская область;Северо-Западный;67,6150;33,6700
Кировск;Ленинградская область;Северо-Западный;59,8750;30,9950
";

    #[test]
    fn test_lookup() {
        let directory = CityDirectory::from_reader(CITY_DB.as_bytes()).unwrap();

        let moscow = directory.lookup("москва");
        assert_eq!(moscow.len(), 1);
        assert_eq!(moscow[0].coords, (55.7522, 37.6156));
        assert_eq!(moscow[0].to_string(), "Москва, Москва (Центральный)");

        assert_eq!(directory.lookup("Нижний  Новгород").len(), 1);
        assert_eq!(directory.lookup("НижнийНовгород").len(), 1);
        assert_eq!(directory.lookup("Кировск").len(), 2);
        assert!(directory.lookup("Атлантида").is_empty());
    }

    #[test]
    fn test_bad_coordinate() {
        let db = "name;region;district;lat;lon\nX;Y;Z;north;37\n";
        let err = CityDirectory::from_reader(db.as_bytes()).unwrap_err();
        assert!(matches!(err, ScraperError::CityRecord { line: 2, .. }));
    }

    #[test]
    fn test_wrong_field_count() {
        let db = "name;region;district;lat;lon\nX;Y;Z;1\n";
        assert!(CityDirectory::from_reader(db.as_bytes()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = CityDirectory::load(Path::new("/nonexistent/city_coords.csv")).unwrap_err();
        assert!(matches!(err, ScraperError::CityDb { .. }));
    }
}
