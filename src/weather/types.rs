//! 天気レポート関連の型定義

use serde::{Deserialize, Serialize};

/// 1日あたりの時間帯数（朝・昼・夕・夜）
pub const PARTS_PER_DAY: usize = 4;
/// レポートの日数
pub const REPORT_DAYS: usize = 7;

/// 気圧差がこの値以上なら警告対象
const PRESSURE_WARNING_SPREAD: i32 = 5;
/// 気圧変化の平均がこの値を超えたら上昇/下降とみなす
const PRESSURE_TREND_THRESHOLD: f64 = 0.5;

pub const WARNING_PRESSURE_RAISE: &str = "Ожидается резкое увеличение атмосферного давления";
pub const WARNING_PRESSURE_DROP: &str = "Ожидается резкое падение атмосферного давления";
pub const WARNING_PRESSURE_UNSTABLE: &str = "Ожидается резкие перепады атмосферного давления";

/// 時間帯
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPart {
    Morning,
    Day,
    Evening,
    Night,
}

impl DayPart {
    pub const ALL: [DayPart; PARTS_PER_DAY] = [
        DayPart::Morning,
        DayPart::Day,
        DayPart::Evening,
        DayPart::Night,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DayPart::Morning => "Morning",
            DayPart::Day => "Day",
            DayPart::Evening => "Evening",
            DayPart::Night => "Night",
        }
    }
}

/// 時間帯ごとの天気
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherRow {
    pub min_temp: Option<i32>,
    pub max_temp: Option<i32>,
    pub description: Option<String>,
    /// mm Hg
    pub pressure: Option<i32>,
    /// 0.0..=1.0
    pub humidity: Option<f64>,
    /// m/s
    pub wind: Option<f64>,
}

impl WeatherRow {
    /// 最低・最高気温の平均（切り捨て）
    pub fn avg_temp(&self) -> Option<i32> {
        match (self.min_temp, self.max_temp) {
            (Some(min), Some(max)) => Some((min + max).div_euclid(2)),
            _ => None,
        }
    }
}

/// 1日分の天気（朝・昼・夕・夜）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherBlock {
    pub rows: [Option<WeatherRow>; PARTS_PER_DAY],
    pub uv_index: Option<i32>,
    pub magnetic_field: Option<String>,
}

impl WeatherBlock {
    pub fn row(&self, part: DayPart) -> Option<&WeatherRow> {
        self.rows[part as usize].as_ref()
    }

    /// 日中（朝・昼・夕）の平均気温
    pub fn avg_temp(&self) -> Option<i32> {
        let temps: Vec<i32> = self.rows[..3]
            .iter()
            .flatten()
            .filter_map(WeatherRow::avg_temp)
            .collect();

        if temps.is_empty() {
            return None;
        }
        Some(temps.iter().sum::<i32>().div_euclid(temps.len() as i32))
    }

    fn pressures(&self) -> impl Iterator<Item = i32> + '_ {
        self.rows.iter().flatten().filter_map(|row| row.pressure)
    }

    pub fn min_pressure(&self) -> Option<i32> {
        self.pressures().min()
    }

    pub fn max_pressure(&self) -> Option<i32> {
        self.pressures().max()
    }

    /// 気圧の急変に関する警告
    pub fn warning(&self) -> Option<&'static str> {
        let (min, max) = (self.min_pressure()?, self.max_pressure()?);
        if max - min < PRESSURE_WARNING_SPREAD {
            return None;
        }

        let pressures: Vec<i32> = self.pressures().collect();
        let diffs: Vec<f64> = pressures
            .windows(2)
            .map(|w| f64::from(w[1] - w[0]))
            .collect();
        let trend = diffs.iter().sum::<f64>() / diffs.len() as f64;

        if trend > PRESSURE_TREND_THRESHOLD {
            Some(WARNING_PRESSURE_RAISE)
        } else if trend < -PRESSURE_TREND_THRESHOLD {
            Some(WARNING_PRESSURE_DROP)
        } else {
            Some(WARNING_PRESSURE_UNSTABLE)
        }
    }
}

/// 複数日分の天気レポート
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub days: Vec<Option<WeatherBlock>>,
}

impl WeatherReport {
    pub fn new(days: Vec<Option<WeatherBlock>>) -> Self {
        Self { days }
    }

    pub fn today(&self) -> Option<&WeatherBlock> {
        self.days.first().and_then(Option::as_ref)
    }

    /// 取得できた日数
    pub fn len(&self) -> usize {
        self.days.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
