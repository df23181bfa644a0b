//! 描画済みページから天気レポートを抽出する
//!
//! 予報カード・表・行・各セルは必須で、欠けていればページ構成の変更とみなして
//! `ElementNotFound` を返す。フッター（UV指数・磁場）は任意。

use std::str::FromStr;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::ScraperError;

use super::types::{WeatherBlock, WeatherReport, WeatherRow, PARTS_PER_DAY, REPORT_DAYS};

pub const CARD_SELECTOR: &str = "article.card";
const ROW_SELECTOR: &str = ".weather-table__row";
const TEMP_SELECTOR: &str = ".temp__value";
const CONDITION_SELECTOR: &str = ".weather-table__body-cell_type_condition";
const PRESSURE_SELECTOR: &str = ".weather-table__body-cell_type_air-pressure";
const HUMIDITY_SELECTOR: &str = ".weather-table__body-cell_type_humidity";
const WIND_SELECTOR: &str = ".wind-speed";
const FOOTER_VALUE_SELECTOR: &str = "dd.forecast-fields__value";

/// 予報カード内で表とフッターを含む `div` の位置
const CARD_BODY_INDEX: usize = 1;

struct Selectors {
    card: Selector,
    row: Selector,
    temp: Selector,
    condition: Selector,
    pressure: Selector,
    humidity: Selector,
    wind: Selector,
    footer_value: Selector,
}

impl Selectors {
    fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            card: parse_selector(CARD_SELECTOR)?,
            row: parse_selector(ROW_SELECTOR)?,
            temp: parse_selector(TEMP_SELECTOR)?,
            condition: parse_selector(CONDITION_SELECTOR)?,
            pressure: parse_selector(PRESSURE_SELECTOR)?,
            humidity: parse_selector(HUMIDITY_SELECTOR)?,
            wind: parse_selector(WIND_SELECTOR)?,
            footer_value: parse_selector(FOOTER_VALUE_SELECTOR)?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::InvalidSelector(format!("{css}: {e}")))
}

/// 描画済みHTMLからレポートを構築
pub fn parse_report(html: &str) -> Result<WeatherReport, ScraperError> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(html);

    let cards: Vec<ElementRef> = document.select(&selectors.card).take(REPORT_DAYS).collect();
    if cards.is_empty() {
        return Err(ScraperError::ElementNotFound(CARD_SELECTOR.to_string()));
    }
    debug!("Found {} forecast cards", cards.len());

    let mut days = vec![None; REPORT_DAYS];
    for (i, card) in cards.into_iter().enumerate() {
        days[i] = Some(parse_card(&selectors, card, i)?);
    }

    Ok(WeatherReport::new(days))
}

fn parse_card(
    selectors: &Selectors,
    card: ElementRef,
    day: usize,
) -> Result<WeatherBlock, ScraperError> {
    let body = child_element(card, "div", CARD_BODY_INDEX).ok_or_else(|| {
        ScraperError::ElementNotFound(format!("{CARD_SELECTOR}[{day}] > div:nth-of-type(2)"))
    })?;
    let table = child_element(body, "table", 0).ok_or_else(|| {
        ScraperError::ElementNotFound(format!("{CARD_SELECTOR}[{day}] > div > table"))
    })?;

    let rows: Vec<ElementRef> = table.select(&selectors.row).take(PARTS_PER_DAY).collect();
    if rows.is_empty() {
        return Err(ScraperError::ElementNotFound(format!(
            "{CARD_SELECTOR}[{day}] {ROW_SELECTOR}"
        )));
    }

    let mut block = WeatherBlock::default();
    for (i, row) in rows.into_iter().enumerate() {
        block.rows[i] = Some(parse_row(selectors, row)?);
    }

    if let Some(fields) = child_element(body, "dl", 0) {
        parse_footer(selectors, fields, &mut block);
    }

    Ok(block)
}

fn parse_row(selectors: &Selectors, row: ElementRef) -> Result<WeatherRow, ScraperError> {
    let mut parsed = WeatherRow::default();

    let temps: Vec<String> = row.select(&selectors.temp).map(text_of).collect();
    if temps.is_empty() {
        return Err(ScraperError::ElementNotFound(TEMP_SELECTOR.to_string()));
    }
    match temps.len() {
        3 => {
            parsed.min_temp = parse_temp(&temps[0]);
            parsed.max_temp = parse_temp(&temps[1]);
        }
        2 => {
            parsed.min_temp = parse_temp(&temps[0]);
            parsed.max_temp = parsed.min_temp;
        }
        n => debug!("Unexpected temperature cell count: {}", n),
    }

    parsed.description = Some(required_text(row, &selectors.condition, CONDITION_SELECTOR)?);
    parsed.pressure = parse_value(&required_text(row, &selectors.pressure, PRESSURE_SELECTOR)?);
    parsed.humidity = parse_humidity(&required_text(row, &selectors.humidity, HUMIDITY_SELECTOR)?);
    parsed.wind = parse_wind(&required_text(row, &selectors.wind, WIND_SELECTOR)?);

    Ok(parsed)
}

fn parse_footer(selectors: &Selectors, fields: ElementRef, block: &mut WeatherBlock) {
    let values: Vec<String> = fields
        .select(&selectors.footer_value)
        .filter(|e| e.parent() == Some(*fields))
        .map(text_of)
        .collect();

    if let Some(first) = values.first() {
        block.uv_index = parse_uv_index(first);
    }
    // 水温が間に挟まることがあるので磁場は末尾から取る
    if values.len() > 1 {
        block.magnetic_field = values.last().and_then(|v| parse_magnetic_field(v));
    }
}

/// `tag` 名の直下の子要素のうち `index` 番目
fn child_element<'a>(parent: ElementRef<'a>, tag: &str, index: usize) -> Option<ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == tag)
        .nth(index)
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn required_text(
    row: ElementRef,
    selector: &Selector,
    css: &str,
) -> Result<String, ScraperError> {
    row.select(selector)
        .next()
        .map(text_of)
        .ok_or_else(|| ScraperError::ElementNotFound(css.to_string()))
}

fn parse_value<T: FromStr>(text: &str) -> Option<T> {
    match text.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Could not parse value: '{}'", text);
            None
        }
    }
}

fn parse_temp(text: &str) -> Option<i32> {
    parse_value(&text.replace('\u{2212}', "-"))
}

fn parse_humidity(text: &str) -> Option<f64> {
    let value: f64 = parse_value(&text.replace('%', ""))?;
    if value > 1.0 {
        Some(value / 100.0)
    } else {
        Some(value)
    }
}

fn parse_wind(text: &str) -> Option<f64> {
    parse_value(&text.replace(',', "."))
}

fn parse_uv_index(text: &str) -> Option<i32> {
    // フッターが水温のみの場合
    if text.ends_with('C') {
        return None;
    }
    parse_value(text.split(',').next().unwrap_or_default())
}

fn parse_magnetic_field(text: &str) -> Option<String> {
    if text.ends_with('C') {
        return None;
    }
    Some(text.to_string())
}
