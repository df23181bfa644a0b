//! 外部サービスのURL構築

use crate::city::CityData;

const YA_POGODA_BASE: &str = "https://yandex.ru/pogoda/details";

/// 座標からYandex天気の詳細ページURLを構築
///
/// 整数値の座標も `151.0` のように小数点付きで出力する。
pub fn build_url_ya_pogoda(lat: f64, lon: f64) -> String {
    format!("{YA_POGODA_BASE}?lat={lat:?}&lon={lon:?}&via=ms")
}

pub fn weather_url(city: &CityData) -> String {
    let (lat, lon) = city.coords;
    build_url_ya_pogoda(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        assert_eq!(
            build_url_ya_pogoda(55.7522, 37.6156),
            "https://yandex.ru/pogoda/details?lat=55.7522&lon=37.6156&via=ms"
        );
        assert_eq!(
            build_url_ya_pogoda(-33.5, 151.0),
            "https://yandex.ru/pogoda/details?lat=-33.5&lon=151.0&via=ms"
        );
    }

    #[test]
    fn test_url_is_deterministic() {
        let city = CityData {
            name: "Москва".into(),
            region: "Москва".into(),
            district: "Центральный".into(),
            coords: (55.7522, 37.6156),
        };
        assert_eq!(weather_url(&city), weather_url(&city.clone()));
    }
}
