use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use inquire::Select;
use tower::Service;
use tracing::info;

use yaws::config::{DEFAULT_CITY_DB, DEFAULT_DATABASE, DEFAULT_DRIVER_DIR};
use yaws::pipeline::record_run;
use yaws::{CityData, CityDirectory, ScraperConfig, ScraperError, WeatherRequest, WeatherService};

/// YAndex Weather Scrapper
#[derive(Debug, Parser)]
#[command(name = "yaws", version, about = "YAndex Weather Scrapper")]
pub struct Cli {
    /// The city to check the weather in.
    pub city: String,

    /// Path to the browser to use for scrapping (Chromium-based browsers only).
    #[arg(short, long)]
    pub browser: Option<PathBuf>,

    /// Path to the browser driver.
    #[arg(short, long)]
    pub driver: Option<PathBuf>,

    /// Directory searched for the default driver.
    #[arg(long, default_value = DEFAULT_DRIVER_DIR)]
    pub driver_dir: PathBuf,

    /// Directory for the weather dumps and history spreadsheet.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// City database (name;region;district;lat;lon).
    #[arg(long, default_value = DEFAULT_CITY_DB)]
    pub city_db: PathBuf,

    /// SQLite database recording every run.
    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub db: PathBuf,

    /// Do not record the run in the SQLite database.
    #[arg(long)]
    pub no_db: bool,

    /// Seconds to wait for the forecast to render.
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Show the browser window.
    #[arg(long)]
    pub headed: bool,

    /// Verbose logging and a screenshot when the page does not render.
    #[arg(long)]
    pub debug: bool,

    /// Pick the N-th city when several share the name (skips the prompt).
    #[arg(long)]
    pub pick: Option<usize>,
}

impl Cli {
    pub fn config(&self) -> ScraperConfig {
        ScraperConfig::new()
            .with_browser_path(self.browser.clone())
            .with_driver_path(self.driver.clone())
            .with_driver_dir(&self.driver_dir)
            .with_output_dir(&self.output_dir)
            .with_city_db(&self.city_db)
            .with_database((!self.no_db).then(|| self.db.clone()))
            .with_page_timeout(Duration::from_secs(self.timeout))
            .with_headless(!self.headed)
            .with_debug(self.debug)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.config();

        let city = match self.resolve_city(&config) {
            Ok(city) => city,
            Err(e) => {
                record_run(&config, &self.city, false);
                return Err(e).context("could not resolve the city");
            }
        };
        println!("Working with {city}");

        let request = WeatherRequest::new(&self.city, city).with_config(config);
        let mut service = WeatherService::new();

        println!("Fetching weather...");
        let outcome = service
            .call(request)
            .await
            .context("failed to fetch the weather report")?;

        info!("Weather page: {}", outcome.url);
        println!(
            "Done, check '{}' and '{}'",
            outcome.dump.csv.display(),
            outcome.history_path.display()
        );
        Ok(())
    }

    fn resolve_city(&self, config: &ScraperConfig) -> Result<CityData, ScraperError> {
        let directory = CityDirectory::load(&config.city_db_path)?;
        let candidates = directory.lookup(&self.city);

        match candidates {
            [] => Err(ScraperError::UnknownCity(self.city.clone())),
            [city] => Ok(city.clone()),
            many => match self.pick {
                Some(n) => many.get(n).cloned().ok_or_else(|| {
                    ScraperError::Selection(format!("no city #{n}, {} found", many.len()))
                }),
                None => Select::new("Multiple cities found, select one", many.to_vec())
                    .prompt()
                    .map_err(|e| ScraperError::Selection(e.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["yaws", "Москва"]).unwrap();
        assert_eq!(cli.city, "Москва");
        assert!(cli.browser.is_none());
        assert!(cli.driver.is_none());

        let config = cli.config();
        assert!(config.headless);
        assert_eq!(config.database_path, Some(PathBuf::from(DEFAULT_DATABASE)));
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "yaws",
            "Казань",
            "-b",
            "/usr/bin/chromium",
            "--driver",
            "/opt/drivers/chrome-headless-shell",
            "--no-db",
            "--timeout",
            "15",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.browser_path, Some(PathBuf::from("/usr/bin/chromium")));
        assert_eq!(
            config.driver_path,
            Some(PathBuf::from("/opt/drivers/chrome-headless-shell"))
        );
        assert!(config.database_path.is_none());
        assert_eq!(config.page_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_city_is_required() {
        assert!(Cli::try_parse_from(["yaws"]).is_err());
    }

    fn write_city_db(dir: &std::path::Path) -> PathBuf {
        let db = dir.join("cities.csv");
        std::fs::write(
            &db,
            "name;region;district;lat;lon\n\
             Кировск;Мурманская область;Северо-Западный;67,6150;33,6700\n\
             Кировск;Ленинградская область;Северо-Западный;59,8750;30,9950\n",
        )
        .unwrap();
        db
    }

    #[test]
    fn test_resolve_city_with_pick() {
        let dir = tempfile::tempdir().unwrap();
        let db = write_city_db(dir.path());

        let cli = Cli::try_parse_from([
            "yaws",
            "кировск",
            "--city-db",
            db.to_str().unwrap(),
            "--pick",
            "1",
        ])
        .unwrap();
        let city = cli.resolve_city(&cli.config()).unwrap();
        assert_eq!(city.region, "Ленинградская область");

        let unknown = Cli::try_parse_from(["yaws", "Атлантида", "--city-db", db.to_str().unwrap()])
            .unwrap();
        let err = unknown.resolve_city(&unknown.config()).unwrap_err();
        assert!(matches!(err, ScraperError::UnknownCity(_)));
    }

    #[test]
    fn test_pick_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let db = write_city_db(dir.path());

        let cli = Cli::try_parse_from([
            "yaws",
            "Кировск",
            "--city-db",
            db.to_str().unwrap(),
            "--pick",
            "2",
        ])
        .unwrap();
        let err = cli.resolve_city(&cli.config()).unwrap_err();
        assert!(matches!(err, ScraperError::Selection(_)));
    }

    #[tokio::test]
    async fn test_unknown_city_is_recorded_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let city_db = write_city_db(dir.path());
        let ledger_path = dir.path().join("yaws.db");

        let cli = Cli::try_parse_from([
            "yaws",
            "Атлантида",
            "--city-db",
            city_db.to_str().unwrap(),
            "--db",
            ledger_path.to_str().unwrap(),
            "--output-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(cli.run().await.is_err());

        let records = yaws::RunLedger::open(&ledger_path).unwrap().records().unwrap();
        let results: Vec<bool> = records.iter().map(|r| r.result).collect();
        assert_eq!(results, vec![false]);
        assert_eq!(records[0].city, "Атлантида");
    }

    #[tokio::test]
    async fn test_missing_city_db_is_recorded_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("yaws.db");

        let cli = Cli::try_parse_from([
            "yaws",
            "Москва",
            "--city-db",
            dir.path().join("missing.csv").to_str().unwrap(),
            "--db",
            ledger_path.to_str().unwrap(),
        ])
        .unwrap();
        assert!(cli.run().await.is_err());

        let records = yaws::RunLedger::open(&ledger_path).unwrap().records().unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].result);
    }
}
