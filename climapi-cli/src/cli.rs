use std::io::{self, Write};

use clap::{Parser, Subcommand};
use climapi_core::{
    ClientConfig, ConfigFile, DEFAULT_API_URL, LocationRequest, WeatherService,
    service_from_config,
};
use tracing::info;

use crate::render::{self, OutputFormat, emit};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "climapi", version, about = "ClimAPI weather service client")]
pub struct Cli {
    /// Backend base URL; overrides CLIMAPI_API_URL and the config file.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print raw JSON instead of formatted text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the backend base URL and save it.
    Configure,

    /// Show current weather for a coordinate.
    Weather {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// IANA timezone, e.g. "Europe/Madrid".
        #[arg(long)]
        timezone: String,
    },

    /// List popular locations.
    Popular,

    /// Show the backend's default location.
    DefaultLocation,

    /// Search locations by name.
    Search {
        query: String,

        /// Maximum number of results (default: 10).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Check backend liveness.
    Health,

    /// Server-side cache operations.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show the backend service descriptor.
    Info,

    /// Health and cache statistics in one go.
    Status,
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show cache statistics.
    Stats,

    /// Clear the server-side cache.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.json { OutputFormat::Json } else { OutputFormat::Human }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let format = self.output_format();

        match &self.command {
            Command::Configure => return configure(),
            Command::Cache { action: CacheAction::Clear { yes: false } } => {
                let confirmed = inquire::Confirm::new("Clear the server-side cache?")
                    .with_default(false)
                    .prompt()?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            _ => {}
        }

        let config = ClientConfig::resolve(self.api_url.as_deref())?;
        info!(base_url = config.base_url(), "Using ClimAPI backend");

        let service = service_from_config(&config);
        let mut out = io::stdout();
        execute(self.command, service.as_ref(), format, &mut out).await
    }
}

/// Run one service command and render its reply to `out`.
pub async fn execute<W: Write>(
    command: Command,
    service: &dyn WeatherService,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Weather { lat, lon, timezone } => {
            let request = LocationRequest { latitude: lat, longitude: lon, timezone };
            let weather = service.get_current_weather(&request).await?;
            emit(out, format, &weather, render::weather)?;
        }
        Command::Popular => {
            let locations = service.get_popular_locations().await?;
            emit(out, format, &locations, |o, v| render::locations(o, v))?;
        }
        Command::DefaultLocation => {
            let location = service.get_default_location().await?;
            emit(out, format, &location, render::location)?;
        }
        Command::Search { query, limit } => {
            let locations = match limit {
                Some(limit) => service.search_locations_with_limit(&query, limit).await?,
                None => service.search_locations(&query).await?,
            };
            emit(out, format, &locations, |o, v| render::locations(o, v))?;
        }
        Command::Health => {
            let health = service.get_health_status().await?;
            emit(out, format, &health, render::health)?;
        }
        Command::Cache { action: CacheAction::Stats } => {
            let stats = service.get_cache_stats().await?;
            emit(out, format, &stats, render::cache_stats)?;
        }
        Command::Cache { action: CacheAction::Clear { .. } } => {
            let cleared = service.clear_cache().await?;
            emit(out, format, &cleared, render::cleared)?;
        }
        Command::Info => {
            let info = service.get_service_info().await?;
            emit(out, format, &info, render::service_info)?;
        }
        Command::Status => {
            let (health, stats) =
                tokio::join!(service.get_health_status(), service.get_cache_stats());

            match format {
                OutputFormat::Json => {
                    render::status_json(out, &health, &stats)?;
                    health?;
                }
                OutputFormat::Human => {
                    render::health(out, &health?)?;
                    match &stats {
                        Ok(stats) => render::cache_stats(out, stats)?,
                        Err(err) => writeln!(out, "Cache: {err}")?,
                    }
                }
            }
        }
        Command::Configure => anyhow::bail!("`configure` does not talk to the backend"),
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut file = ConfigFile::load()?;
    let current = file.api_url.clone().unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let answer = inquire::Text::new("ClimAPI base URL:")
        .with_default(&current)
        .with_help_message("e.g. http://localhost:8000 or https://climapi.example.com")
        .prompt()?;

    let stored = file.set_api_url(&answer)?.to_string();
    let path = file.save()?;

    println!("Saved base URL {stored} to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use climapi_core::{
        CacheStats, ClearCacheResponse, ClientRequestError, FailureKind, HealthResponse,
        LocationInfo, Operation, ServiceInfo, WeatherData, WeatherResponse,
    };
    use std::sync::Mutex;

    /// In-memory stand-in that records which calls were made.
    #[derive(Debug, Default)]
    struct FakeService {
        calls: Mutex<Vec<String>>,
        fail_cache: bool,
        fail_health: bool,
    }

    impl FakeService {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn madrid() -> LocationInfo {
        LocationInfo {
            latitude: 40.4168,
            longitude: -3.7038,
            timezone: "Europe/Madrid".into(),
            city: "Madrid".into(),
            country: "Spain".into(),
        }
    }

    #[async_trait]
    impl WeatherService for FakeService {
        async fn get_current_weather(
            &self,
            request: &LocationRequest,
        ) -> Result<WeatherResponse, ClientRequestError> {
            self.record(format!("weather {} {} {}", request.latitude, request.longitude, request.timezone));
            Ok(WeatherResponse {
                location: madrid(),
                data: vec![WeatherData {
                    time: "2025-06-01T10:00".into(),
                    temperature: 21.5,
                    humidity: 40.0,
                    precipitation: 0.0,
                    wind_speed: 3.2,
                }],
                source: "fake".into(),
                timestamp: "2025-06-01T10:05:00Z".into(),
            })
        }

        async fn get_popular_locations(&self) -> Result<Vec<LocationInfo>, ClientRequestError> {
            self.record("popular");
            Ok(vec![madrid()])
        }

        async fn get_default_location(&self) -> Result<LocationInfo, ClientRequestError> {
            self.record("default");
            Ok(madrid())
        }

        async fn get_health_status(&self) -> Result<HealthResponse, ClientRequestError> {
            self.record("health");
            if self.fail_health {
                return Err(ClientRequestError::new(
                    Operation::HealthStatus,
                    FailureKind::Network,
                    "connection refused",
                ));
            }
            Ok(HealthResponse {
                status: "healthy".into(),
                service: "ClimAPI".into(),
                timestamp: "2025-06-01T10:00:00Z".into(),
            })
        }

        async fn get_cache_stats(&self) -> Result<CacheStats, ClientRequestError> {
            self.record("cache_stats");
            if self.fail_cache {
                return Err(ClientRequestError::new(
                    Operation::CacheStats,
                    FailureKind::HttpStatus(500),
                    "boom",
                ));
            }
            Ok(CacheStats { entries: 3, size: 2048, path: "cache".into(), ttl_minutes: 15.0 })
        }

        async fn clear_cache(&self) -> Result<ClearCacheResponse, ClientRequestError> {
            self.record("clear_cache");
            Ok(ClearCacheResponse {
                message: "Cache cleared".into(),
                timestamp: "2025-06-01T10:00:00Z".into(),
            })
        }

        async fn search_locations_with_limit(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<LocationInfo>, ClientRequestError> {
            self.record(format!("search {query} {limit}"));
            Ok(vec![madrid()])
        }

        async fn get_service_info(&self) -> Result<ServiceInfo, ClientRequestError> {
            self.record("info");
            Ok(ServiceInfo {
                service: "ClimAPI".into(),
                version: "1.0.0".into(),
                status: "running".into(),
                docs: "/docs".into(),
                health: "/health".into(),
            })
        }
    }

    async fn run_with(service: &FakeService, args: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(args)?;
        let format = cli.output_format();
        let mut out = Vec::new();
        execute(cli.command, service, format, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "climapi", "weather", "--lat", "40.4168", "--lon", "-3.7038", "--timezone", "Europe/Madrid",
        ])
        .unwrap();

        match cli.command {
            Command::Weather { lat, lon, timezone } => {
                assert_eq!(lat, 40.4168);
                assert_eq!(lon, -3.7038);
                assert_eq!(timezone, "Europe/Madrid");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["climapi", "health", "--json", "--api-url", "http://x:1"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://x:1"));
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }

    #[tokio::test]
    async fn weather_command_sends_all_three_fields() {
        let service = FakeService::default();
        let text = run_with(
            &service,
            &["climapi", "weather", "--lat", "40.4168", "--lon", "-3.7038", "--timezone", "Europe/Madrid"],
        )
        .await
        .unwrap();

        assert_eq!(service.calls(), ["weather 40.4168 -3.7038 Europe/Madrid"]);
        assert!(text.contains("Madrid, Spain"));
    }

    #[tokio::test]
    async fn search_without_limit_uses_default_of_ten() {
        let service = FakeService::default();
        run_with(&service, &["climapi", "search", "Madrid"]).await.unwrap();
        run_with(&service, &["climapi", "search", "Madrid", "--limit", "3"]).await.unwrap();

        assert_eq!(service.calls(), ["search Madrid 10", "search Madrid 3"]);
    }

    #[tokio::test]
    async fn cache_commands_dispatch() {
        let service = FakeService::default();
        let stats = run_with(&service, &["climapi", "cache", "stats"]).await.unwrap();
        let cleared = run_with(&service, &["climapi", "cache", "clear", "--yes"]).await.unwrap();

        assert!(stats.contains("Cache entries: 3"));
        assert!(stats.contains("2.0 KiB"));
        assert!(cleared.contains("Cache cleared"));
        assert_eq!(service.calls(), ["cache_stats", "clear_cache"]);
    }

    #[tokio::test]
    async fn json_flag_prints_dto() {
        let service = FakeService::default();
        let text = run_with(&service, &["climapi", "--json", "info"]).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], "1.0.0");
    }

    #[tokio::test]
    async fn status_reports_cache_failure_with_fixed_message() {
        let service = FakeService { fail_cache: true, ..Default::default() };
        let text = run_with(&service, &["climapi", "status"]).await.unwrap();

        let health_at = text.find("ClimAPI: healthy").unwrap();
        let cache_at = text.find("Cache: No se pudieron obtener las estadísticas de caché").unwrap();
        assert!(health_at < cache_at, "health must come first:\n{text}");
        assert!(!text.contains("boom"));

        let mut calls = service.calls();
        calls.sort();
        assert_eq!(calls, ["cache_stats", "health"]);
    }

    #[tokio::test]
    async fn status_fails_on_health_before_printing_cache() {
        let service = FakeService { fail_health: true, ..Default::default() };
        let mut out = Vec::new();
        let cli = Cli::try_parse_from(["climapi", "status"]).unwrap();
        let format = cli.output_format();
        let err = execute(cli.command, &service, format, &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), Operation::HealthStatus.user_message());
        assert!(out.is_empty(), "{}", String::from_utf8_lossy(&out));
    }

    #[tokio::test]
    async fn json_status_is_a_single_document() {
        let service = FakeService::default();
        let text = run_with(&service, &["climapi", "--json", "status"]).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["health"]["status"], "healthy");
        assert_eq!(value["cache"]["entries"], 3);
        assert_eq!(value["cache"]["ttl_minutes"], 15.0);
    }

    #[tokio::test]
    async fn json_status_reports_cache_error_inside_document() {
        let service = FakeService { fail_cache: true, ..Default::default() };
        let text = run_with(&service, &["climapi", "--json", "status"]).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["health"]["service"], "ClimAPI");
        assert_eq!(
            value["cache"]["error"],
            "No se pudieron obtener las estadísticas de caché"
        );
        assert!(!text.contains("boom"));
    }

    #[tokio::test]
    async fn json_status_keeps_document_valid_when_health_fails() {
        let service = FakeService { fail_health: true, ..Default::default() };
        let mut out = Vec::new();
        let cli = Cli::try_parse_from(["climapi", "--json", "status"]).unwrap();
        let format = cli.output_format();
        let result = execute(cli.command, &service, format, &mut out).await;

        assert!(result.is_err());
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["health"]["error"], Operation::HealthStatus.user_message());
        assert_eq!(value["cache"]["entries"], 3);
    }

    #[test]
    fn search_limit_help_states_default() {
        use clap::CommandFactory;

        let cmd = Cli::command();
        let search = cmd.find_subcommand("search").unwrap();
        let limit = search.get_arguments().find(|a| a.get_id() == "limit").unwrap();
        let help = limit.get_help().unwrap().to_string();

        assert_eq!(help, "Maximum number of results (default: 10).");
    }

    #[tokio::test]
    async fn locations_commands_need_no_input() {
        let service = FakeService::default();
        run_with(&service, &["climapi", "popular"]).await.unwrap();
        run_with(&service, &["climapi", "default-location"]).await.unwrap();

        assert_eq!(service.calls(), ["popular", "default"]);
    }
}
