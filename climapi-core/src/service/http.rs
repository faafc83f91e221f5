use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, header::ACCEPT};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, instrument, warn};

use crate::{
    CacheStats, ClearCacheResponse, ClientConfig, ClientRequestError, FailureKind,
    HealthResponse, LocationInfo, LocationRequest, Operation, ServiceInfo, WeatherResponse,
};

use super::WeatherService;

const CURRENT_WEATHER_PATH: &str = "/api/v1/weather/current";
const POPULAR_LOCATIONS_PATH: &str = "/api/v1/locations/popular";
const DEFAULT_LOCATION_PATH: &str = "/api/v1/locations/default";
const SEARCH_LOCATIONS_PATH: &str = "/api/v1/locations/search";
const HEALTH_PATH: &str = "/api/v1/health";
const CACHE_STATS_PATH: &str = "/api/v1/cache/stats";
const CACHE_PATH: &str = "/api/v1/cache";
const ROOT_PATH: &str = "/";

/// HTTP client for the ClimAPI backend.
///
/// Stateless apart from the base URL and the pooled `reqwest::Client`;
/// cloning is cheap and clones share connections. No timeout is set unless
/// the injected `reqwest::Client` carries one.
#[derive(Debug, Clone)]
pub struct WeatherServiceClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    query: &'a str,
    limit: usize,
}

impl WeatherServiceClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http(config, Client::new())
    }

    /// Use a caller-built transport, e.g. one with a timeout or proxy.
    pub fn with_http(config: &ClientConfig, http: Client) -> Self {
        Self { base_url: config.base_url().to_string(), http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, operation: Operation, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%operation, %method, %url, "Sending ClimAPI request");

        self.http.request(method, url).header(ACCEPT, "application/json")
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, ClientRequestError> {
        let res = request
            .send()
            .await
            .map_err(|e| failure(operation, FailureKind::Network, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| failure(operation, FailureKind::Decode, e))?;

        if !status.is_success() {
            return Err(failure(
                operation,
                FailureKind::HttpStatus(status.as_u16()),
                format!("ClimAPI answered {status}: {}", truncate_body(&body)),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            failure(
                operation,
                FailureKind::Decode,
                format!("{e}; body: {}", truncate_body(&body)),
            )
        })
    }
}

#[async_trait]
impl WeatherService for WeatherServiceClient {
    #[instrument(skip(self), fields(lat = %request.latitude, lon = %request.longitude))]
    async fn get_current_weather(
        &self,
        request: &LocationRequest,
    ) -> Result<WeatherResponse, ClientRequestError> {
        let op = Operation::CurrentWeather;
        let builder = self.request(op, Method::POST, CURRENT_WEATHER_PATH).json(request);

        let response: WeatherResponse = self.send(op, builder).await?;

        debug!(
            city = %response.location.city,
            points = response.data.len(),
            source = %response.source,
            "Weather received"
        );
        if !response.is_chronological() {
            warn!(city = %response.location.city, "Weather points are not in ascending time order");
        }

        Ok(response)
    }

    #[instrument(skip(self))]
    async fn get_popular_locations(&self) -> Result<Vec<LocationInfo>, ClientRequestError> {
        let op = Operation::PopularLocations;
        let locations: Vec<LocationInfo> =
            self.send(op, self.request(op, Method::GET, POPULAR_LOCATIONS_PATH)).await?;

        debug!(count = locations.len(), "Popular locations received");
        Ok(locations)
    }

    #[instrument(skip(self))]
    async fn get_default_location(&self) -> Result<LocationInfo, ClientRequestError> {
        let op = Operation::DefaultLocation;
        self.send(op, self.request(op, Method::GET, DEFAULT_LOCATION_PATH)).await
    }

    #[instrument(skip(self))]
    async fn get_health_status(&self) -> Result<HealthResponse, ClientRequestError> {
        let op = Operation::HealthStatus;
        self.send(op, self.request(op, Method::GET, HEALTH_PATH)).await
    }

    #[instrument(skip(self))]
    async fn get_cache_stats(&self) -> Result<CacheStats, ClientRequestError> {
        let op = Operation::CacheStats;
        self.send(op, self.request(op, Method::GET, CACHE_STATS_PATH)).await
    }

    #[instrument(skip(self))]
    async fn clear_cache(&self) -> Result<ClearCacheResponse, ClientRequestError> {
        let op = Operation::ClearCache;
        self.send(op, self.request(op, Method::DELETE, CACHE_PATH)).await
    }

    #[instrument(skip(self))]
    async fn search_locations_with_limit(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationInfo>, ClientRequestError> {
        let op = Operation::SearchLocations;
        let builder = self
            .request(op, Method::GET, SEARCH_LOCATIONS_PATH)
            .query(&SearchParams { query, limit });

        let mut locations: Vec<LocationInfo> = self.send(op, builder).await?;

        if locations.len() > limit {
            warn!(returned = locations.len(), limit, "Backend ignored search limit; truncating");
            locations.truncate(limit);
        }

        debug!(count = locations.len(), "Search results received");
        Ok(locations)
    }

    #[instrument(skip(self))]
    async fn get_service_info(&self) -> Result<ServiceInfo, ClientRequestError> {
        let op = Operation::ServiceInfo;
        self.send(op, self.request(op, Method::GET, ROOT_PATH)).await
    }
}

/// Log the underlying cause and wrap it in the operation's fixed error.
fn failure(
    operation: Operation,
    kind: FailureKind,
    cause: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> ClientRequestError {
    let cause = cause.into();
    error!(%operation, %kind, error = %cause, "ClimAPI request failed");
    ClientRequestError::new(operation, kind, cause)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
