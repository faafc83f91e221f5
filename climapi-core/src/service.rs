use crate::{
    CacheStats, ClearCacheResponse, ClientConfig, ClientRequestError, HealthResponse,
    LocationInfo, LocationRequest, ServiceInfo, WeatherResponse,
    service::http::WeatherServiceClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod http;

/// Result count asked for when a search does not name one.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Everything a consumer can ask the ClimAPI backend.
///
/// [`WeatherServiceClient`] is the HTTP implementation; consumers should
/// depend on this trait so a fake can stand in under test.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn get_current_weather(
        &self,
        request: &LocationRequest,
    ) -> Result<WeatherResponse, ClientRequestError>;

    async fn get_popular_locations(&self) -> Result<Vec<LocationInfo>, ClientRequestError>;

    async fn get_default_location(&self) -> Result<LocationInfo, ClientRequestError>;

    async fn get_health_status(&self) -> Result<HealthResponse, ClientRequestError>;

    async fn get_cache_stats(&self) -> Result<CacheStats, ClientRequestError>;

    /// Ask the backend to drop its cache. The client itself holds none.
    async fn clear_cache(&self) -> Result<ClearCacheResponse, ClientRequestError>;

    /// Search with at most `limit` results.
    async fn search_locations_with_limit(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationInfo>, ClientRequestError>;

    /// Search with [`DEFAULT_SEARCH_LIMIT`].
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationInfo>, ClientRequestError> {
        self.search_locations_with_limit(query, DEFAULT_SEARCH_LIMIT).await
    }

    async fn get_service_info(&self) -> Result<ServiceInfo, ClientRequestError>;
}

/// Construct the HTTP-backed service from resolved config.
pub fn service_from_config(config: &ClientConfig) -> Box<dyn WeatherService> {
    Box::new(WeatherServiceClient::new(config))
}
