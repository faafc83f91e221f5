//! Core library for the ClimAPI weather service client.
//!
//! This crate defines:
//! - Data-transfer types mirroring the backend's JSON
//! - Base URL configuration and its on-disk form
//! - The [`WeatherService`] abstraction and its HTTP implementation
//! - [`ClientRequestError`], the single error every operation returns
//!
//! It is used by `climapi-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod service;

pub use config::{API_URL_ENV, ClientConfig, ConfigFile, DEFAULT_API_URL};
pub use error::{ClientRequestError, ConfigError, FailureKind, Operation};
pub use model::{
    CacheStats, ClearCacheResponse, HealthResponse, LocationInfo, LocationRequest, ServiceInfo,
    WeatherData, WeatherResponse,
};
pub use service::{
    DEFAULT_SEARCH_LIMIT, WeatherService, http::WeatherServiceClient, service_from_config,
};
