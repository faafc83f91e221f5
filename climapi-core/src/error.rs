use std::fmt;

use thiserror::Error;

/// Every request the client knows how to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CurrentWeather,
    PopularLocations,
    DefaultLocation,
    HealthStatus,
    CacheStats,
    ClearCache,
    SearchLocations,
    ServiceInfo,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CurrentWeather => "current_weather",
            Operation::PopularLocations => "popular_locations",
            Operation::DefaultLocation => "default_location",
            Operation::HealthStatus => "health_status",
            Operation::CacheStats => "cache_stats",
            Operation::ClearCache => "clear_cache",
            Operation::SearchLocations => "search_locations",
            Operation::ServiceInfo => "service_info",
        }
    }

    pub const fn all() -> &'static [Operation] {
        &[
            Operation::CurrentWeather,
            Operation::PopularLocations,
            Operation::DefaultLocation,
            Operation::HealthStatus,
            Operation::CacheStats,
            Operation::ClearCache,
            Operation::SearchLocations,
            Operation::ServiceInfo,
        ]
    }

    /// Fixed message shown to the user when this operation fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            Operation::CurrentWeather => "No se pudieron obtener los datos meteorológicos",
            Operation::PopularLocations => "No se pudieron obtener las ubicaciones populares",
            Operation::DefaultLocation => "No se pudo obtener la ubicación por defecto",
            Operation::HealthStatus => "No se pudo verificar el estado del servicio",
            Operation::CacheStats => "No se pudieron obtener las estadísticas de caché",
            Operation::ClearCache => "No se pudo limpiar la caché",
            Operation::SearchLocations => "No se pudo buscar ubicaciones",
            Operation::ServiceInfo => "No se pudo obtener la información del servicio",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong underneath a [`ClientRequestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No HTTP status was received (DNS, refused connection, reset...).
    Network,
    /// The backend answered with a non-success status.
    HttpStatus(u16),
    /// The body could not be read or did not match the expected shape.
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => f.write_str("network"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Decode => f.write_str("decode"),
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The only error a client operation returns.
///
/// Its `Display` is always the operation's fixed user message, regardless of
/// the cause. The cause stays reachable through [`std::error::Error::source`]
/// and [`ClientRequestError::kind`] for callers that need to branch.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientRequestError {
    operation: Operation,
    kind: FailureKind,
    message: &'static str,
    #[source]
    source: BoxError,
}

impl ClientRequestError {
    pub fn new(operation: Operation, kind: FailureKind, source: impl Into<BoxError>) -> Self {
        Self {
            operation,
            kind,
            message: operation.user_message(),
            source: source.into(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn user_message(&self) -> &'static str {
        self.message
    }
}

/// Startup-time configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}
