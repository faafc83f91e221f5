use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A geographic point of interest as known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone identifier, e.g. "Europe/Madrid".
    pub timezone: String,
    pub city: String,
    pub country: String,
}

/// One observation/forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub time: String,
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
}

impl WeatherData {
    /// Parse `time` for display purposes.
    ///
    /// Accepts RFC 3339 as well as the naive `YYYY-MM-DDTHH:MM[:SS]` form the
    /// backend emits for local times. Offsets are dropped.
    pub fn parsed_time(&self) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.time) {
            return Some(dt.naive_local());
        }

        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&self.time, fmt).ok())
    }
}

/// Reply of the current-weather request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub location: LocationInfo,
    /// Points in the order the backend returned them.
    pub data: Vec<WeatherData>,
    pub source: String,
    pub timestamp: String,
}

impl WeatherResponse {
    /// Most recent point, i.e. the last one in backend order.
    pub fn latest(&self) -> Option<&WeatherData> {
        self.data.last()
    }

    /// True when every parseable `time` is non-decreasing.
    ///
    /// Points whose time cannot be parsed are skipped.
    pub fn is_chronological(&self) -> bool {
        let times: Vec<NaiveDateTime> =
            self.data.iter().filter_map(WeatherData::parsed_time).collect();

        times.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Body of the current-weather request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

impl From<&LocationInfo> for LocationRequest {
    fn from(location: &LocationInfo) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            timezone: location.timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

/// Snapshot of the server-side cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    /// Bytes on disk.
    pub size: u64,
    pub path: String,
    pub ttl_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub message: String,
    pub timestamp: String,
}

/// Root descriptor served by the backend at `/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub docs: String,
    pub health: String,
}
