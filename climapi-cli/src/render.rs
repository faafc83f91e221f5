//! Human-friendly and JSON rendering of service replies.

use std::io::{self, Write};

use climapi_core::{
    CacheStats, ClearCacheResponse, ClientRequestError, HealthResponse, LocationInfo, ServiceInfo,
    WeatherResponse,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Write `value` either as pretty JSON or through `human`.
pub fn emit<W, T, F>(out: &mut W, format: OutputFormat, value: &T, human: F) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&mut W, &T) -> io::Result<()>,
{
    match format {
        OutputFormat::Human => human(out, value),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)
        }
    }
}

pub fn weather<W: Write>(out: &mut W, resp: &WeatherResponse) -> io::Result<()> {
    location(out, &resp.location)?;
    writeln!(out, "Source: {} (generated {})", resp.source, resp.timestamp)?;

    if resp.data.is_empty() {
        return writeln!(out, "No weather data returned.");
    }

    writeln!(out)?;
    writeln!(
        out,
        "{:<17} {:>8} {:>9} {:>8} {:>10}",
        "Time", "Temp °C", "Humidity", "Rain mm", "Wind km/h"
    )?;
    for point in &resp.data {
        let time = point
            .parsed_time()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| point.time.clone());

        writeln!(
            out,
            "{:<17} {:>8.1} {:>8.0}% {:>8.1} {:>10.1}",
            time, point.temperature, point.humidity, point.precipitation, point.wind_speed
        )?;
    }

    Ok(())
}

pub fn location<W: Write>(out: &mut W, loc: &LocationInfo) -> io::Result<()> {
    writeln!(
        out,
        "{}, {} ({:.4}, {:.4}) [{}]",
        loc.city, loc.country, loc.latitude, loc.longitude, loc.timezone
    )
}

pub fn locations<W: Write>(out: &mut W, locs: &[LocationInfo]) -> io::Result<()> {
    if locs.is_empty() {
        return writeln!(out, "No locations found.");
    }

    for (i, loc) in locs.iter().enumerate() {
        write!(out, "{:>2}. ", i + 1)?;
        location(out, loc)?;
    }
    Ok(())
}

pub fn health<W: Write>(out: &mut W, health: &HealthResponse) -> io::Result<()> {
    writeln!(out, "{}: {} (at {})", health.service, health.status, health.timestamp)
}

pub fn cache_stats<W: Write>(out: &mut W, stats: &CacheStats) -> io::Result<()> {
    writeln!(out, "Cache entries: {}", stats.entries)?;
    writeln!(out, "Cache size:    {}", human_bytes(stats.size))?;
    writeln!(out, "Cache path:    {}", stats.path)?;
    writeln!(out, "TTL:           {} min", stats.ttl_minutes)
}

pub fn cleared<W: Write>(out: &mut W, resp: &ClearCacheResponse) -> io::Result<()> {
    writeln!(out, "{} ({})", resp.message, resp.timestamp)
}

pub fn service_info<W: Write>(out: &mut W, info: &ServiceInfo) -> io::Result<()> {
    writeln!(out, "{} {} [{}]", info.service, info.version, info.status)?;
    writeln!(out, "Docs:   {}", info.docs)?;
    writeln!(out, "Health: {}", info.health)
}

/// One JSON document for `status`; a failed part becomes `{"error": <message>}`.
pub fn status_json<W: Write>(
    out: &mut W,
    health: &Result<HealthResponse, ClientRequestError>,
    cache: &Result<CacheStats, ClientRequestError>,
) -> io::Result<()> {
    let report = serde_json::json!({
        "health": json_section(health)?,
        "cache": json_section(cache)?,
    });

    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

fn json_section<T: Serialize>(
    result: &Result<T, ClientRequestError>,
) -> serde_json::Result<serde_json::Value> {
    match result {
        Ok(value) => serde_json::to_value(value),
        Err(err) => Ok(serde_json::json!({ "error": err.user_message() })),
    }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 { format!("{bytes} B") } else { format!("{value:.1} {}", UNITS[unit]) }
}
