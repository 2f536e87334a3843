//! Current weather from OpenWeather, with a fallback observation.
//!
//! Runs after payment. An unreachable or misbehaving provider yields a
//! flagged fallback observation, never an error.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::UpstreamClient;
use crate::metrics::UPSTREAM_FALLBACKS;

const PROVIDER: &str = "openweather";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub weather: Conditions,
    pub temperature: Temperature,
    pub humidity: u32,
    pub pressure: u32,
    pub wind: Wind,
    pub visibility: Option<u32>,
    pub clouds: u32,
    /// RFC 3339 observation time
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperature {
    pub current: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: Option<f64>,
    pub unit: &'static str,
}

/// A report plus whether it came from the fallback path.
#[derive(Debug, Clone)]
pub struct Observation {
    pub report: WeatherReport,
    pub fallback: bool,
}

// Subset of the OpenWeather 2.5 `weather` response we use.
#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    sys: OwmSys,
    coord: Coordinates,
    weather: Vec<Conditions>,
    main: OwmMain,
    wind: OwmWind,
    visibility: Option<u32>,
    clouds: OwmClouds,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u32,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    #[serde(default)]
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: u32,
}

impl OwmResponse {
    fn into_report(self) -> WeatherReport {
        let weather = self.weather.into_iter().next().unwrap_or(Conditions {
            main: "Unknown".to_string(),
            description: "no conditions reported".to_string(),
            icon: String::new(),
        });
        WeatherReport {
            city: self.name,
            country: self.sys.country.unwrap_or_default(),
            coordinates: self.coord,
            weather,
            temperature: Temperature {
                current: self.main.temp,
                feels_like: self.main.feels_like,
                min: self.main.temp_min,
                max: self.main.temp_max,
                unit: "Celsius",
            },
            humidity: self.main.humidity,
            pressure: self.main.pressure,
            wind: Wind {
                speed: self.wind.speed,
                deg: self.wind.deg,
                unit: "m/s",
            },
            visibility: self.visibility,
            clouds: self.clouds.all,
            timestamp: iso_timestamp(self.dt),
        }
    }
}

fn iso_timestamp(unix_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fixed observation served when the provider cannot be reached.
pub fn fallback_report(city: &str) -> WeatherReport {
    WeatherReport {
        city: city.to_string(),
        country: "UK".to_string(),
        coordinates: Coordinates {
            lat: 51.51,
            lon: -0.13,
        },
        weather: Conditions {
            main: "Rain".to_string(),
            description: "light rain".to_string(),
            icon: "10d".to_string(),
        },
        temperature: Temperature {
            current: 15.5,
            feels_like: 14.8,
            min: 14.0,
            max: 16.0,
            unit: "Celsius",
        },
        humidity: 82,
        pressure: 1012,
        wind: Wind {
            speed: 4.1,
            deg: Some(240.0),
            unit: "m/s",
        },
        visibility: Some(10_000),
        clouds: 90,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Current conditions for `city`. Never fails; see [`Observation::fallback`].
pub async fn current(client: &UpstreamClient, base_url: &str, api_key: &str, city: &str) -> Observation {
    match fetch(client, base_url, api_key, city).await {
        Ok(report) => Observation {
            report,
            fallback: false,
        },
        Err(reason) => {
            tracing::warn!(city = %city, reason = %reason, "weather provider unavailable, serving fallback");
            UPSTREAM_FALLBACKS.with_label_values(&[PROVIDER]).inc();
            Observation {
                report: fallback_report(city),
                fallback: true,
            }
        }
    }
}

async fn fetch(
    client: &UpstreamClient,
    base_url: &str,
    api_key: &str,
    city: &str,
) -> Result<WeatherReport, String> {
    let base = super::endpoint(base_url, &["data", "2.5", "weather"]).map_err(|e| e.to_string())?;
    let url = url::Url::parse_with_params(
        base.as_str(),
        &[("q", city), ("appid", api_key), ("units", "metric")],
    )
    .map_err(|e| e.to_string())?;

    let resp = client.get(PROVIDER, url).await.map_err(|e| {
        if e.is_timeout() {
            "timed out".to_string()
        } else {
            e.to_string()
        }
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(format!("status {status}"));
    }

    resp.json::<OwmResponse>()
        .await
        .map(OwmResponse::into_report)
        .map_err(|e| format!("unreadable body: {}", e.without_url()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 12.3, "feels_like": 11.2, "temp_min": 10.9, "temp_max": 13.4, "pressure": 1008, "humidity": 87},
        "visibility": 10000,
        "wind": {"speed": 5.14, "deg": 250},
        "clouds": {"all": 75},
        "dt": 1700000000,
        "sys": {"country": "GB"},
        "name": "London"
    }"#;

    #[test]
    fn test_maps_provider_response() {
        let raw: OwmResponse = serde_json::from_str(SAMPLE).unwrap();
        let report = raw.into_report();
        assert_eq!(report.city, "London");
        assert_eq!(report.country, "GB");
        assert_eq!(report.weather.main, "Rain");
        assert_eq!(report.temperature.current, 12.3);
        assert_eq!(report.temperature.unit, "Celsius");
        assert_eq!(report.humidity, 87);
        assert_eq!(report.wind.deg, Some(250.0));
        assert_eq!(report.timestamp, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_report_json_shape() {
        let raw: OwmResponse = serde_json::from_str(SAMPLE).unwrap();
        let json = serde_json::to_value(raw.into_report()).unwrap();
        assert_eq!(json["coordinates"]["lat"], 51.5085);
        assert_eq!(json["temperature"]["feels_like"], 11.2);
        assert_eq!(json["wind"]["unit"], "m/s");
        assert_eq!(json["clouds"], 75);
    }

    #[test]
    fn test_fallback_keeps_requested_city() {
        let report = fallback_report("Paris");
        assert_eq!(report.city, "Paris");
        assert_eq!(report.weather.description, "light rain");
    }

    #[tokio::test]
    async fn test_unreachable_provider_falls_back() {
        let client = UpstreamClient::new().unwrap();
        let obs = current(&client, "http://127.0.0.1:1", "key", "Tokyo").await;
        assert!(obs.fallback);
        assert_eq!(obs.report.city, "Tokyo");
    }
}
