use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::WeatherConfig;
use crate::services::{check_status, http_client, UpstreamError};

const DAY_NAMES: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub location: String,
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temperature: i64,
    pub condition: String,
    /// km/h
    pub wind_speed: i64,
    /// mm over the last hour
    pub precipitation: f64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: String,
    pub temperature: i64,
    pub condition: String,
    pub icon: String,
}

// OpenWeatherMap payloads, only the parts we read

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    name: String,
    sys: OwmSys,
    main: OwmMain,
    weather: Vec<OwmCondition>,
    wind: OwmWind,
    #[serde(default)]
    rain: Option<OwmRain>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastItem>,
}

/// Font Awesome class for an OpenWeatherMap condition group
pub fn weather_icon(condition: &str) -> &'static str {
    match condition {
        "Clear" => "fas fa-sun",
        "Clouds" => "fas fa-cloud",
        "Rain" | "Drizzle" => "fas fa-cloud-rain",
        "Thunderstorm" => "fas fa-bolt",
        "Snow" => "fas fa-snowflake",
        "Mist" | "Fog" => "fas fa-smog",
        _ => "fas fa-cloud",
    }
}

/// Fixed payload served whenever the provider is unavailable
pub fn fallback(location: &str) -> WeatherData {
    let day = |day: &str, temperature, condition: &str, icon: &str| ForecastDay {
        day: day.to_string(),
        temperature,
        condition: condition.to_string(),
        icon: icon.to_string(),
    };
    WeatherData {
        location: location.to_string(),
        current: CurrentWeather {
            temperature: 24,
            condition: "Ensolarado".to_string(),
            wind_speed: 15,
            precipitation: 0.0,
            icon: "fas fa-sun".to_string(),
        },
        forecast: vec![
            day("Qua", 22, "Nublado", "fas fa-cloud-rain"),
            day("Qui", 26, "Sol", "fas fa-sun"),
            day("Sex", 23, "Parcialmente nublado", "fas fa-cloud-sun"),
        ],
    }
}

fn describe(conditions: &[OwmCondition]) -> (String, &'static str) {
    match conditions.first() {
        Some(c) => (c.description.clone(), weather_icon(&c.main)),
        None => (String::new(), weather_icon("")),
    }
}

/// One entry per following day: the 11h-13h local reading when present,
/// otherwise every eighth three-hour sample.
fn daily_forecast(
    items: &[OwmForecastItem],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<ForecastDay> {
    let today = now.with_timezone(&offset).date_naive();

    (1..=3)
        .filter_map(|i| {
            let target = today + Duration::days(i);
            let noon = items.iter().find(|item| {
                offset
                    .timestamp_opt(item.dt, 0)
                    .single()
                    .map(|t| t.date_naive() == target && (11..=13).contains(&t.hour()))
                    .unwrap_or(false)
            });
            let item = noon.or_else(|| items.get(i as usize * 8))?;
            let (condition, icon) = describe(&item.weather);
            Some(ForecastDay {
                day: DAY_NAMES[target.weekday().num_days_from_sunday() as usize].to_string(),
                temperature: item.main.temp.round() as i64,
                condition,
                icon: icon.to_string(),
            })
        })
        .collect()
}

fn assemble(
    current: OwmCurrent,
    forecast: OwmForecast,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> WeatherData {
    let (condition, icon) = describe(&current.weather);
    let location = match current.sys.country {
        Some(country) => format!("{}, {}", current.name, country),
        None => current.name,
    };
    WeatherData {
        location,
        current: CurrentWeather {
            temperature: current.main.temp.round() as i64,
            condition,
            wind_speed: (current.wind.speed * 3.6).round() as i64,
            precipitation: current.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
            icon: icon.to_string(),
        },
        forecast: daily_forecast(&forecast.list, now, offset),
    }
}

/// Current conditions plus a three-day outlook for a city
pub struct WeatherService {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherService {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config,
        }
    }

    /// Never fails: provider errors are logged and the fallback is returned.
    pub async fn get(&self, location: &str) -> WeatherData {
        match self.fetch(location).await {
            Ok(data) => data,
            Err(UpstreamError::NotConfigured(what)) => {
                debug!("Weather provider not configured ({}), serving fallback", what);
                fallback(location)
            }
            Err(e) => {
                warn!("Weather service error for '{}': {}", location, e);
                fallback(location)
            }
        }
    }

    async fn fetch(&self, location: &str) -> Result<WeatherData, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("WEATHER_API_KEY"))?;

        let query = format!("{},{}", location, self.config.country_code);
        let params = [
            ("q", query.as_str()),
            ("appid", api_key),
            ("units", "metric"),
            ("lang", self.config.lang.as_str()),
        ];
        let base = self.config.base_url.trim_end_matches('/');

        let current = async {
            let resp = self.client.get(format!("{}/weather", base)).query(&params).send().await?;
            Ok::<_, UpstreamError>(check_status(resp).await?.json::<OwmCurrent>().await?)
        };
        let forecast = async {
            let resp = self.client.get(format!("{}/forecast", base)).query(&params).send().await?;
            Ok::<_, UpstreamError>(check_status(resp).await?.json::<OwmForecast>().await?)
        };
        let (current, forecast) = futures::try_join!(current, forecast)?;

        let offset = FixedOffset::east_opt(self.config.utc_offset_hours * 3600)
            .ok_or(UpstreamError::Payload("invalid UTC offset".to_string()))?;
        Ok(assemble(current, forecast, Utc::now(), offset))
    }
}
