use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::error::{CiceroneError, Result};
use crate::models::WeatherSnapshot;

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: Option<MainBlock>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: Option<String>,
    icon: Option<String>,
}

/// Current-conditions client. Failures are hard here; the orchestrator
/// treats weather as optional and swallows them.
#[derive(Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(CiceroneError::MissingCredential { service: "weather" });
        };

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("units", "imperial".to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CiceroneError::upstream(
                "weather",
                Some(status.as_u16()),
                None,
                body,
            ));
        }

        let data: WeatherResponse = response.json().await?;
        let Some(temp_f) = data.main.and_then(|main| main.temp) else {
            return Err(CiceroneError::upstream(
                "weather",
                None,
                None,
                "weather response missing temperature",
            ));
        };

        let condition = data.weather.into_iter().next();
        Ok(WeatherSnapshot {
            temp_f,
            description: condition
                .as_ref()
                .and_then(|c| c.description.clone())
                .unwrap_or_else(|| "Unknown conditions".to_string()),
            icon: condition.and_then(|c| c.icon),
            city: data.name,
        })
    }
}
