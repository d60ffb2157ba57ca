//! Reverse geocoding via the business-search endpoint: the nearest
//! business's city stands in for a place name.

use serde::Deserialize;

use crate::models::Location;

use super::RecsSession;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<SearchBusiness>,
}

#[derive(Debug, Deserialize)]
struct SearchBusiness {
    location: Option<Location>,
}

impl RecsSession {
    /// Human-readable place name for coordinates; `None` on any failure.
    pub async fn nearest_city(&self, latitude: f64, longitude: f64) -> Option<String> {
        let api_key = self.config().api_key.as_deref()?;
        let url = format!("{}/businesses/search", self.config().search_base_url);

        let response = self
            .http()
            .get(&url)
            .bearer_auth(api_key)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("limit", "1".to_string()),
                ("sort_by", "distance".to_string()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(status = response.status().as_u16(), "reverse geocode failed");
                return None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "reverse geocode failed");
                return None;
            }
        };

        let data: SearchResponse = match response.json().await {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(error = %err, "reverse geocode returned an unreadable body");
                return None;
            }
        };

        data.businesses
            .into_iter()
            .next()
            .and_then(|business| business.location)
            .and_then(|location| location.city)
            .filter(|city| !city.is_empty())
    }
}
