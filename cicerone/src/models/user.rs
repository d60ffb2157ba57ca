use serde::{Deserialize, Serialize};

/// Fallback coordinates when the caller supplies no fix (lower Manhattan).
pub const DEFAULT_COORDS: (f64, f64) = (40.7128, -74.0060);

/// Per-request user context sent verbatim to the recommendation API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserContext {
    pub locale: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl UserContext {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            locale: "en_US".to_string(),
            latitude,
            longitude,
        }
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::new(DEFAULT_COORDS.0, DEFAULT_COORDS.1)
    }
}

/// Current-conditions snapshot; optional everywhere it appears.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    pub temp_f: f64,
    pub description: String,
    pub icon: Option<String>,
    pub city: Option<String>,
}

/// Caller-supplied location information for a turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationFix {
    pub coords: Option<(f64, f64)>,
    pub city: Option<String>,
    pub radius_miles: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_context() {
        let ctx = UserContext::default();
        assert_eq!(ctx.locale, "en_US");
        assert_eq!(ctx.latitude, 40.7128);
        assert_eq!(ctx.longitude, -74.0060);
    }

    #[test]
    fn test_user_context_serializes_to_wire_shape() {
        let ctx = UserContext::new(40.7233, -74.0030);
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["locale"], "en_US");
        assert_eq!(value["latitude"], 40.7233);
    }
}
