//! Navigator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Configuration shared by both navigator deployments.
///
/// All fields have defaults, so a host settings file only needs to name the
/// values it overrides:
///
/// ```
/// use waygrid_dispatch::NavigatorConfig;
///
/// let cfg = NavigatorConfig::from_json(r#"{ "solve_interval_ms": 250 }"#).unwrap();
/// assert_eq!(cfg.solve_interval.as_millis(), 250);
/// assert_eq!(cfg.corner_cost, NavigatorConfig::default().corner_cost);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Minimum time between two solver passes.
    #[serde(rename = "solve_interval_ms", with = "millis")]
    pub solve_interval: Duration,
    /// Cost put on a cell occupied by a building.
    pub building_cost: f64,
    /// Cost put on walkable cells touching a building or a wall.
    pub corner_cost: f64,
    /// Name of the worker thread.
    pub worker_name: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            solve_interval: Duration::from_millis(100),
            building_cost: 10.0,
            corner_cost: 2.0,
            worker_name: "waygrid-navigator".to_owned(),
        }
    }
}

impl NavigatorConfig {
    /// Load a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(s: &str) -> Result<Self, DispatchError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn with_solve_interval(mut self, interval: Duration) -> Self {
        self.solve_interval = interval;
        self
    }

    pub fn with_costs(mut self, building_cost: f64, corner_cost: f64) -> Self {
        self.building_cost = building_cost;
        self.corner_cost = corner_cost;
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = NavigatorConfig::default();
        assert_eq!(cfg.solve_interval, Duration::from_millis(100));
        assert_eq!(cfg.building_cost, 10.0);
        assert_eq!(cfg.corner_cost, 2.0);
        assert_eq!(cfg.worker_name, "waygrid-navigator");
    }

    #[test]
    fn json_round_trip_uses_millis() {
        let cfg = NavigatorConfig::default()
            .with_solve_interval(Duration::from_millis(40))
            .with_costs(8.0, 1.5);
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains(r#""solve_interval_ms":40"#));
        assert_eq!(NavigatorConfig::from_json(&json).unwrap(), cfg);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(
            NavigatorConfig::from_json("{}").unwrap(),
            NavigatorConfig::default()
        );
    }

    #[test]
    fn malformed_json_is_codec_error() {
        let err = NavigatorConfig::from_json(r#"{ "building_cost": "high" }"#).unwrap_err();
        assert!(matches!(err, DispatchError::Codec(_)));
    }
}
