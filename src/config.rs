use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::hydrate::{Field, FieldError, Limits, check_iterations, check_scale, parse_color};
use crate::math::Point2D;
use crate::store::StorePolicy;
use crate::tween::Transition;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid default for {field}: {error}")]
    Invalid { field: Field, error: FieldError },
}

/// Transition lengths for one store, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationsMs {
    pub set: u64,
    pub reset: u64,
}

impl DurationsMs {
    pub const fn new(set: u64, reset: u64) -> Self {
        DurationsMs { set, reset }
    }

    /// Cubic-out for animated transitions, instant for zero.
    pub fn policy(&self) -> StorePolicy {
        let transition = |ms: u64| {
            if ms == 0 { Transition::INSTANT } else { Transition::millis(ms) }
        };
        StorePolicy::new(transition(self.set), transition(self.reset))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Durations {
    pub iterations: DurationsMs,
    pub center: DurationsMs,
    pub scale: DurationsMs,
    pub color: DurationsMs,
}

impl Default for Durations {
    fn default() -> Self {
        Durations {
            iterations: DurationsMs::new(0, 1500),
            center: DurationsMs::new(500, 500),
            scale: DurationsMs::new(0, 500),
            color: DurationsMs::new(0, 500),
        }
    }
}

/// Defaults, animation timing and validation bounds for the view stores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    pub iterations: f64,
    pub center: Point2D,
    pub scale: f64,
    pub bound_color: String,
    pub transition_color: String,
    pub escape_color: String,
    pub durations: Durations,
    pub limits: Limits,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            iterations: 50.0,
            center: Point2D::ORIGIN,
            scale: 1.0,
            bound_color: "#4D80CC".to_string(),
            transition_color: "#BE00CC".to_string(),
            escape_color: "#4D4D4D".to_string(),
            durations: Durations::default(),
            limits: Limits::default(),
        }
    }
}

impl ViewConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        info!("loaded view config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates. Defaults must pass the same checks as query values.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: ViewConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: Field| move |error: FieldError| ConfigError::Invalid { field, error };
        check_iterations(self.iterations, &self.limits).map_err(invalid(Field::Iterations))?;
        check_scale(self.scale, &self.limits).map_err(invalid(Field::Scale))?;
        for (field, hex) in [
            (Field::BoundColor, &self.bound_color),
            (Field::TransitionColor, &self.transition_color),
            (Field::EscapeColor, &self.escape_color),
        ] {
            parse_color(hex).map_err(invalid(field))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_query_schema() {
        let config = ViewConfig::default();
        assert_eq!(config.iterations, 50.0);
        assert_eq!(config.center, Point2D::ORIGIN);
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.bound_color, "#4D80CC");
        assert_eq!(config.limits.max_iterations, 500.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = ViewConfig::from_json(r#"{"iterations": 120, "durations": {"center": {"set": 0, "reset": 250}}}"#).unwrap();
        assert_eq!(config.iterations, 120.0);
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.durations.center, DurationsMs::new(0, 250));
        assert_eq!(config.durations.iterations, DurationsMs::new(0, 1500));
    }

    #[test]
    fn zero_duration_is_instant() {
        let policy = DurationsMs::new(0, 1500).policy();
        assert_eq!(policy.set, Transition::INSTANT);
        assert_eq!(policy.reset, Transition::millis(1500));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(ViewConfig::default().validate().is_ok());
    }

    #[test]
    fn malformed_default_color_is_rejected() {
        let err = ViewConfig::from_json(r#"{"boundColor": "blue"}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: Field::BoundColor, error: FieldError::BadColor(_) }
        ));
    }

    #[test]
    fn out_of_range_defaults_are_rejected() {
        let err = ViewConfig::from_json(r#"{"iterations": 9999}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: Field::Iterations, error: FieldError::TooLarge { .. } }
        ));

        let err = ViewConfig::from_json(r#"{"scale": -3}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: Field::Scale, error: FieldError::TooSmall { .. } }
        ));

        let err = ViewConfig::from_json(r#"{"iterations": 12.5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: Field::Iterations, .. }));
    }

    #[test]
    fn defaults_are_checked_against_configured_limits() {
        let config = ViewConfig::from_json(r#"{"iterations": 900, "limits": {"maxIterations": 1000}}"#).unwrap();
        assert_eq!(config.iterations, 900.0);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(ViewConfig::from_json("{"), Err(ConfigError::Json(_))));
        assert!(matches!(ViewConfig::load("/nonexistent/view.json"), Err(ConfigError::Io(_))));
    }
}
