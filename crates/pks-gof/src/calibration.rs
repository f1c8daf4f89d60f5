//! Energy-calibration configuration helpers.
//!
//! The configuration provider hands this crate a nested key-value
//! structure (JSON); these functions resolve the effective per-detector
//! record and the per-peak fit windows. Schema validation is out of
//! scope.

use pks_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A configured peak line: calibration energy plus the fit window half
/// widths on either side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakLineConfig {
    /// Peak center energy.
    pub center: f64,
    /// Window extent below the center.
    pub left_size: f64,
    /// Window extent above the center.
    pub right_size: f64,
}

/// Recursively merge JSON object `override_with` over `base`.
fn merge_objects(base: &Value, override_with: &Value) -> Value {
    match (base, override_with) {
        (Value::Object(base_map), Value::Object(over_map)) => {
            let mut merged = base_map.clone();
            for (key, over_val) in over_map {
                let entry = match merged.get(key) {
                    Some(base_val) => merge_objects(base_val, over_val),
                    None => over_val.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        _ => override_with.clone(),
    }
}

/// Effective configuration for one detector: the detector-specific
/// override object merged recursively over the `"default"` record.
///
/// A detector with no override gets the default record unchanged. Fails
/// with [`Error::Validation`] when the `"default"` record is missing or
/// not an object.
pub fn detector_config(config: &Value, detector: &str) -> Result<Value> {
    let default = config
        .get("default")
        .ok_or_else(|| Error::Validation("calibration config has no 'default' record".into()))?;
    if !default.is_object() {
        return Err(Error::Validation("calibration 'default' record must be an object".into()));
    }
    match config.get(detector) {
        Some(over) => Ok(merge_objects(default, over)),
        None => Ok(default.clone()),
    }
}

/// Fit window per peak label: the closed interval
/// `[center - left_size, center + right_size]` for each configured line.
pub fn peak_windows(lines: &BTreeMap<String, PeakLineConfig>) -> BTreeMap<String, (f64, f64)> {
    lines
        .iter()
        .map(|(label, line)| {
            (label.clone(), (line.center - line.left_size, line.center + line.right_size))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detector_override_merges_over_default() {
        let config = json!({
            "default": {"n_samples": 1000, "fit": {"tail": true, "step": true}},
            "det07": {"fit": {"tail": false}}
        });
        let merged = detector_config(&config, "det07").unwrap();
        assert_eq!(merged["n_samples"], 1000);
        assert_eq!(merged["fit"]["tail"], false);
        assert_eq!(merged["fit"]["step"], true);
    }

    #[test]
    fn unknown_detector_falls_back_to_default() {
        let config = json!({"default": {"n_samples": 500}});
        let merged = detector_config(&config, "det99").unwrap();
        assert_eq!(merged, json!({"n_samples": 500}));
    }

    #[test]
    fn missing_default_is_rejected() {
        let config = json!({"det07": {}});
        assert!(matches!(detector_config(&config, "det07"), Err(Error::Validation(_))));
        let config = json!({"default": 3});
        assert!(matches!(detector_config(&config, "det07"), Err(Error::Validation(_))));
    }

    #[test]
    fn peak_windows_are_closed_intervals_around_centers() {
        let mut lines = BTreeMap::new();
        lines.insert(
            "K40".to_string(),
            PeakLineConfig { center: 1460.8, left_size: 10.0, right_size: 12.0 },
        );
        lines.insert(
            "Tl208".to_string(),
            PeakLineConfig { center: 2614.5, left_size: 20.0, right_size: 20.0 },
        );
        let windows = peak_windows(&lines);
        assert_eq!(windows["K40"], (1450.8, 1472.8));
        assert_eq!(windows["Tl208"], (2594.5, 2634.5));
    }

    #[test]
    fn peak_line_config_deserializes_from_json() {
        let line: PeakLineConfig =
            serde_json::from_value(json!({"center": 583.2, "left_size": 8.0, "right_size": 8.0}))
                .unwrap();
        assert_eq!(line.center, 583.2);
    }
}
