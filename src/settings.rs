//! Controller & Part Configuration
//!
//! Plain data structs with sensible defaults. Both derive serde so a host can
//! keep them next to its other block definitions.
//!
//! ```rust,ignore
//! use anima::settings::{ControllerSettings, PartOptions};
//!
//! let settings = ControllerSettings {
//!     cull_distance: Some(500.0),
//!     ..Default::default()
//! };
//! let controller = AnimaController::with_settings(repository, settings);
//! ```

use serde::{Deserialize, Serialize};

/// Per-part creation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartOptions {
    /// Blend neighbouring keyframes instead of stepping frame by frame.
    pub smooth: bool,
    /// Initial visibility flag.
    pub visible: bool,
}

impl Default for PartOptions {
    fn default() -> Self {
        Self {
            smooth: false,
            visible: true,
        }
    }
}

/// Controller-wide behavior.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// When set, `tick()` disables the controller while the viewpoint is at
    /// least this far from the root entity.
    pub cull_distance: Option<f64>,
    /// Options used by `add_default_part`.
    pub part_defaults: PartOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: ControllerSettings =
            serde_json::from_str(r#"{ "cull_distance": 250.0 }"#).unwrap();
        assert_eq!(settings.cull_distance, Some(250.0));
        assert_eq!(settings.part_defaults, PartOptions::default());
    }
}
