//! Resolver and pipeline configuration.
//!
//! Every field has a default, so a level file only names what it changes:
//!
//! ```
//! use rebound_contact::config::ResolverConfig;
//!
//! let config = ResolverConfig::from_json_str(r#"{ "ice_friction": 1.05 }"#).unwrap();
//! assert_eq!(config.ice_friction, 1.05);
//! assert_eq!(config.splash_sound.as_deref(), Some("splash"));
//! ```

use serde::{Deserialize, Serialize};

use crate::ContactError;

// ---------------------------------------------------------------------------
// ResolverConfig
// ---------------------------------------------------------------------------

/// Tunables for contact handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Horizontal self-friction applied to a body whose feet are on ice.
    pub ice_friction: f64,
    /// Horizontal self-friction restored when the feet leave the last ice.
    pub default_self_friction: f64,
    /// Sound played when a water listener enters or leaves water. `None`
    /// disables it.
    pub splash_sound: Option<String>,
    /// Decoration spawned at the water surface on entry and exit.
    pub splash_decoration: String,
    /// Treat a CONTINUE for a pair never seen to BEGIN as a BEGIN.
    pub repair_lifecycle: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ice_friction: 1.0175,
            default_self_friction: 1.0,
            splash_sound: Some("splash".to_owned()),
            splash_decoration: "splash".to_owned(),
            repair_lifecycle: true,
        }
    }
}

impl ResolverConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ContactError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Configuration for [`ContactPipeline`](crate::pipeline::ContactPipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fixed time step in seconds per tick. Must be positive and finite.
    pub fixed_dt: f64,
    /// Handler tunables.
    pub resolver: ResolverConfig,
}

impl Default for PipelineConfig {
    /// 60 Hz with default resolver tunables.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            resolver: ResolverConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Check the timestep.
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.fixed_dt > 0.0 && self.fixed_dt.is_finite() {
            Ok(())
        } else {
            Err(ContactError::InvalidTimestep(self.fixed_dt))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
