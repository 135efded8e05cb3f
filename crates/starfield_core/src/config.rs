//! Tunable constants for generation, spawning, interaction and rendering.
//!
//! # Responsibility
//! - Hold every numeric knob in one serde-friendly tree.
//! - Accept partial JSON overrides from the host application.
//!
//! # Invariants
//! - Every field has a default; missing JSON keys fall back to it.
//! - `validate()` must pass before a config reaches the generator.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Configuration load/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "failed to parse starfield config: {err}"),
            Self::Invalid(message) => write!(f, "invalid starfield config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Nebula generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    pub particle_count: usize,
    pub background_star_count: usize,
    /// Probability that one particle lands on a trajectory.
    pub highlight_probability: f32,
    pub trajectory_count: usize,
    /// Segment mask value above which a trajectory particle glows.
    pub segment_threshold: f32,
    pub ambient_max_radius: f32,
    pub disc_half_thickness: f32,
    /// Extra angle per unit radius, producing spiral arms.
    pub spiral_shear: f32,
    pub background_radius: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 45_000,
            background_star_count: 3_000,
            highlight_probability: 0.12,
            trajectory_count: 7,
            segment_threshold: 0.15,
            ambient_max_radius: 55.0,
            disc_half_thickness: 6.0,
            spiral_shear: 0.12,
            background_radius: 400.0,
        }
    }
}

/// Star spawn placement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpawnConfig {
    pub max_radius: f32,
    pub radial_exponent: f32,
    /// Half-height of the uniform vertical band.
    pub vertical_band: f32,
    pub min_size: f32,
    pub max_size: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_radius: 40.0,
            radial_exponent: 1.4,
            vertical_band: 4.0,
            min_size: 0.8,
            max_size: 1.4,
        }
    }
}

/// Pointer interaction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionConfig {
    /// Max screen distance between pointer and a category anchor for a drop.
    pub drag_snap_threshold_px: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_snap_threshold_px: 150.0,
        }
    }
}

/// Per-frame animation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Scene rotation in radians per second.
    pub rotation_rate: f32,
    pub focus_dim: f32,
    /// Exponential approach rate of the dim factor, per second.
    pub dim_smoothing_rate: f32,
    pub breathing_amplitude: f32,
    pub breathing_speed: f32,
    pub hover_scale: f32,
    pub hover_pulse_amplitude: f32,
    pub hover_pulse_speed: f32,
    pub selection_scale: f32,
    pub selection_pulse_amplitude: f32,
    pub selection_pulse_speed: f32,
    pub flicker_depth: f32,
    pub min_flicker_speed: f32,
    pub max_flicker_speed: f32,
    pub line_base_opacity: f32,
    pub line_opacity_amplitude: f32,
    pub line_opacity_speed: f32,
    /// Upper bound on one frame step, in seconds.
    pub max_frame_delta: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            rotation_rate: 0.02,
            focus_dim: 0.2,
            dim_smoothing_rate: 3.0,
            breathing_amplitude: 0.12,
            breathing_speed: 1.5,
            hover_scale: 1.8,
            hover_pulse_amplitude: 0.3,
            hover_pulse_speed: 8.0,
            selection_scale: 1.3,
            selection_pulse_amplitude: 0.15,
            selection_pulse_speed: 3.0,
            flicker_depth: 0.25,
            min_flicker_speed: 1.0,
            max_flicker_speed: 3.5,
            line_base_opacity: 0.35,
            line_opacity_amplitude: 0.2,
            line_opacity_speed: 2.0,
            max_frame_delta: 0.25,
        }
    }
}

/// Root configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StarfieldConfig {
    pub field: FieldConfig,
    pub spawn: SpawnConfig,
    pub interaction: InteractionConfig,
    pub render: RenderConfig,
}

impl StarfieldConfig {
    /// Parses a (possibly partial) JSON document and validates it.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = &self.field;
        if field.trajectory_count == 0 {
            return Err(invalid("field.trajectoryCount must be at least 1"));
        }
        if !(0.0..=1.0).contains(&field.highlight_probability) {
            return Err(invalid("field.highlightProbability must be within [0, 1]"));
        }
        require_positive("field.ambientMaxRadius", field.ambient_max_radius)?;
        require_positive("field.backgroundRadius", field.background_radius)?;
        require_finite("field.discHalfThickness", field.disc_half_thickness)?;
        require_finite("field.spiralShear", field.spiral_shear)?;
        require_finite("field.segmentThreshold", field.segment_threshold)?;

        let spawn = &self.spawn;
        require_positive("spawn.maxRadius", spawn.max_radius)?;
        require_positive("spawn.radialExponent", spawn.radial_exponent)?;
        require_finite("spawn.verticalBand", spawn.vertical_band)?;
        if !(spawn.min_size > 0.0 && spawn.min_size <= spawn.max_size) {
            return Err(invalid("spawn size range must satisfy 0 < minSize <= maxSize"));
        }

        require_positive(
            "interaction.dragSnapThresholdPx",
            self.interaction.drag_snap_threshold_px,
        )?;

        let render = &self.render;
        if !(0.0..=1.0).contains(&render.focus_dim) {
            return Err(invalid("render.focusDim must be within [0, 1]"));
        }
        require_positive("render.dimSmoothingRate", render.dim_smoothing_rate)?;
        require_positive("render.maxFrameDelta", render.max_frame_delta)?;
        if render.min_flicker_speed > render.max_flicker_speed {
            return Err(invalid("render flicker speed range is reversed"));
        }
        for (name, value) in [
            ("render.rotationRate", render.rotation_rate),
            ("render.breathingAmplitude", render.breathing_amplitude),
            ("render.breathingSpeed", render.breathing_speed),
            ("render.hoverScale", render.hover_scale),
            ("render.hoverPulseAmplitude", render.hover_pulse_amplitude),
            ("render.hoverPulseSpeed", render.hover_pulse_speed),
            ("render.selectionScale", render.selection_scale),
            ("render.selectionPulseAmplitude", render.selection_pulse_amplitude),
            ("render.selectionPulseSpeed", render.selection_pulse_speed),
            ("render.flickerDepth", render.flicker_depth),
            ("render.minFlickerSpeed", render.min_flicker_speed),
            ("render.maxFlickerSpeed", render.max_flicker_speed),
            ("render.lineBaseOpacity", render.line_base_opacity),
            ("render.lineOpacityAmplitude", render.line_opacity_amplitude),
            ("render.lineOpacitySpeed", render.line_opacity_speed),
        ] {
            require_finite(name, value)?;
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

fn require_finite(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be finite")))
    }
}

fn require_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive")))
    }
}
