//! Per-frame mapping from scene state to render parameters.
//!
//! # Responsibility
//! - Compute shader uniforms (time, rotation, dim factor).
//! - Compute per-star scale and intensity.
//! - Compute constellation lines for the focused category.
//!
//! # Invariants
//! - Every function here is pure and infallible. The only value carried
//!   across frames is the previous dim factor, passed in by the caller.
//! - The dim factor eases toward its target; it never snaps.

use crate::config::RenderConfig;
use crate::interaction::state::InteractionState;
use crate::model::star::{StarId, StarPoint};
use std::f32::consts::TAU;

/// Global shader uniforms for the nebula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub time: f32,
    /// Scene yaw in radians; grows without bound.
    pub rotation: f32,
    pub dim_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarEmphasis {
    Idle,
    Selected,
    Hovered,
}

/// Live visual state of one star for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarVisual {
    pub id: StarId,
    pub emphasis: StarEmphasis,
    pub scale: f32,
    /// Color/alpha multiplier in `[1 - flicker_depth, 1]`.
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstellationLine {
    pub from: StarId,
    pub to: StarId,
    pub start: [f32; 3],
    pub end: [f32; 3],
}

/// Line set joining the focused category's stars in storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct Constellation {
    pub category: String,
    pub opacity: f32,
    pub lines: Vec<ConstellationLine>,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParameters {
    pub uniforms: Uniforms,
    pub stars: Vec<StarVisual>,
    pub constellation: Option<Constellation>,
}

/// Inputs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Seconds since the animation clock started.
    pub time: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Dim factor produced by the previous frame.
    pub previous_dim: f32,
    pub stars: &'a [StarPoint],
    pub interaction: &'a InteractionState,
}

/// Stateless frame mapper bound to one [`RenderConfig`].
#[derive(Debug, Clone, Default)]
pub struct RenderStateBridge {
    config: RenderConfig,
}

impl RenderStateBridge {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn frame(&self, input: &FrameInput<'_>) -> RenderParameters {
        let config = &self.config;
        let active = input.interaction.active_category();
        let hovered = input.interaction.hovered_star();

        let target = dim_target(active.is_some(), config);
        let uniforms = Uniforms {
            time: input.time,
            rotation: input.time * config.rotation_rate,
            dim_factor: smooth_dim(input.previous_dim, target, input.delta, config),
        };

        let stars = input
            .stars
            .iter()
            .map(|star| {
                let emphasis = if hovered == Some(star.id) {
                    StarEmphasis::Hovered
                } else if active == Some(star.category.as_str()) {
                    StarEmphasis::Selected
                } else {
                    StarEmphasis::Idle
                };
                star_visual(star.id, emphasis, input.time, config)
            })
            .collect();

        let constellation =
            active.and_then(|category| constellation(input.stars, category, input.time, config));

        RenderParameters {
            uniforms,
            stars,
            constellation,
        }
    }
}

/// Dim target: full brightness unless a category is focused.
pub fn dim_target(focused: bool, config: &RenderConfig) -> f32 {
    if focused {
        config.focus_dim
    } else {
        1.0
    }
}

/// Exponential approach of `current` toward `target` over `delta` seconds.
pub fn smooth_dim(current: f32, target: f32, delta: f32, config: &RenderConfig) -> f32 {
    let delta = if delta.is_finite() {
        delta.clamp(0.0, config.max_frame_delta)
    } else {
        0.0
    };
    let alpha = 1.0 - (-config.dim_smoothing_rate * delta).exp();
    current + (target - current) * alpha
}

/// Stable flicker phase and speed derived from the star id.
pub fn star_flicker(id: StarId, config: &RenderConfig) -> (f32, f32) {
    let (high, low) = id.as_u64_pair();
    let phase = unit_fraction(high) * TAU;
    let speed = config.min_flicker_speed
        + unit_fraction(low) * (config.max_flicker_speed - config.min_flicker_speed);
    (phase, speed)
}

pub fn star_visual(
    id: StarId,
    emphasis: StarEmphasis,
    time: f32,
    config: &RenderConfig,
) -> StarVisual {
    let (phase, flicker_speed) = star_flicker(id, config);
    let breathing =
        1.0 + config.breathing_amplitude * (time * config.breathing_speed + phase).sin();
    let pulse = match emphasis {
        StarEmphasis::Hovered => {
            config.hover_scale
                + config.hover_pulse_amplitude * (time * config.hover_pulse_speed).sin()
        }
        StarEmphasis::Selected => {
            config.selection_scale
                + config.selection_pulse_amplitude * (time * config.selection_pulse_speed).sin()
        }
        StarEmphasis::Idle => 1.0,
    };
    let wave = 0.5 + 0.5 * (time * flicker_speed + phase).sin();

    StarVisual {
        id,
        emphasis,
        scale: breathing * pulse,
        intensity: (1.0 - config.flicker_depth) + config.flicker_depth * wave,
    }
}

/// Lines between consecutive stars of `category`, or `None` below two stars.
pub fn constellation(
    stars: &[StarPoint],
    category: &str,
    time: f32,
    config: &RenderConfig,
) -> Option<Constellation> {
    let members: Vec<&StarPoint> = stars
        .iter()
        .filter(|star| star.category == category)
        .collect();
    if members.len() < 2 {
        return None;
    }

    let lines = members
        .windows(2)
        .map(|pair| ConstellationLine {
            from: pair[0].id,
            to: pair[1].id,
            start: pair[0].position,
            end: pair[1].position,
        })
        .collect();
    let opacity = (config.line_base_opacity
        + config.line_opacity_amplitude * (time * config.line_opacity_speed).sin())
    .clamp(0.0, 1.0);

    Some(Constellation {
        category: category.to_string(),
        opacity,
        lines,
    })
}

fn unit_fraction(value: u64) -> f32 {
    (value % 1_000_000) as f32 / 1_000_000.0
}
