// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synthesis configuration.
//!
//! Every dimension and material the hole builder uses comes from one
//! [`SynthesisConfig`] value passed in by the caller. Nothing here is global,
//! so holes stay independently destructible.

use crate::descriptor::HazardKind;
use crate::error::{Error, Result};
use nalgebra::Point3;
use putt_lite_geometry::{SurfaceParams, WallParams};
use serde::{Deserialize, Serialize};

/// Visual material (color + opacity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: [f32; 3],
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_opacity() -> f32 {
    1.0
}

impl Material {
    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self {
            color: [r, g, b],
            opacity: 1.0,
        }
    }
}

/// Materials for every generated part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialPalette {
    pub green: Material,
    pub rim: Material,
    pub wall: Material,
    pub start_marker: Material,
    pub sand: Material,
    pub water: Material,
    pub bumper: Material,
}

impl Default for MaterialPalette {
    fn default() -> Self {
        Self {
            green: Material::opaque(0.22, 0.62, 0.25),
            rim: Material::opaque(0.95, 0.95, 0.95),
            wall: Material::opaque(0.55, 0.35, 0.2),
            start_marker: Material::opaque(1.0, 1.0, 1.0),
            sand: Material::opaque(0.9, 0.8, 0.55),
            water: Material {
                color: [0.2, 0.45, 0.85],
                opacity: 0.8,
            },
            bumper: Material::opaque(0.85, 0.2, 0.2),
        }
    }
}

/// Per-kind hazard dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardKindConfig {
    /// Trigger depth when the descriptor gives none.
    pub default_depth: f64,
    /// How far below the green top the fill sits.
    pub visual_offset: f64,
}

/// Which collider stands in for the green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionSurface {
    /// Box spanning the boundary bounds.
    Slab,
    /// Infinite plane at the green top.
    Plane,
}

/// Hole synthesis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Local Y of the green top.
    pub surface_height: f64,
    pub slab_thickness: f64,
    pub wall_height: f64,
    pub wall_thickness: f64,
    pub cup_radius: f64,
    pub cup_depth: f64,
    /// Width of the ring drawn around the cup.
    pub rim_width: f64,
    pub start_marker_radius: f64,
    /// Extra height allowed above the green when testing for a holed ball.
    pub cup_capture_tolerance: f64,
    pub sand: HazardKindConfig,
    pub water: HazardKindConfig,
    /// Wall segments shorter than this are skipped.
    pub segment_epsilon: f64,
    /// Fixed circle resolution, adaptive when unset.
    pub circle_segments: Option<usize>,
    /// Rectangle used when a boundary has fewer than 3 points.
    pub fallback_width: f64,
    pub fallback_length: f64,
    /// World position of every hole container.
    pub anchor: Point3<f64>,
    pub collision_surface: CollisionSurface,
    /// Clip hazard fills to the course boundary (triggers are never clipped).
    pub clip_fills_to_boundary: bool,
    pub materials: MaterialPalette,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            surface_height: 0.0,
            slab_thickness: 0.2,
            wall_height: 0.5,
            wall_thickness: 0.2,
            cup_radius: 0.35,
            cup_depth: 0.4,
            rim_width: 0.05,
            start_marker_radius: 0.3,
            cup_capture_tolerance: 0.15,
            sand: HazardKindConfig {
                default_depth: 0.3,
                visual_offset: 0.02,
            },
            water: HazardKindConfig {
                default_depth: 0.5,
                visual_offset: 0.05,
            },
            segment_epsilon: 1e-4,
            circle_segments: None,
            fallback_width: 8.0,
            fallback_length: 16.0,
            anchor: Point3::origin(),
            collision_surface: CollisionSurface::Slab,
            clip_fills_to_boundary: true,
            materials: MaterialPalette::default(),
        }
    }
}

impl SynthesisConfig {
    /// Load from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn hazard(&self, kind: HazardKind) -> &HazardKindConfig {
        match kind {
            HazardKind::Sand => &self.sand,
            HazardKind::Water => &self.water,
        }
    }

    pub fn hazard_material(&self, kind: HazardKind) -> Material {
        match kind {
            HazardKind::Sand => self.materials.sand,
            HazardKind::Water => self.materials.water,
        }
    }

    pub fn surface_params(&self) -> SurfaceParams {
        SurfaceParams {
            surface_height: self.surface_height,
            slab_thickness: self.slab_thickness,
            circle_segments: self.circle_segments,
            ..SurfaceParams::default()
        }
    }

    pub fn wall_params(&self) -> WallParams {
        WallParams {
            height: self.wall_height,
            thickness: self.wall_thickness,
            base_height: self.surface_height,
            epsilon: self.segment_epsilon,
        }
    }

    /// Reject dimensions that can never produce geometry.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("slab_thickness", self.slab_thickness),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("cup_radius", self.cup_radius),
            ("cup_depth", self.cup_depth),
            ("start_marker_radius", self.start_marker_radius),
            ("sand.default_depth", self.sand.default_depth),
            ("water.default_depth", self.water.default_depth),
            ("fallback_width", self.fallback_width),
            ("fallback_length", self.fallback_length),
            ("segment_epsilon", self.segment_epsilon),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(Error::InvalidDescriptor(format!(
                    "config {} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("rim_width", self.rim_width),
            ("cup_capture_tolerance", self.cup_capture_tolerance),
            ("sand.visual_offset", self.sand.visual_offset),
            ("water.visual_offset", self.water.visual_offset),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(Error::InvalidDescriptor(format!(
                    "config {} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if !self.surface_height.is_finite() || !self.anchor.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidDescriptor(
                "config surface height and anchor must be finite".to_string(),
            ));
        }
        if self.circle_segments.is_some_and(|n| n < 3) {
            return Err(Error::InvalidDescriptor(
                "config circle_segments must be at least 3".to_string(),
            ));
        }
        Ok(())
    }
}
