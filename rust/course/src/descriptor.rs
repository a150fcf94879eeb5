// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authored hole data.
//!
//! Descriptors are immutable input. Ground-plane points are `[x, z]` pairs,
//! world positions are `[x, y, z]`.

use crate::config::SynthesisConfig;
use crate::error::{Error, Result};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// One hole of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleDescriptor {
    /// 0-based position in the course.
    pub index: usize,
    pub par: u32,
    /// Implicitly closed polygon. Fewer than 3 points selects the fallback rectangle.
    #[serde(default)]
    pub boundary: Vec<Point2<f64>>,
    /// Where the ball is placed when the hole begins.
    #[serde(default)]
    pub start: Option<Point3<f64>>,
    /// Cup center.
    pub hole: Point3<f64>,
    #[serde(default)]
    pub hazards: Vec<HazardDescriptor>,
    #[serde(default)]
    pub bumpers: Vec<BumperDescriptor>,
}

impl HoleDescriptor {
    /// Per-hole checks. Hazards and bumpers are checked individually at
    /// synthesis time so one bad item does not reject the hole.
    pub fn validate(&self) -> Result<()> {
        if self.par == 0 {
            return Err(Error::InvalidDescriptor(format!(
                "hole {} par must be positive",
                self.index
            )));
        }
        if !is_finite3(&self.hole) {
            return Err(Error::InvalidDescriptor(format!(
                "hole {} cup position is not finite",
                self.index
            )));
        }
        if self.start.is_some_and(|s| !is_finite3(&s)) {
            return Err(Error::InvalidDescriptor(format!(
                "hole {} start position is not finite",
                self.index
            )));
        }
        if self
            .boundary
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(Error::InvalidDescriptor(format!(
                "hole {} boundary has a non-finite point",
                self.index
            )));
        }
        Ok(())
    }
}

/// Hazard kind. Visual only: the collision handler reads it off the trigger tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Sand,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardShape {
    Circle,
    Rectangle,
    Compound,
}

/// One circle of a compound hazard, relative to the parent position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubShape {
    /// `[x, z]` offset
    pub offset: Vector2<f64>,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardDescriptor {
    pub kind: HazardKind,
    pub shape: HazardShape,
    pub position: Point3<f64>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub sub_shapes: Vec<SubShape>,
}

/// Validated hazard outline.
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    Circle { center: Point2<f64>, radius: f64 },
    Rect { center: Point2<f64>, width: f64, length: f64 },
}

impl HazardDescriptor {
    pub fn circle(kind: HazardKind, position: Point3<f64>, radius: f64) -> Self {
        Self {
            kind,
            shape: HazardShape::Circle,
            position,
            radius: Some(radius),
            width: None,
            length: None,
            depth: None,
            sub_shapes: Vec::new(),
        }
    }

    pub fn rectangle(kind: HazardKind, position: Point3<f64>, width: f64, length: f64) -> Self {
        Self {
            kind,
            shape: HazardShape::Rectangle,
            position,
            radius: None,
            width: Some(width),
            length: Some(length),
            depth: None,
            sub_shapes: Vec::new(),
        }
    }

    pub fn compound(kind: HazardKind, position: Point3<f64>, sub_shapes: Vec<SubShape>) -> Self {
        Self {
            kind,
            shape: HazardShape::Compound,
            position,
            radius: None,
            width: None,
            length: None,
            depth: None,
            sub_shapes,
        }
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Authored depth, or the kind default.
    pub fn resolved_depth(&self, config: &SynthesisConfig) -> Result<f64> {
        let depth = self
            .depth
            .unwrap_or_else(|| config.hazard(self.kind).default_depth);
        if !(depth > 0.0) || !depth.is_finite() {
            return Err(Error::InvalidDescriptor(format!(
                "hazard depth must be positive, got {}",
                depth
            )));
        }
        Ok(depth)
    }

    /// World ground-plane footprints: one for circle/rectangle, one circle per
    /// sub-shape for compound.
    pub fn footprints(&self) -> Result<Vec<Footprint>> {
        if !is_finite3(&self.position) {
            return Err(Error::InvalidDescriptor(
                "hazard position is not finite".to_string(),
            ));
        }
        let center = Point2::new(self.position.x, self.position.z);

        match self.shape {
            HazardShape::Circle => {
                let radius = require_positive(self.radius, "circle hazard radius")?;
                Ok(vec![Footprint::Circle { center, radius }])
            }
            HazardShape::Rectangle => {
                let width = require_positive(self.width, "rectangle hazard width")?;
                let length = require_positive(self.length, "rectangle hazard length")?;
                Ok(vec![Footprint::Rect {
                    center,
                    width,
                    length,
                }])
            }
            HazardShape::Compound => {
                if self.sub_shapes.is_empty() {
                    return Err(Error::InvalidDescriptor(
                        "compound hazard has no sub-shapes".to_string(),
                    ));
                }
                self.sub_shapes
                    .iter()
                    .map(|sub| {
                        if !sub.offset.iter().all(|c| c.is_finite()) {
                            return Err(Error::InvalidDescriptor(
                                "compound sub-shape offset is not finite".to_string(),
                            ));
                        }
                        let radius = require_positive(Some(sub.radius), "compound sub-shape radius")?;
                        Ok(Footprint::Circle {
                            center: center + sub.offset,
                            radius,
                        })
                    })
                    .collect()
            }
        }
    }
}

/// Solid box obstacle authored in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumperDescriptor {
    pub position: Point3<f64>,
    /// Full box size `[x, y, z]`.
    pub size: Vector3<f64>,
    /// Yaw in radians about +Y.
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub color: Option<[f32; 3]>,
}

impl BumperDescriptor {
    pub fn new(position: Point3<f64>, size: Vector3<f64>) -> Self {
        Self {
            position,
            size,
            rotation: None,
            color: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_finite3(&self.position) || !self.rotation.map_or(true, f64::is_finite) {
            return Err(Error::InvalidDescriptor(
                "bumper placement is not finite".to_string(),
            ));
        }
        if !self.size.iter().all(|c| *c > 0.0 && c.is_finite()) {
            return Err(Error::InvalidDescriptor(format!(
                "bumper size must be positive, got [{}, {}, {}]",
                self.size.x, self.size.y, self.size.z
            )));
        }
        Ok(())
    }
}

/// Parse a course: a JSON array of hole descriptors.
pub fn load_course_json(json: &str) -> Result<Vec<HoleDescriptor>> {
    Ok(serde_json::from_str(json)?)
}

fn is_finite3(p: &Point3<f64>) -> bool {
    p.iter().all(|c| c.is_finite())
}

fn require_positive(value: Option<f64>, what: &str) -> Result<f64> {
    match value {
        Some(v) if v > 0.0 && v.is_finite() => Ok(v),
        Some(v) => Err(Error::InvalidDescriptor(format!(
            "{} must be positive, got {}",
            what, v
        ))),
        None => Err(Error::InvalidDescriptor(format!("{} is missing", what))),
    }
}
