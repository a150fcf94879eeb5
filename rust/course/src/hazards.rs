// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hazard and bumper synthesis.
//!
//! A hazard becomes visual fills just below the green plus trigger volumes
//! sized to the authored footprint. Compound hazards yield one fill and one
//! trigger per sub-circle. Fills may be clipped to the course boundary; the
//! triggers never are.
//!
//! Fills are built in the container frame, triggers and bumper colliders in
//! world space.

use crate::config::{Material, SynthesisConfig};
use crate::descriptor::{BumperDescriptor, Footprint, HazardDescriptor, HazardKind, HazardShape};
use crate::error::Result;
use crate::frame::{ground_to_local, to_local};
use crate::physics::{BodyDesc, BodyTag, ColliderShape};
use nalgebra::{Isometry3, Point2, Point3, Translation3, UnitQuaternion, Vector3};
use putt_lite_geometry::primitives::{box_mesh, fill_mesh};
use putt_lite_geometry::shape::{
    circle_contour, circle_segments, contour_inside, is_valid_contour, rect_contour, signed_area,
};
use putt_lite_geometry::{intersect_contours, profiles_area, union_contours, Cutter, Mesh, Profile2D};
use tracing::debug;

/// Inputs shared by every hazard and bumper of one hole.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisContext<'a> {
    pub config: &'a SynthesisConfig,
    /// World position of the hole container.
    pub anchor: Point3<f64>,
    /// Course boundary in container coordinates, for fill clipping.
    pub boundary: &'a [Point2<f64>],
}

impl SynthesisContext<'_> {
    fn segments(&self, radius: f64) -> usize {
        self.config
            .circle_segments
            .unwrap_or_else(|| circle_segments(radius))
    }

    /// Local ground-plane contour of a world footprint
    fn local_contour(&self, footprint: &Footprint) -> Vec<Point2<f64>> {
        match footprint {
            Footprint::Circle { center, radius } => circle_contour(
                ground_to_local(center, &self.anchor),
                *radius,
                self.segments(*radius),
            ),
            Footprint::Rect { center, width, length } => {
                rect_contour(ground_to_local(center, &self.anchor), *width, *length)
            }
        }
    }
}

/// One visual fill, positioned in the container frame.
#[derive(Debug, Clone)]
pub struct HazardFill {
    pub kind: HazardKind,
    pub mesh: Mesh,
    pub material: Material,
}

#[derive(Debug, Clone, Default)]
pub struct HazardParts {
    pub fills: Vec<HazardFill>,
    pub triggers: Vec<BodyDesc>,
}

/// Bumper box: mesh around the origin placed by `transform` (container frame),
/// plus its world-space collider.
#[derive(Debug, Clone)]
pub struct BumperParts {
    pub mesh: Mesh,
    pub transform: Isometry3<f64>,
    pub material: Material,
    pub body: BodyDesc,
}

/// Build the fills and triggers of one hazard.
pub fn synthesize_hazard(
    descriptor: &HazardDescriptor,
    surface_height: f64,
    ctx: &SynthesisContext<'_>,
) -> Result<HazardParts> {
    let depth = descriptor.resolved_depth(ctx.config)?;
    let footprints = descriptor.footprints()?;
    let kind_config = ctx.config.hazard(descriptor.kind);
    let material = ctx.config.hazard_material(descriptor.kind);
    let tag = BodyTag::HazardZone(descriptor.kind);

    let fill_y = surface_height - kind_config.visual_offset;
    let trigger_y = ctx.anchor.y + surface_height - depth / 2.0;

    let mut parts = HazardParts::default();
    for footprint in &footprints {
        let (center, shape) = match footprint {
            Footprint::Circle { center, radius } => (
                center,
                ColliderShape::Cylinder {
                    radius: *radius,
                    half_height: depth / 2.0,
                },
            ),
            Footprint::Rect { center, width, length } => (
                center,
                ColliderShape::Box {
                    half_extents: Vector3::new(width / 2.0, depth / 2.0, length / 2.0),
                },
            ),
        };
        parts.triggers.push(BodyDesc::trigger(
            shape,
            Isometry3::translation(center.x, trigger_y, center.y),
            tag,
        ));

        for mesh in fill_meshes(&ctx.local_contour(footprint), fill_y, ctx)? {
            parts.fills.push(HazardFill {
                kind: descriptor.kind,
                mesh,
                material,
            });
        }
    }

    debug!(
        kind = ?descriptor.kind,
        triggers = parts.triggers.len(),
        fills = parts.fills.len(),
        "Synthesized hazard"
    );
    Ok(parts)
}

/// Fill meshes for one local contour, clipped to the boundary when enabled
fn fill_meshes(contour: &[Point2<f64>], y: f64, ctx: &SynthesisContext<'_>) -> Result<Vec<Mesh>> {
    let clip = ctx.config.clip_fills_to_boundary
        && is_valid_contour(ctx.boundary)
        && !contour_inside(contour, ctx.boundary);

    if !clip {
        return Ok(vec![fill_mesh(&Profile2D::new(contour.to_vec()), y)?]);
    }

    let clipped = intersect_contours(contour, ctx.boundary);
    if clipped.is_empty() {
        debug!("Hazard fill lies outside the course boundary");
    } else {
        debug!(
            authored = signed_area(contour).abs(),
            kept = profiles_area(&clipped),
            "Hazard fill clipped to the course boundary"
        );
    }
    clipped
        .iter()
        .map(|profile| fill_mesh(profile, y).map_err(Into::into))
        .collect()
}

/// Cutters carving this hazard out of the green, in the container frame.
///
/// Compound sub-circles are fused first so no two cutters share volume.
pub fn hazard_cutters(descriptor: &HazardDescriptor, ctx: &SynthesisContext<'_>) -> Result<Vec<Cutter>> {
    descriptor.resolved_depth(ctx.config)?;
    let footprints = descriptor.footprints()?;

    if descriptor.shape == HazardShape::Compound {
        let contours: Vec<Vec<Point2<f64>>> =
            footprints.iter().map(|f| ctx.local_contour(f)).collect();
        return Ok(union_contours(&contours)
            .into_iter()
            .map(Cutter::Profile)
            .collect());
    }

    Ok(footprints
        .iter()
        .map(|footprint| match footprint {
            Footprint::Circle { center, radius } => Cutter::Circle {
                center: ground_to_local(center, &ctx.anchor),
                radius: *radius,
            },
            Footprint::Rect { center, width, length } => Cutter::Rect {
                center: ground_to_local(center, &ctx.anchor),
                width: *width,
                length: *length,
            },
        })
        .collect())
}

/// Build one bumper at its authored world placement.
pub fn synthesize_bumper(descriptor: &BumperDescriptor, ctx: &SynthesisContext<'_>) -> Result<BumperParts> {
    descriptor.validate()?;

    let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), descriptor.rotation.unwrap_or(0.0));
    let half_extents = descriptor.size / 2.0;
    let local = to_local(&descriptor.position, &ctx.anchor);

    let material = descriptor
        .color
        .map(|[r, g, b]| Material::opaque(r, g, b))
        .unwrap_or(ctx.config.materials.bumper);

    Ok(BumperParts {
        mesh: box_mesh(&half_extents),
        transform: Isometry3::from_parts(Translation3::from(local.coords), rotation),
        material,
        body: BodyDesc::solid(
            ColliderShape::Box { half_extents },
            Isometry3::from_parts(Translation3::from(descriptor.position.coords), rotation),
            BodyTag::Bumper,
        ),
    })
}
