// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations on ground-plane footprints
//!
//! Thin wrappers around the i_overlay crate. Union fuses overlapping compound
//! hazard circles into disjoint cutter footprints (with any enclosed holes)
//! before any 3D subtraction happens; intersection clips visual fills to the
//! course boundary.

use crate::profile::Profile2D;
use crate::shape::{ensure_ccw, ensure_cw, is_valid_contour, signed_area};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Union contours into disjoint profiles.
///
/// Holes enclosed by the union (a ring of overlapping circles) are kept on
/// the resulting profiles.
pub fn union_contours(contours: &[Vec<Point2<f64>>]) -> Vec<Profile2D> {
    let valid: Vec<&Vec<Point2<f64>>> = contours.iter().filter(|c| is_valid_contour(c)).collect();

    match valid.len() {
        0 => return Vec::new(),
        1 => return vec![Profile2D::new(valid[0].clone())],
        _ => {}
    }

    let subject: Vec<Vec<[f64; 2]>> = vec![contour_to_path(&ensure_ccw(valid[0]))];
    let clip: Vec<Vec<[f64; 2]>> = valid
        .iter()
        .skip(1)
        .map(|c| contour_to_path(&ensure_ccw(c)))
        .collect();

    // NonZero so clip contours overlapping each other still add up
    let result = subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero);
    shapes_to_profiles(&result)
}

/// Intersect `subject` with `clip`, returning one profile per resulting shape
pub fn intersect_contours(subject: &[Point2<f64>], clip: &[Point2<f64>]) -> Vec<Profile2D> {
    if !is_valid_contour(subject) || !is_valid_contour(clip) {
        return Vec::new();
    }

    let subject_paths = vec![contour_to_path(&ensure_ccw(subject))];
    let clip_paths = vec![contour_to_path(&ensure_ccw(clip))];

    let result = subject_paths.overlay(&clip_paths, OverlayRule::Intersect, FillRule::NonZero);
    shapes_to_profiles(&result)
}

/// Total area of a set of profiles (outer minus holes)
pub fn profiles_area(profiles: &[Profile2D]) -> f64 {
    profiles
        .iter()
        .map(|p| {
            signed_area(&p.outer).abs() - p.holes.iter().map(|h| signed_area(h).abs()).sum::<f64>()
        })
        .sum()
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2<f64>> {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

/// Convert i_overlay result shapes to profiles
///
/// Each shape is a list of contours: the first is the outer boundary, the rest
/// are holes.
fn shapes_to_profiles(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Profile2D> {
    let mut profiles = Vec::with_capacity(shapes.len());

    for shape in shapes {
        let Some(outer) = shape.first() else {
            continue;
        };
        let outer = ensure_ccw(&path_to_contour(outer));
        if !is_valid_contour(&outer) {
            continue;
        }

        let mut profile = Profile2D::new(outer);
        for contour in shape.iter().skip(1) {
            let hole = path_to_contour(contour);
            if is_valid_contour(&hole) {
                profile.add_hole(ensure_cw(&hole));
            }
        }
        profiles.push(profile);
    }

    profiles
}
